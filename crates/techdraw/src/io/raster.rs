use std::path::Path;

use image::{GrayImage, RgbImage};
use tracing::debug;

use crate::error::{DrawingError, Result};

/// Decode any supported image file into an 8-bit RGB buffer.
pub fn load_color_image<P: AsRef<Path>>(path: P) -> Result<RgbImage> {
    let path = path.as_ref();
    let decoded = image::open(path).map_err(|source| DrawingError::DecodeFailure {
        path: path.to_path_buf(),
        source,
    })?;
    let rgb = decoded.to_rgb8();
    if rgb.width() == 0 || rgb.height() == 0 {
        return Err(DrawingError::InvalidImage(format!(
            "{} decoded to an empty image",
            path.display()
        )));
    }
    debug!(path = %path.display(), width = rgb.width(), height = rgb.height(), "Image decoded");
    Ok(rgb)
}

/// Encode a single-channel image; the format follows the file extension.
pub fn save_gray_image<P: AsRef<Path>>(path: P, image: &GrayImage) -> Result<()> {
    let path = path.as_ref();
    image.save(path).map_err(|source| DrawingError::EncodeFailure {
        path: path.to_path_buf(),
        source: Box::new(source),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb};

    #[test]
    fn missing_file_is_a_decode_failure() {
        let err = load_color_image("/definitely/not/here.png").unwrap_err();
        assert!(matches!(err, DrawingError::DecodeFailure { .. }));
    }

    #[test]
    fn gray_png_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("drawing.png");
        let image = GrayImage::from_fn(8, 6, |x, _| Luma([if x % 2 == 0 { 0 } else { 255 }]));
        save_gray_image(&path, &image).unwrap();

        let loaded = image::open(&path).unwrap().to_luma8();
        assert_eq!(loaded, image);

        let color = load_color_image(&path).unwrap();
        assert_eq!(color.get_pixel(1, 0), &Rgb([255, 255, 255]));
    }

    #[test]
    fn unwritable_destination_is_an_encode_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("drawing.png");
        let err = save_gray_image(&path, &GrayImage::new(2, 2)).unwrap_err();
        match err {
            DrawingError::EncodeFailure { path: failed, .. } => assert_eq!(failed, path),
            other => panic!("unexpected error: {other}"),
        }
    }
}
