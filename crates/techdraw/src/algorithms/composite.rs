use image::{GrayImage, Luma};
use tracing::{debug, instrument};

use crate::{
    algorithms::border::{BorderMode, map_index},
    algorithms::preprocessing::ensure_not_empty,
    error::{DrawingError, Result},
    params::MaskCombine,
    traits::GrayFilter,
};

/// Merge the threshold mask with the inverted edge map.
///
/// Both inputs must share dimensions. The threshold mask uses drawing
/// polarity (0 = line), the edge map uses detector polarity (255 = edge).
pub fn combine_masks(
    threshold: &GrayImage,
    edges: &GrayImage,
    mode: MaskCombine,
) -> Result<GrayImage> {
    if threshold.dimensions() != edges.dimensions() {
        return Err(DrawingError::ShapeMismatch {
            expected: threshold.dimensions(),
            found: edges.dimensions(),
        });
    }

    let combined = threshold
        .as_raw()
        .iter()
        .zip(edges.as_raw())
        .map(|(&t, &e)| match mode {
            MaskCombine::Union => t & !e,
            MaskCombine::Intersection => t | !e,
        })
        .collect();

    let (width, height) = threshold.dimensions();
    Ok(GrayImage::from_raw(width, height, combined)
        .unwrap_or_else(|| GrayImage::new(width, height)))
}

/// Non-local means denoising: each pixel becomes the weighted mean of the
/// pixels in its search window, weighted by how similar their surrounding
/// patches are.
#[derive(Debug, Clone)]
pub struct NlMeansDenoiser {
    /// Filter strength; larger values also average less similar patches.
    pub h: f32,
    pub template_window: u32,
    pub search_window: u32,
}

impl Default for NlMeansDenoiser {
    fn default() -> Self {
        Self {
            h: 15.0,
            template_window: 7,
            search_window: 21,
        }
    }
}

/// Weights below this are treated as zero.
const MIN_WEIGHT: f64 = 0.001;

impl GrayFilter for NlMeansDenoiser {
    #[instrument(skip_all, fields(h = self.h))]
    fn apply(&self, image: &GrayImage) -> Result<GrayImage> {
        ensure_not_empty(image.width(), image.height())?;
        Ok(self.denoise(image))
    }
}

impl NlMeansDenoiser {
    fn denoise(&self, image: &GrayImage) -> GrayImage {
        let (width, height) = image.dimensions();
        let (w, h) = (width as usize, height as usize);
        let t = (self.template_window / 2) as usize;
        let s = (self.search_window / 2) as usize;
        let pad = t + s;

        // Reflect-101 padded copy so every patch and candidate is addressable.
        let pw = w + 2 * pad;
        let ph = h + 2 * pad;
        let mut padded = vec![0i32; pw * ph];
        for py in 0..ph {
            let sy = map_index(py as isize - pad as isize, h, BorderMode::Reflect101);
            for px in 0..pw {
                let sx = map_index(px as isize - pad as isize, w, BorderMode::Reflect101);
                padded[py * pw + px] = i32::from(image.get_pixel(sx as u32, sy as u32)[0]);
            }
        }

        let patch_area = ((2 * t + 1) * (2 * t + 1)) as f64;
        let inv_h2 = 1.0 / (f64::from(self.h) * f64::from(self.h)).max(f64::EPSILON);

        // Squared differences cover every patch pixel of every output pixel.
        let rw = w + 2 * t;
        let rh = h + 2 * t;
        let origin = pad - t;
        let mut integral = vec![0u64; (rw + 1) * (rh + 1)];
        let mut weight_sum = vec![0.0f64; w * h];
        let mut value_sum = vec![0.0f64; w * h];

        let s = s as isize;
        for oy in -s..=s {
            for ox in -s..=s {
                for ry in 0..rh {
                    let mut row_acc = 0u64;
                    let py = origin + ry;
                    let qy = (py as isize + oy) as usize;
                    for rx in 0..rw {
                        let px = origin + rx;
                        let qx = (px as isize + ox) as usize;
                        let d = padded[py * pw + px] - padded[qy * pw + qx];
                        row_acc += (d * d) as u64;
                        integral[(ry + 1) * (rw + 1) + rx + 1] =
                            integral[ry * (rw + 1) + rx + 1] + row_acc;
                    }
                }

                let side = 2 * t + 1;
                for y in 0..h {
                    for x in 0..w {
                        let (x0, y0, x1, y1) = (x, y, x + side, y + side);
                        let ssd = integral[y1 * (rw + 1) + x1] + integral[y0 * (rw + 1) + x0]
                            - integral[y0 * (rw + 1) + x1]
                            - integral[y1 * (rw + 1) + x0];
                        let weight = (-(ssd as f64 / patch_area) * inv_h2).exp();
                        if weight < MIN_WEIGHT {
                            continue;
                        }
                        let cy = (y + pad) as isize + oy;
                        let cx = (x + pad) as isize + ox;
                        let candidate = padded[cy as usize * pw + cx as usize];
                        weight_sum[y * w + x] += weight;
                        value_sum[y * w + x] += weight * f64::from(candidate);
                    }
                }
            }
        }

        GrayImage::from_fn(width, height, |x, y| {
            let idx = y as usize * w + x as usize;
            // The zero offset always contributes weight 1.
            let value = value_sum[idx] / weight_sum[idx];
            Luma([value.round().clamp(0.0, 255.0) as u8])
        })
    }
}

/// Merges the two branch outputs into the final binary drawing.
#[derive(Debug, Clone, Default)]
pub struct Compositor {
    pub combine: MaskCombine,
    pub denoiser: NlMeansDenoiser,
}

impl Compositor {
    pub fn new(combine: MaskCombine) -> Self {
        Self {
            combine,
            denoiser: NlMeansDenoiser::default(),
        }
    }

    #[instrument(skip_all, fields(combine = %self.combine))]
    pub fn compose(&self, threshold: &GrayImage, edges: &GrayImage) -> Result<GrayImage> {
        let combined = combine_masks(threshold, edges, self.combine)?;
        let denoised = self.denoiser.apply(&combined)?;
        let drawing = imageproc::contrast::threshold(&denoised, 127);
        debug!(
            line_pixels = drawing.pixels().filter(|p| p[0] == 0).count(),
            "Drawing composed"
        );
        Ok(drawing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask(width: u32, height: u32, lines: &[(u32, u32)], line: u8, background: u8) -> GrayImage {
        let mut image = GrayImage::from_pixel(width, height, Luma([background]));
        for &(x, y) in lines {
            image.put_pixel(x, y, Luma([line]));
        }
        image
    }

    #[test]
    fn mismatched_masks_are_rejected() {
        let threshold = GrayImage::new(10, 10);
        let edges = GrayImage::new(10, 11);
        let err = combine_masks(&threshold, &edges, MaskCombine::Union).unwrap_err();
        assert!(matches!(
            err,
            DrawingError::ShapeMismatch { expected: (10, 10), found: (10, 11) }
        ));
    }

    #[test]
    fn union_draws_lines_from_either_branch() {
        let threshold = mask(4, 1, &[(0, 0)], 0, 255);
        let edges = mask(4, 1, &[(1, 0)], 255, 0);
        let combined = combine_masks(&threshold, &edges, MaskCombine::Union).unwrap();
        assert_eq!(combined.as_raw(), &vec![0, 0, 255, 255]);
    }

    #[test]
    fn intersection_needs_both_branches() {
        let threshold = mask(3, 1, &[(0, 0), (1, 0)], 0, 255);
        let edges = mask(3, 1, &[(1, 0), (2, 0)], 255, 0);
        let combined = combine_masks(&threshold, &edges, MaskCombine::Intersection).unwrap();
        assert_eq!(combined.as_raw(), &vec![255, 0, 255]);
    }

    #[test]
    fn denoising_a_flat_image_is_identity() {
        let image = GrayImage::from_pixel(16, 12, Luma([255]));
        let denoised = NlMeansDenoiser::default().apply(&image).unwrap();
        assert_eq!(denoised, image);
    }

    #[test]
    fn denoising_keeps_continuous_lines() {
        let mut image = GrayImage::from_pixel(40, 40, Luma([255]));
        for x in 5..35 {
            image.put_pixel(x, 20, Luma([0]));
            image.put_pixel(x, 21, Luma([0]));
        }
        let drawing = Compositor::default()
            .compose(&image, &GrayImage::new(40, 40))
            .unwrap();
        for x in 8..32 {
            assert_eq!(drawing.get_pixel(x, 20)[0], 0, "column {x}");
        }
        assert_eq!(drawing.get_pixel(20, 5)[0], 255);
    }

    #[test]
    fn composed_drawing_is_binary() {
        let threshold = GrayImage::from_fn(30, 30, |x, y| Luma([if (x * y) % 7 == 0 { 0 } else { 255 }]));
        let edges = GrayImage::from_fn(30, 30, |x, _| Luma([if x == 15 { 255 } else { 0 }]));
        let drawing = Compositor::default().compose(&threshold, &edges).unwrap();
        assert!(drawing.pixels().all(|p| p[0] == 0 || p[0] == 255));
    }
}
