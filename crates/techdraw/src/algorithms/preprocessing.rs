use image::{GrayImage, Luma, RgbImage};
use tracing::{debug, instrument};

use crate::{
    algorithms::border::{BorderMode, map_index},
    error::{DrawingError, Result},
    traits::GrayFilter,
};

/// Window diameter of the edge-preserving smoother.
pub const BILATERAL_DIAMETER: u32 = 7;
/// Intensity falloff of the smoother.
pub const BILATERAL_SIGMA_RANGE: f32 = 50.0;
/// Spatial falloff of the smoother.
pub const BILATERAL_SIGMA_SPATIAL: f32 = 50.0;

/// Grayscale conversion, downscale and smoothing of the color input.
#[derive(Debug, Clone)]
pub struct Preprocessor {
    pub max_dimension: u32,
    pub smoother: BilateralSmoother,
}

impl Preprocessor {
    pub fn new(max_dimension: u32) -> Self {
        Self {
            max_dimension,
            smoother: BilateralSmoother::default(),
        }
    }

    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn run(&self, image: &RgbImage) -> Result<GrayImage> {
        ensure_not_empty(image.width(), image.height())?;

        let gray = to_grayscale(image);
        let resized = resize_to_fit(&gray, self.max_dimension);
        debug!(
            width = resized.width(),
            height = resized.height(),
            max_dimension = self.max_dimension,
            "Grayscale image resized"
        );
        self.smoother.apply(&resized)
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new(1600)
    }
}

pub(crate) fn ensure_not_empty(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(DrawingError::InvalidImage(format!(
            "image has zero extent ({width}x{height})"
        )));
    }
    Ok(())
}

/// Perceptual luminance of an RGB image.
pub fn to_grayscale(image: &RgbImage) -> GrayImage {
    image::imageops::grayscale(image)
}

/// Dimensions after capping the longer side at `max_dimension`.
/// A cap of 0, or an image already within the cap, keeps the size.
pub fn fit_dimensions(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    let longest = width.max(height);
    if max_dimension == 0 || longest <= max_dimension {
        return (width, height);
    }
    let scale = f64::from(max_dimension) / f64::from(longest);
    let scaled = |v: u32| ((f64::from(v) * scale).round() as u32).max(1);
    (scaled(width), scaled(height))
}

/// Shrink with area averaging so the longer side fits `max_dimension`.
/// Never upscales.
pub fn resize_to_fit(image: &GrayImage, max_dimension: u32) -> GrayImage {
    let (width, height) = image.dimensions();
    let (new_width, new_height) = fit_dimensions(width, height, max_dimension);
    if (new_width, new_height) == (width, height) {
        return image.clone();
    }
    resize_area(image, new_width, new_height)
}

/// Contribution of each source index to one destination index.
fn area_weights(src_len: u32, dst_len: u32) -> Vec<Vec<(usize, f32)>> {
    let scale = f64::from(src_len) / f64::from(dst_len);
    (0..dst_len)
        .map(|d| {
            let start = f64::from(d) * scale;
            let end = (start + scale).min(f64::from(src_len));
            let mut weights = Vec::new();
            let mut s = start.floor() as usize;
            while (s as f64) < end {
                let overlap = end.min(s as f64 + 1.0) - start.max(s as f64);
                if overlap > 1e-9 {
                    weights.push((s, (overlap / scale) as f32));
                }
                s += 1;
            }
            weights
        })
        .collect()
}

fn resize_area(image: &GrayImage, new_width: u32, new_height: u32) -> GrayImage {
    let (width, height) = image.dimensions();
    let columns = area_weights(width, new_width);
    let rows = area_weights(height, new_height);

    // Horizontal pass: new_width x height
    let src = image.as_raw();
    let mut horizontal = vec![0.0f32; new_width as usize * height as usize];
    for y in 0..height as usize {
        let row = &src[y * width as usize..(y + 1) * width as usize];
        for (x, weights) in columns.iter().enumerate() {
            horizontal[y * new_width as usize + x] = weights
                .iter()
                .map(|&(s, w)| f32::from(row[s]) * w)
                .sum();
        }
    }

    GrayImage::from_fn(new_width, new_height, |x, y| {
        let value: f32 = rows[y as usize]
            .iter()
            .map(|&(s, w)| horizontal[s * new_width as usize + x as usize] * w)
            .sum();
        Luma([value.round().clamp(0.0, 255.0) as u8])
    })
}

/// Edge-preserving smoother: each pixel becomes a weighted mean of its
/// circular neighborhood, weighted by spatial distance and intensity
/// difference.
#[derive(Debug, Clone)]
pub struct BilateralSmoother {
    pub diameter: u32,
    pub sigma_range: f32,
    pub sigma_spatial: f32,
}

impl Default for BilateralSmoother {
    fn default() -> Self {
        Self {
            diameter: BILATERAL_DIAMETER,
            sigma_range: BILATERAL_SIGMA_RANGE,
            sigma_spatial: BILATERAL_SIGMA_SPATIAL,
        }
    }
}

impl GrayFilter for BilateralSmoother {
    #[instrument(skip_all, fields(diameter = self.diameter))]
    fn apply(&self, image: &GrayImage) -> Result<GrayImage> {
        ensure_not_empty(image.width(), image.height())?;
        Ok(bilateral_smooth(image, self))
    }
}

fn bilateral_smooth(image: &GrayImage, params: &BilateralSmoother) -> GrayImage {
    let (width, height) = image.dimensions();
    let radius = (params.diameter / 2).max(1) as isize;

    let range_coeff = -0.5 / (params.sigma_range * params.sigma_range);
    let range_weights: Vec<f32> = (0..256)
        .map(|d| ((d * d) as f32 * range_coeff).exp())
        .collect();

    let spatial_coeff = -0.5 / (params.sigma_spatial * params.sigma_spatial);
    let mut window = Vec::new();
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let r2 = (dx * dx + dy * dy) as f32;
            if r2.sqrt() <= radius as f32 {
                window.push((dx, dy, (r2 * spatial_coeff).exp()));
            }
        }
    }

    GrayImage::from_fn(width, height, |x, y| {
        let center = image.get_pixel(x, y)[0];
        let mut sum = 0.0f32;
        let mut weight_sum = 0.0f32;
        for &(dx, dy, spatial) in &window {
            let sx = map_index(x as isize + dx, width as usize, BorderMode::Reflect101);
            let sy = map_index(y as isize + dy, height as usize, BorderMode::Reflect101);
            let value = image.get_pixel(sx as u32, sy as u32)[0];
            let w = spatial * range_weights[usize::from(center.abs_diff(value))];
            sum += w * f32::from(value);
            weight_sum += w;
        }
        Luma([(sum / weight_sum).round().clamp(0.0, 255.0) as u8])
    })
}
