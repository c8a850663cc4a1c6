use image::{GrayImage, Luma};
use tracing::{debug, instrument};

use crate::{
    algorithms::border::{BorderMode, map_index},
    algorithms::preprocessing::ensure_not_empty,
    error::Result,
    params::normalize_block_size,
    traits::GrayFilter,
};

/// Adaptive binarization against a Gaussian-weighted local mean.
///
/// A pixel becomes background (255) when it is brighter than
/// `local_mean - c`, otherwise it is a line candidate (0).
#[derive(Debug, Clone)]
pub struct AdaptiveThreshold {
    pub block_size: u32,
    pub c: f32,
}

impl Default for AdaptiveThreshold {
    fn default() -> Self {
        Self {
            block_size: 21,
            c: 2.0,
        }
    }
}

impl AdaptiveThreshold {
    pub fn new(block_size: u32, c: f32) -> Self {
        Self { block_size, c }
    }
}

impl GrayFilter for AdaptiveThreshold {
    #[instrument(skip_all, fields(block_size = self.block_size, c = self.c))]
    fn apply(&self, image: &GrayImage) -> Result<GrayImage> {
        ensure_not_empty(image.width(), image.height())?;

        let block_size = normalize_block_size(self.block_size);
        let mean = gaussian_local_mean(image, block_size);
        let delta = -(self.c.ceil() as i32);

        let binary = GrayImage::from_fn(image.width(), image.height(), |x, y| {
            let value = i32::from(image.get_pixel(x, y)[0]);
            let local = i32::from(mean.get_pixel(x, y)[0]);
            Luma([if value - local > delta { 255 } else { 0 }])
        });

        debug!(
            block_size,
            background = binary.pixels().filter(|p| p[0] == 255).count(),
            "Adaptive threshold applied"
        );
        Ok(binary)
    }
}

/// Normalized 1-D Gaussian of `size` taps. Small sizes use the fixed
/// binomial-like tables, larger ones derive sigma from the size.
pub fn gaussian_kernel(size: u32) -> Vec<f32> {
    match size {
        1 => return vec![1.0],
        3 => return vec![0.25, 0.5, 0.25],
        5 => return vec![0.0625, 0.25, 0.375, 0.25, 0.0625],
        7 => {
            return vec![
                0.03125, 0.109375, 0.21875, 0.28125, 0.21875, 0.109375, 0.03125,
            ];
        }
        _ => {}
    }

    let sigma = 0.3 * ((size as f64 - 1.0) * 0.5 - 1.0) + 0.8;
    let scale = -0.5 / (sigma * sigma);
    let half = (size as f64 - 1.0) * 0.5;
    let raw: Vec<f64> = (0..size)
        .map(|i| {
            let x = i as f64 - half;
            (scale * x * x).exp()
        })
        .collect();
    let total: f64 = raw.iter().sum();
    raw.into_iter().map(|v| (v / total) as f32).collect()
}

/// Separable Gaussian blur with replicated borders, rounded back to 8 bits.
pub fn gaussian_local_mean(image: &GrayImage, block_size: u32) -> GrayImage {
    let (width, height) = image.dimensions();
    let (w, h) = (width as usize, height as usize);
    let kernel = gaussian_kernel(block_size);
    let half = (kernel.len() / 2) as isize;
    let src = image.as_raw();

    let mut horizontal = vec![0.0f32; w * h];
    for y in 0..h {
        for x in 0..w {
            horizontal[y * w + x] = kernel
                .iter()
                .enumerate()
                .map(|(k, &weight)| {
                    let sx = map_index(x as isize + k as isize - half, w, BorderMode::Replicate);
                    weight * f32::from(src[y * w + sx])
                })
                .sum();
        }
    }

    GrayImage::from_fn(width, height, |x, y| {
        let value: f32 = kernel
            .iter()
            .enumerate()
            .map(|(k, &weight)| {
                let sy = map_index(y as isize + k as isize - half, h, BorderMode::Replicate);
                weight * horizontal[sy * w + x as usize]
            })
            .sum();
        Luma([value.round().clamp(0.0, 255.0) as u8])
    })
}
