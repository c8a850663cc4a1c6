use image::{GrayImage, Luma};
use imageproc::gradients::{horizontal_sobel, vertical_sobel};
use tracing::{debug, instrument};

use crate::{
    algorithms::preprocessing::ensure_not_empty,
    error::Result,
    traits::GrayFilter,
};

/// Canny edge detection with L2 gradient magnitude, followed by optional
/// square dilation to thicken the resulting lines.
///
/// Output polarity: 255 is an edge, 0 is background.
#[derive(Debug, Clone)]
pub struct EdgeDetector {
    pub low: f32,
    pub high: f32,
    /// Side of the square used to thicken edges; values <= 1 disable it.
    pub line_width: u32,
}

impl Default for EdgeDetector {
    fn default() -> Self {
        Self {
            low: 40.0,
            high: 120.0,
            line_width: 2,
        }
    }
}

impl EdgeDetector {
    pub fn new(low: f32, high: f32, line_width: u32) -> Self {
        Self {
            low,
            high,
            line_width,
        }
    }
}

impl GrayFilter for EdgeDetector {
    #[instrument(skip_all, fields(low = self.low, high = self.high, line_width = self.line_width))]
    fn apply(&self, image: &GrayImage) -> Result<GrayImage> {
        ensure_not_empty(image.width(), image.height())?;

        let edges = canny(image, self.low, self.high);
        debug!(
            edge_pixels = edges.pixels().filter(|p| p[0] == 255).count(),
            "Hysteresis complete"
        );

        if self.line_width > 1 {
            Ok(dilate_square(&edges, self.line_width))
        } else {
            Ok(edges)
        }
    }
}

/// Sobel derivatives and their Euclidean magnitude, row-major.
pub struct Gradients {
    pub gx: Vec<f32>,
    pub gy: Vec<f32>,
    pub magnitude: Vec<f32>,
}

pub fn sobel_gradients(image: &GrayImage) -> Gradients {
    let gx: Vec<f32> = horizontal_sobel(image).pixels().map(|p| f32::from(p[0])).collect();
    let gy: Vec<f32> = vertical_sobel(image).pixels().map(|p| f32::from(p[0])).collect();
    let magnitude = gx.iter().zip(&gy).map(|(x, y)| x.hypot(*y)).collect();
    Gradients { gx, gy, magnitude }
}

/// Single-pixel-wide edge map. Thresholds are swapped if given out of order.
pub fn canny(image: &GrayImage, low: f32, high: f32) -> GrayImage {
    let (width, height) = image.dimensions();
    let (low, high) = if low > high { (high, low) } else { (low, high) };

    let gradients = sobel_gradients(image);
    let thin = non_maximum_suppression(&gradients, width as usize, height as usize);
    let edges = hysteresis(&thin, width as usize, height as usize, low, high);

    GrayImage::from_raw(width, height, edges)
        .unwrap_or_else(|| GrayImage::new(width, height))
}

/// Keep only magnitudes that peak along the quantized gradient direction.
///
/// A step edge gives a two-pixel plateau. The tie goes to the pixel on the
/// dark side, the one whose equal neighbor lies along the gradient. Every
/// edge of a dark shape then sits on the shape itself, so its corners meet
/// the diagonal maximum and stay closed.
fn non_maximum_suppression(gradients: &Gradients, w: usize, h: usize) -> Vec<f32> {
    const TAN22_5: f32 = 0.414_213_57;
    const TAN67_5: f32 = 2.414_213_7;

    let mag = &gradients.magnitude;
    let at = |x: isize, y: isize| -> f32 {
        if x < 0 || y < 0 || x >= w as isize || y >= h as isize {
            0.0
        } else {
            mag[y as usize * w + x as usize]
        }
    };

    let mut nms = vec![0.0f32; w * h];
    for y in 0..h {
        for x in 0..w {
            let idx = y * w + x;
            let m = mag[idx];
            if m <= 0.0 {
                continue;
            }

            let gx = gradients.gx[idx];
            let gy = gradients.gy[idx];
            let (ax, ay) = (gx.abs(), gy.abs());
            let (xi, yi) = (x as isize, y as isize);

            // Neighbor offset pointing up the gradient, toward the bright side.
            let (dx, dy) = if ay < ax * TAN22_5 {
                (gx.signum() as isize, 0)
            } else if ay > ax * TAN67_5 {
                (0, gy.signum() as isize)
            } else {
                (gx.signum() as isize, gy.signum() as isize)
            };

            let bright = at(xi + dx, yi + dy);
            let dark = at(xi - dx, yi - dy);
            if m > dark && m >= bright {
                nms[idx] = m;
            }
        }
    }
    nms
}

/// Pixels above `high` seed edges; pixels above `low` join when 8-connected
/// to a seed, transitively.
fn hysteresis(nms: &[f32], w: usize, h: usize, low: f32, high: f32) -> Vec<u8> {
    let mut out = vec![0u8; w * h];
    let mut stack: Vec<usize> = Vec::new();

    for (idx, &m) in nms.iter().enumerate() {
        if m > high {
            out[idx] = 255;
            stack.push(idx);
        }
    }

    while let Some(idx) = stack.pop() {
        let (x, y) = (idx % w, idx / w);
        for ny in y.saturating_sub(1)..=(y + 1).min(h - 1) {
            for nx in x.saturating_sub(1)..=(x + 1).min(w - 1) {
                let nidx = ny * w + nx;
                if out[nidx] == 0 && nms[nidx] > low {
                    out[nidx] = 255;
                    stack.push(nidx);
                }
            }
        }
    }

    out
}

/// Grayscale dilation with a `side x side` square anchored at `side / 2`.
/// Pixels outside the image do not contribute.
pub fn dilate_square(image: &GrayImage, side: u32) -> GrayImage {
    let (width, height) = image.dimensions();
    if side <= 1 {
        return image.clone();
    }
    let anchor = (side / 2) as i64;
    let reach = side as i64 - 1 - anchor;
    let (w, h) = (i64::from(width), i64::from(height));

    // Separable: a square max is a row max followed by a column max.
    let row_max = GrayImage::from_fn(width, height, |x, y| {
        let x = i64::from(x);
        let lo = (x - anchor).max(0);
        let hi = (x + reach).min(w - 1);
        let best = (lo..=hi)
            .map(|sx| image.get_pixel(sx as u32, y)[0])
            .max()
            .unwrap_or(0);
        Luma([best])
    });

    GrayImage::from_fn(width, height, |x, y| {
        let y = i64::from(y);
        let lo = (y - anchor).max(0);
        let hi = (y + reach).min(h - 1);
        let best = (lo..=hi)
            .map(|sy| row_max.get_pixel(x, sy as u32)[0])
            .max()
            .unwrap_or(0);
        Luma([best])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge_count(image: &GrayImage) -> usize {
        image.pixels().filter(|p| p[0] == 255).count()
    }

    fn square_image() -> GrayImage {
        GrayImage::from_fn(60, 60, |x, y| {
            Luma([if (20..40).contains(&x) && (20..40).contains(&y) { 0 } else { 255 }])
        })
    }

    #[test]
    fn flat_image_has_no_edges() {
        let image = GrayImage::from_pixel(32, 32, Luma([200]));
        let edges = EdgeDetector::default().apply(&image).unwrap();
        assert_eq!(edge_count(&edges), 0);
    }

    #[test]
    fn vertical_step_gives_single_pixel_column() {
        let image = GrayImage::from_fn(30, 20, |x, _| Luma([if x < 15 { 0 } else { 255 }]));
        let edges = canny(&image, 40.0, 120.0);
        for y in 0..20 {
            let row: Vec<u32> = (0..30).filter(|&x| edges.get_pixel(x, y)[0] == 255).collect();
            assert_eq!(row, vec![14], "row {y}");
        }
    }

    #[test]
    fn square_outline_is_detected() {
        let edges = canny(&square_image(), 40.0, 120.0);
        assert!(edge_count(&edges) >= 4 * 15);
        // Far from the boundary nothing fires.
        assert_eq!(edges.get_pixel(30, 30)[0], 0);
        assert_eq!(edges.get_pixel(5, 5)[0], 0);
    }

    #[test]
    fn square_edges_sit_inside_with_closed_corners() {
        let edges = canny(&square_image(), 40.0, 120.0);
        for (x, y) in [(20, 20), (39, 20), (20, 39), (39, 39), (20, 30), (30, 39)] {
            assert_eq!(edges.get_pixel(x, y)[0], 255, "missing edge at ({x}, {y})");
        }
        for (x, y) in [(19, 19), (40, 40), (19, 30), (30, 40), (21, 21)] {
            assert_eq!(edges.get_pixel(x, y)[0], 0, "stray edge at ({x}, {y})");
        }
        assert_eq!(edge_count(&edges), 4 * 19);
    }

    #[test]
    fn bright_square_edges_run_just_outside_it() {
        let inverted = crate::algorithms::invert(&square_image());
        let edges = canny(&inverted, 40.0, 120.0);
        for (x, y) in [(19, 30), (30, 19), (40, 30), (30, 40)] {
            assert_eq!(edges.get_pixel(x, y)[0], 255, "missing edge at ({x}, {y})");
        }
        for (x, y) in [(20, 30), (30, 20), (39, 30), (30, 39)] {
            assert_eq!(edges.get_pixel(x, y)[0], 0, "stray edge at ({x}, {y})");
        }
    }

    #[test]
    fn thickened_square_outline_keeps_square_corners() {
        let edges = EdgeDetector::default().apply(&square_image()).unwrap();
        for (x, y) in [(20, 20), (40, 20), (20, 40), (40, 40)] {
            assert_eq!(edges.get_pixel(x, y)[0], 255, "corner ({x}, {y})");
        }
        assert_eq!(edges.get_pixel(19, 19)[0], 0);
        assert_eq!(edges.get_pixel(41, 41)[0], 0);
    }

    #[test]
    fn lowering_high_threshold_never_loses_edges() {
        let image = GrayImage::from_fn(64, 64, |x, y| {
            let v = ((x as f32 * 0.3).sin() * 60.0 + (y as f32 * 0.2).cos() * 60.0 + 128.0) as u8;
            Luma([v])
        });
        let mut previous = 0;
        for high in [400.0, 300.0, 200.0, 120.0, 80.0, 50.0] {
            let count = edge_count(&canny(&image, 40.0, high));
            assert!(count >= previous, "high {high}: {count} < {previous}");
            previous = count;
        }
    }

    #[test]
    fn weak_edges_need_a_strong_neighbor() {
        // A faint step alone stays below `high`.
        let image = GrayImage::from_fn(30, 20, |x, _| Luma([if x < 15 { 100 } else { 120 }]));
        assert_eq!(edge_count(&canny(&image, 40.0, 120.0)), 0);
        // Same step with a lower `high` is accepted.
        assert!(edge_count(&canny(&image, 40.0, 60.0)) > 0);
    }

    #[test]
    fn dilation_uses_square_anchored_at_center() {
        let mut image = GrayImage::new(7, 7);
        image.put_pixel(3, 3, Luma([255]));

        let two = dilate_square(&image, 2);
        let lit: Vec<(u32, u32)> = (0..7)
            .flat_map(|y| (0..7).map(move |x| (x, y)))
            .filter(|&(x, y)| two.get_pixel(x, y)[0] == 255)
            .collect();
        assert_eq!(lit, vec![(3, 3), (4, 3), (3, 4), (4, 4)]);

        let three = dilate_square(&image, 3);
        assert_eq!(edge_count(&three), 9);
        assert_eq!(dilate_square(&image, 1), image);
    }

    #[test]
    fn thickening_widens_edges() {
        let image = square_image();
        let thin = EdgeDetector::new(40.0, 120.0, 1).apply(&image).unwrap();
        let thick = EdgeDetector::new(40.0, 120.0, 3).apply(&image).unwrap();
        assert!(edge_count(&thick) > edge_count(&thin));
    }
}
