//! # Technical Drawing Library
//!
//! Turns a color photo into a high-contrast black-on-white line drawing and
//! optionally vectorizes the drawing into straight-segment SVG paths.
//!
//! ## Stages
//!
//! - **Preprocessing**: grayscale, area-averaging downscale, bilateral smoothing
//! - **Adaptive threshold**: Gaussian local mean binarization
//! - **Edge detection**: Sobel + non-maximum suppression + hysteresis, then dilation
//! - **Composition**: mask merge, non-local means denoising, re-binarization
//! - **Vectorization**: outer border tracing, Douglas-Peucker, SVG output
//!
//! Binary images use drawing polarity throughout: 0 is a line, 255 is
//! background.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use techdraw::{DrawingPipeline, io::{load_color_image, save_gray_image}};
//!
//! let pipeline = DrawingPipeline::builder().build();
//!
//! let photo = load_color_image("photo.jpg")?;
//! let result = pipeline.process(&photo)?;
//! save_gray_image("drawing.png", &result.drawing)?;
//!
//! pipeline.vectorize(&result.drawing).save_svg("drawing.svg")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Custom Pipeline
//!
//! ```rust,no_run
//! use techdraw::{DrawingPipeline, MaskCombine};
//!
//! let pipeline = DrawingPipeline::builder()
//!     .max_dimension(1200)
//!     .adaptive_threshold(15, 4.0)
//!     .canny_thresholds(30.0, 90.0)
//!     .combine(MaskCombine::Intersection)
//!     .simplify_ratio(0.02)
//!     .build();
//! ```

pub mod error;
pub mod params;
pub mod config;
pub mod types;
pub mod traits;
pub mod algorithms;
pub mod pipeline;
pub mod io;

pub use error::{DrawingError, Result};
pub use params::{FilterParameters, MaskCombine, SvgStyle};
pub use config::DrawingConfig;
pub use types::{Contour, Point, Polyline, TechnicalDrawing, VectorDrawing, VectorPath};
pub use traits::*;
pub use pipeline::{DrawingPipeline, builder::PipelineBuilder};

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn create_test_image() -> RgbImage {
        let mut img = RgbImage::from_pixel(100, 100, Rgb([255, 255, 255]));
        for y in 30..70 {
            for x in 30..70 {
                img.put_pixel(x, y, Rgb([0, 0, 0]));
            }
        }
        img
    }

    #[test]
    fn test_pipeline_basic() {
        let pipeline = DrawingPipeline::builder().build();
        let result = pipeline.process(&create_test_image()).expect("Should process successfully");

        assert_eq!(result.dimensions(), (100, 100));
        assert!(result.line_pixel_count() > 0, "Should draw the square outline");
        assert!(result.drawing.pixels().all(|p| p[0] == 0 || p[0] == 255));
    }

    #[test]
    fn test_pipeline_with_resize() {
        let pipeline = DrawingPipeline::builder().max_dimension(50).build();
        let result = pipeline.process(&create_test_image()).expect("Should process successfully");
        assert_eq!(result.dimensions(), (50, 50));
        assert_eq!(result.edges.dimensions(), (50, 50));
    }

    #[test]
    fn test_custom_extractor() {
        let pipeline = DrawingPipeline::builder()
            .set_simplifier(algorithms::IdentitySimplifier)
            .build();
        let result = pipeline.process(&create_test_image()).expect("Should process successfully");
        let vector = pipeline.vectorize(&result.drawing);
        assert!(vector.total_vertices() > 20, "Identity keeps every traced point");
    }

    #[test]
    fn test_outline_encloses_square() {
        let pipeline = DrawingPipeline::default();
        let result = pipeline.process(&create_test_image()).expect("Should process successfully");
        // Inside the square, near the boundary, the drawing carries a line;
        // far outside it stays background.
        assert_eq!(result.drawing.get_pixel(31, 50)[0], 0);
        assert_eq!(result.drawing.get_pixel(5, 5)[0], 255);
        assert_eq!(result.drawing.get_pixel(95, 95)[0], 255);
    }
}
