use image::GrayImage;
use crate::{error::Result, types::{Contour, Polyline}};

/// A single-channel raster stage (smoothing, thresholding, edge detection)
pub trait GrayFilter: Send + Sync {
    /// Produce a freshly allocated output; the input is never modified.
    fn apply(&self, image: &GrayImage) -> Result<GrayImage>;
}

/// Trait for contour extraction algorithms
pub trait ContourExtractor: Send + Sync {
    /// Trace boundaries of the drawn (0-valued) regions of a binary drawing
    fn extract_contours(&self, drawing: &GrayImage) -> Vec<Contour>;
}

/// Trait for polyline simplification algorithms
pub trait PolylineSimplifier: Send + Sync {
    /// Reduce the vertex count of an open contour. `ratio` scales the
    /// tolerance by the contour length; 0 keeps every point.
    fn simplify(&self, contour: &Contour, ratio: f64) -> Polyline;
}
