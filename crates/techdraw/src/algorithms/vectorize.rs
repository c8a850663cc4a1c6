use image::GrayImage;
use tracing::{debug, instrument};

use crate::{
    algorithms::{DouglasPeuckerSimplifier, OuterBorderExtractor},
    params::SvgStyle,
    traits::{ContourExtractor, PolylineSimplifier},
    types::{VectorDrawing, VectorPath},
};

/// Traces the binary drawing and turns every boundary into a simplified
/// straight-segment path.
pub struct ContourVectorizer {
    extractor: Box<dyn ContourExtractor>,
    simplifier: Box<dyn PolylineSimplifier>,
    style: SvgStyle,
}

impl ContourVectorizer {
    pub fn new(
        extractor: Box<dyn ContourExtractor>,
        simplifier: Box<dyn PolylineSimplifier>,
        style: SvgStyle,
    ) -> Self {
        Self {
            extractor,
            simplifier,
            style: style.normalized(),
        }
    }

    pub fn with_style(style: SvgStyle) -> Self {
        Self::new(
            Box::new(OuterBorderExtractor),
            Box::new(DouglasPeuckerSimplifier),
            style,
        )
    }

    pub fn style(&self) -> &SvgStyle {
        &self.style
    }

    #[instrument(skip_all, fields(width = drawing.width(), height = drawing.height()))]
    pub fn vectorize(&self, drawing: &GrayImage) -> VectorDrawing {
        let contours = self.extractor.extract_contours(drawing);
        let traced = contours.len();

        let paths: Vec<VectorPath> = contours
            .iter()
            .filter(|contour| contour.len() >= 2)
            .map(|contour| self.simplifier.simplify(contour, self.style.simplify_ratio))
            .filter_map(|polyline| VectorPath::from_polyline(&polyline))
            .collect();

        debug!(
            traced,
            emitted = paths.len(),
            simplify_ratio = self.style.simplify_ratio,
            "Contours vectorized"
        );

        VectorDrawing {
            width: drawing.width(),
            height: drawing.height(),
            style: self.style.clone(),
            paths,
        }
    }
}

impl Default for ContourVectorizer {
    fn default() -> Self {
        Self::with_style(SvgStyle::default())
    }
}
