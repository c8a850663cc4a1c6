pub mod builder;

use image::{GrayImage, RgbImage};
use tracing::{info, instrument};

use crate::{
    algorithms::{AdaptiveThreshold, Compositor, ContourVectorizer, EdgeDetector, Preprocessor},
    error::Result,
    params::{FilterParameters, SvgStyle},
    traits::GrayFilter,
    types::{TechnicalDrawing, VectorDrawing},
};

/// Photo to technical drawing pipeline.
///
/// The preprocessed gray image is shared by the threshold and edge branches;
/// their masks meet in the compositor, whose output is both the raster
/// result and the only input of the vectorizer.
pub struct DrawingPipeline {
    params: FilterParameters,
    preprocessor: Preprocessor,
    threshold: AdaptiveThreshold,
    edges: EdgeDetector,
    compositor: Compositor,
    vectorizer: ContourVectorizer,
}

impl DrawingPipeline {
    /// Create a new pipeline builder
    pub fn builder() -> builder::PipelineBuilder {
        builder::PipelineBuilder::new()
    }

    /// Create a pipeline with the given parameters and the default vectorizer
    pub fn new(params: FilterParameters, style: SvgStyle) -> Self {
        Self::with_vectorizer(params, ContourVectorizer::with_style(style))
    }

    pub fn with_vectorizer(params: FilterParameters, vectorizer: ContourVectorizer) -> Self {
        let params = params.normalized();
        Self {
            preprocessor: Preprocessor::new(params.max_dimension),
            threshold: AdaptiveThreshold::new(params.adaptive_block_size, params.adaptive_c),
            edges: EdgeDetector::new(params.canny_low, params.canny_high, params.line_width),
            compositor: Compositor::new(params.combine),
            vectorizer,
            params,
        }
    }

    pub fn params(&self) -> &FilterParameters {
        &self.params
    }

    pub fn style(&self) -> &SvgStyle {
        self.vectorizer.style()
    }

    /// Run the raster stages on a color image.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn process(&self, image: &RgbImage) -> Result<TechnicalDrawing> {
        let smoothed = self.preprocessor.run(image)?;
        self.process_gray(&smoothed)
    }

    /// Run threshold, edge and composition stages on an already smoothed
    /// gray image.
    pub fn process_gray(&self, smoothed: &GrayImage) -> Result<TechnicalDrawing> {
        let threshold = self.threshold.apply(smoothed)?;
        let edges = self.edges.apply(smoothed)?;
        let drawing = self.compositor.compose(&threshold, &edges)?;

        let result = TechnicalDrawing { drawing, edges };
        let (width, height) = result.dimensions();
        info!(
            width,
            height,
            line_pixels = result.line_pixel_count(),
            "Technical drawing created"
        );
        Ok(result)
    }

    /// Trace and simplify the binary drawing into vector paths.
    pub fn vectorize(&self, drawing: &GrayImage) -> VectorDrawing {
        let vector = self.vectorizer.vectorize(drawing);
        info!(
            paths = vector.path_count(),
            vertices = vector.total_vertices(),
            "Drawing vectorized"
        );
        vector
    }

    /// Get information about the pipeline configuration
    pub fn info(&self) -> String {
        format!(
            "Pipeline: max_dimension={}, block={}, c={}, canny={}..{}, line_width={}, combine={}, simplify={}",
            self.params.max_dimension,
            self.params.adaptive_block_size,
            self.params.adaptive_c,
            self.params.canny_low,
            self.params.canny_high,
            self.params.line_width,
            self.params.combine,
            self.style().simplify_ratio,
        )
    }
}

impl Default for DrawingPipeline {
    fn default() -> Self {
        Self::new(FilterParameters::default(), SvgStyle::default())
    }
}
