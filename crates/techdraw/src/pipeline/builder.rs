use crate::{
    algorithms::{ContourVectorizer, DouglasPeuckerSimplifier, OuterBorderExtractor},
    config::DrawingConfig,
    params::{FilterParameters, MaskCombine, SvgStyle},
    pipeline::DrawingPipeline,
    traits::{ContourExtractor, PolylineSimplifier},
};

/// Builder for creating drawing pipelines with a fluent API
pub struct PipelineBuilder {
    params: FilterParameters,
    style: SvgStyle,
    contour_extractor: Option<Box<dyn ContourExtractor>>,
    simplifier: Option<Box<dyn PolylineSimplifier>>,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self {
            params: FilterParameters::default(),
            style: SvgStyle::default(),
            contour_extractor: None,
            simplifier: None,
        }
    }

    /// Start from a loaded configuration
    pub fn from_config(config: DrawingConfig) -> Self {
        Self::new().params(config.filter).style(config.svg)
    }

    /// Replace every filter parameter at once
    pub fn params(mut self, params: FilterParameters) -> Self {
        self.params = params;
        self
    }

    /// Replace the SVG styling at once
    pub fn style(mut self, style: SvgStyle) -> Self {
        self.style = style;
        self
    }

    pub fn max_dimension(mut self, max_dimension: u32) -> Self {
        self.params.max_dimension = max_dimension;
        self
    }

    pub fn line_width(mut self, line_width: u32) -> Self {
        self.params.line_width = line_width;
        self
    }

    pub fn canny_thresholds(mut self, low: f32, high: f32) -> Self {
        self.params.canny_low = low;
        self.params.canny_high = high;
        self
    }

    pub fn adaptive_threshold(mut self, block_size: u32, c: f32) -> Self {
        self.params.adaptive_block_size = block_size;
        self.params.adaptive_c = c;
        self
    }

    pub fn combine(mut self, combine: MaskCombine) -> Self {
        self.params.combine = combine;
        self
    }

    pub fn stroke_width(mut self, stroke_width: f32) -> Self {
        self.style.stroke_width = stroke_width;
        self
    }

    pub fn stroke_color(mut self, stroke_color: impl Into<String>) -> Self {
        self.style.stroke_color = stroke_color.into();
        self
    }

    /// Douglas-Peucker tolerance as a fraction of each contour's length
    pub fn simplify_ratio(mut self, ratio: f64) -> Self {
        self.style.simplify_ratio = ratio;
        self
    }

    /// Set the contour extractor (replaces the default border follower)
    pub fn set_contour_extractor<E>(mut self, extractor: E) -> Self
    where
        E: ContourExtractor + 'static,
    {
        self.contour_extractor = Some(Box::new(extractor));
        self
    }

    /// Set the polyline simplifier (replaces Douglas-Peucker)
    pub fn set_simplifier<S>(mut self, simplifier: S) -> Self
    where
        S: PolylineSimplifier + 'static,
    {
        self.simplifier = Some(Box::new(simplifier));
        self
    }

    /// Build the pipeline with default components if not specified
    pub fn build(self) -> DrawingPipeline {
        let extractor = self
            .contour_extractor
            .unwrap_or_else(|| Box::new(OuterBorderExtractor));
        let simplifier = self
            .simplifier
            .unwrap_or_else(|| Box::new(DouglasPeuckerSimplifier));

        DrawingPipeline::with_vectorizer(
            self.params,
            ContourVectorizer::new(extractor, simplifier, self.style),
        )
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
