use std::fs;
use std::path::{Path, PathBuf};

use techdraw::{
    DrawingConfig, DrawingError, DrawingPipeline, MaskCombine, PipelineBuilder, TechnicalDrawing,
    io::{load_color_image, save_gray_image, svg::write_svg},
};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Drawing(#[from] DrawingError),
    #[error("Failed to create directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Parameter values given explicitly on the command line. Each one, when
/// present, overrides the configuration file and the defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub max_dimension: Option<u32>,
    pub line_width: Option<u32>,
    pub stroke_width: Option<f32>,
    pub simplify_ratio: Option<f64>,
    pub stroke_color: Option<String>,
    pub canny_low: Option<f32>,
    pub canny_high: Option<f32>,
    pub adaptive_block_size: Option<u32>,
    pub adaptive_c: Option<f32>,
    pub combine: Option<MaskCombine>,
}

impl Overrides {
    pub fn apply(&self, mut config: DrawingConfig) -> DrawingConfig {
        let filter = &mut config.filter;
        if let Some(v) = self.max_dimension {
            filter.max_dimension = v;
        }
        if let Some(v) = self.line_width {
            filter.line_width = v;
        }
        if let Some(v) = self.canny_low {
            filter.canny_low = v;
        }
        if let Some(v) = self.canny_high {
            filter.canny_high = v;
        }
        if let Some(v) = self.adaptive_block_size {
            filter.adaptive_block_size = v;
        }
        if let Some(v) = self.adaptive_c {
            filter.adaptive_c = v;
        }
        if let Some(v) = self.combine {
            filter.combine = v;
        }

        let svg = &mut config.svg;
        if let Some(v) = self.stroke_width {
            svg.stroke_width = v;
        }
        if let Some(v) = self.simplify_ratio {
            svg.simplify_ratio = v;
        }
        if let Some(v) = &self.stroke_color {
            svg.stroke_color = v.clone();
        }
        config
    }
}

/// One photo-to-drawing conversion with its output destinations.
#[derive(Debug, Clone)]
pub struct DrawingJob {
    pub input: PathBuf,
    pub output: PathBuf,
    pub svg: Option<PathBuf>,
    pub edges: Option<PathBuf>,
    pub config: DrawingConfig,
}

/// What a finished job produced.
#[derive(Debug, Clone, PartialEq)]
pub struct JobReport {
    pub width: u32,
    pub height: u32,
    pub line_pixels: usize,
    pub svg_paths: Option<usize>,
}

impl DrawingJob {
    /// Decode, process and write every requested output. Nothing is written
    /// unless processing succeeds, and if one write fails the files already
    /// written by this run are removed again.
    pub fn run(&self) -> Result<JobReport, CliError> {
        let pipeline: DrawingPipeline = PipelineBuilder::from_config(self.config.clone()).build();
        info!("{}", pipeline.info());

        let photo = load_color_image(&self.input)?;
        let result = pipeline.process(&photo)?;
        let vector = self.svg.as_ref().map(|_| pipeline.vectorize(&result.drawing));
        let svg_text = vector.as_ref().map(|v| v.to_svg());

        let destinations = [Some(&self.output), self.edges.as_ref(), self.svg.as_ref()];
        for path in destinations.into_iter().flatten() {
            ensure_parent_dir(path)?;
        }

        let mut written: Vec<&Path> = Vec::new();
        if let Err(err) = self.write_outputs(&result, svg_text.as_deref(), &mut written) {
            for path in written {
                if let Err(remove_err) = fs::remove_file(path) {
                    warn!("Could not remove {}: {remove_err}", path.display());
                }
            }
            return Err(err.into());
        }

        let (width, height) = result.dimensions();
        Ok(JobReport {
            width,
            height,
            line_pixels: result.line_pixel_count(),
            svg_paths: vector.as_ref().map(|v| v.path_count()),
        })
    }

    fn write_outputs<'a>(
        &'a self,
        result: &TechnicalDrawing,
        svg_text: Option<&str>,
        written: &mut Vec<&'a Path>,
    ) -> Result<(), DrawingError> {
        save_gray_image(&self.output, &result.drawing)?;
        written.push(&self.output);
        info!("Drawing written to {}", self.output.display());

        if let Some(path) = &self.edges {
            save_gray_image(path, &result.edges)?;
            written.push(path);
            info!("Edge map written to {}", path.display());
        }

        if let (Some(path), Some(text)) = (&self.svg, svg_text) {
            write_svg(path, text)?;
            written.push(path);
            info!("SVG written to {}", path.display());
        }
        Ok(())
    }
}

/// Create the parent directory of an output path if it does not exist.
pub fn ensure_parent_dir(path: &Path) -> Result<(), CliError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|source| CliError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })
        }
        _ => Ok(()),
    }
}
