use clap::Parser;
use cli::{DrawingJob, Overrides};
use color_eyre::eyre::{Result, eyre};
use std::path::PathBuf;
use techdraw::{DrawingConfig, MaskCombine};
use tracing::info;
use tracing_subscriber::{self, EnvFilter};

/// Convert a photo to a technical drawing.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to input image
    #[arg(short, long, required_unless_present_any = ["print_schema", "print_config"])]
    input: Option<PathBuf>,
    /// Path to output PNG drawing
    #[arg(short, long, required_unless_present_any = ["print_schema", "print_config"])]
    output: Option<PathBuf>,
    /// Optional path to output SVG
    #[arg(long)]
    svg: Option<PathBuf>,
    /// Optional path to write the thickened edge map
    #[arg(long)]
    edges: Option<PathBuf>,
    /// TOML or JSON configuration file; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Resize so max side <= this value (0 to disable) [default: 1600]
    #[arg(long)]
    max_dim: Option<u32>,
    /// Line strengthening in pixels for raster output [default: 2]
    #[arg(long)]
    line_width: Option<u32>,
    /// Stroke width used in SVG export [default: 1.0]
    #[arg(long)]
    stroke_width: Option<f32>,
    /// Polyline simplification ratio for SVG (0-0.1) [default: 0.01]
    #[arg(long)]
    simplify: Option<f64>,
    /// Stroke color used in SVG export [default: #000]
    #[arg(long)]
    stroke_color: Option<String>,
    /// Canny lower threshold [default: 40]
    #[arg(long)]
    canny_low: Option<f32>,
    /// Canny upper threshold [default: 120]
    #[arg(long)]
    canny_high: Option<f32>,
    /// Adaptive threshold block size (odd >= 3) [default: 21]
    #[arg(long)]
    adaptive_block: Option<u32>,
    /// Adaptive threshold constant [default: 2]
    #[arg(long)]
    adaptive_c: Option<f32>,
    /// How threshold and edge masks merge: union or intersection [default: union]
    #[arg(long)]
    combine: Option<MaskCombine>,
    /// Print the JSON schema of the configuration file and exit
    #[arg(long)]
    print_schema: bool,
    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            max_dimension: self.max_dim,
            line_width: self.line_width,
            stroke_width: self.stroke_width,
            simplify_ratio: self.simplify,
            stroke_color: self.stroke_color.clone(),
            canny_low: self.canny_low,
            canny_high: self.canny_high,
            adaptive_block_size: self.adaptive_block,
            adaptive_c: self.adaptive_c,
            combine: self.combine,
        }
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    let cli = Cli::parse();

    if cli.print_schema {
        println!("{}", serde_json::to_string_pretty(&DrawingConfig::schema())?);
        return Ok(());
    }

    let base = match &cli.config {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            DrawingConfig::from_file(path)?
        }
        None => DrawingConfig::default(),
    };
    let config = cli.overrides().apply(base);

    if cli.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    let (Some(input), Some(output)) = (cli.input, cli.output) else {
        return Err(eyre!("--input and --output are required"));
    };

    let job = DrawingJob {
        input,
        output,
        svg: cli.svg,
        edges: cli.edges,
        config,
    };
    let report = job.run()?;

    info!(
        "✅ Drawing {}x{} with {} line pixels{}",
        report.width,
        report.height,
        report.line_pixels,
        report
            .svg_paths
            .map(|n| format!(", {n} SVG paths"))
            .unwrap_or_default()
    );
    Ok(())
}
