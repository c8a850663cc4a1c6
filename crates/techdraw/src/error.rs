use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DrawingError {
    #[error("Failed to decode image {}: {source}", path.display())]
    DecodeFailure {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Mask dimensions differ: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        expected: (u32, u32),
        found: (u32, u32),
    },

    /// Raster or vector output could not be written.
    #[error("Failed to write output {}: {source}", path.display())]
    EncodeFailure {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DrawingError>;
