use std::fs;
use std::path::Path;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{DrawingError, Result};
use crate::params::{FilterParameters, SvgStyle};

/// File-backed configuration: raster filter parameters plus SVG styling.
///
/// ```toml
/// [filter]
/// max_dimension = 1200
/// adaptive_block_size = 15
///
/// [svg]
/// simplify_ratio = 0.02
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DrawingConfig {
    pub filter: FilterParameters,
    pub svg: SvgStyle,
}

impl DrawingConfig {
    /// Load configuration from a TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = read(path.as_ref())?;
        Self::from_toml(&content)
    }

    /// Load configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = read(path.as_ref())?;
        Self::from_json(&content)
    }

    /// Load configuration from JSON string
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load from a `.toml` or `.json` file, chosen by extension.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => Err(DrawingError::Config(format!(
                "unsupported configuration format for {}; use .toml or .json",
                path.display()
            ))),
        }
    }

    /// Convert configuration to TOML string
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// JSON schema describing the configuration file
    pub fn schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(DrawingConfig)
    }
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| DrawingError::Io {
        path: path.to_path_buf(),
        source,
    })
}
