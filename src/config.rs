//! Viewer and renderer configuration
//!
//! Uses RON files; every field has a default so partial files are valid.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::app::ControlSteps;
use crate::rasterizer::{RasterSettings, HEIGHT, WIDTH};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("canvas must be at least 1x1, got {width}x{height}")]
    EmptyCanvas { width: usize, height: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Canvas width in pixels
    pub width: usize,
    /// Canvas height in pixels
    pub height: usize,
    pub raster: RasterSettings,
    pub controls: ControlSteps,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            width: WIDTH,
            height: HEIGHT,
            raster: RasterSettings::default(),
            controls: ControlSteps::default(),
        }
    }
}

/// Load a config from a RON string
pub fn parse_config(s: &str) -> Result<Config, ConfigError> {
    let config: Config = ron::from_str(s)?;
    if config.width == 0 || config.height == 0 {
        return Err(ConfigError::EmptyCanvas {
            width: config.width,
            height: config.height,
        });
    }
    Ok(config)
}

/// Load a config from a RON file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let contents = fs::read_to_string(path)?;
    parse_config(&contents)
}
