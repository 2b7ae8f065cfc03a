//! Data models and configuration
//!
//! Small value types shared by the services and the CLI, plus environment
//! configuration.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Pixel coordinate marking the focus point of a localized edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hotspot {
    pub x: u32,
    pub y: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpscaleTarget {
    #[serde(rename = "2K")]
    TwoK,
    #[serde(rename = "4K")]
    FourK,
}

impl UpscaleTarget {
    pub fn label(&self) -> &'static str {
        match self {
            UpscaleTarget::TwoK => "2K",
            UpscaleTarget::FourK => "4K",
        }
    }

    /// Target length of the longest edge, in pixels.
    pub fn long_edge(&self) -> u32 {
        match self {
            UpscaleTarget::TwoK => 2048,
            UpscaleTarget::FourK => 3840,
        }
    }
}

impl fmt::Display for UpscaleTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for UpscaleTarget {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "2K" => Ok(UpscaleTarget::TwoK),
            "4K" => Ok(UpscaleTarget::FourK),
            _ => Err(format!("Invalid upscale target '{}'. Expected 2K or 4K", s)),
        }
    }
}

pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image-preview";
pub const DEFAULT_DETECTION_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
/// Detection replies are short JSON, so the standalone client waits less.
pub const DEFAULT_DETECTION_TIMEOUT_SECS: u64 = 30;

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub image_model: String,
    pub detection_model: String,
    pub timeout_secs: u64,
    pub output_root: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let gemini_api_key = non_empty("GEMINI_API_KEY")
            .or_else(|| non_empty("API_KEY"))
            .ok_or_else(|| Error::Config("GEMINI_API_KEY not set".to_string()))?;

        let timeout_secs = match non_empty("PIXSHOP_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                Error::Config(format!(
                    "PIXSHOP_TIMEOUT_SECS must be a whole number of seconds, got '{}'",
                    raw
                ))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            gemini_api_key,
            image_model: non_empty("PIXSHOP_IMAGE_MODEL")
                .unwrap_or_else(|| DEFAULT_IMAGE_MODEL.to_string()),
            detection_model: non_empty("PIXSHOP_DETECTION_MODEL")
                .unwrap_or_else(|| DEFAULT_DETECTION_MODEL.to_string()),
            timeout_secs,
            output_root: non_empty("PIXSHOP_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("output")),
        })
    }
}
