//! Configuration System using Figment
//!
//! This module provides strongly-typed configuration loading for the bridge.
//! Configuration is loaded from:
//! 1. A TOML file (default `config.toml`, see `--cfg`)
//! 2. Environment variables (prefixed with `BIOPAC_LSL_`, `__` between section and key)
//!
//! # Example
//! ```toml
//! [device]
//! dll_dir = "C:/Program Files/BIOPAC Systems, Inc/BIOPAC Hardware API 2.2 Research"
//! sampletime = 1
//! channels = "1,2,3"
//! digital_channels = "1"
//!
//! [sink]
//! stream_name = "biopac"
//! stream_type = "physio"
//! ```
//!
//! `BIOPAC_LSL_DEVICE__CHANNELS="1,2"` would override the analog channel list.

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};

use crate::hardware::{AcquisitionSettings, ChannelSelection};

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "BIOPAC_LSL_";

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Driver location, timing and channels
    pub device: DeviceConfig,
    /// Outgoing stream naming
    #[serde(default)]
    pub sink: SinkConfig,
    /// Log output
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// `[device]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Directory holding the vendor driver, searched after the system path
    #[serde(default)]
    pub dll_dir: Option<PathBuf>,
    /// Milliseconds per sample
    #[serde(default = "default_sampletime")]
    pub sampletime: f64,
    /// Analog channels (1-based)
    #[serde(deserialize_with = "channel_list")]
    pub channels: Vec<u32>,
    /// Digital channels (1-based)
    #[serde(default, deserialize_with = "channel_list")]
    pub digital_channels: Vec<u32>,
}

/// `[sink]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Stream name
    #[serde(default = "default_stream_name")]
    pub stream_name: String,
    /// Stream content type
    #[serde(default = "default_stream_type")]
    pub stream_type: String,
}

/// `[logging]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Logging level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default value functions
fn default_sampletime() -> f64 {
    1.0
}

fn default_stream_name() -> String {
    "biopac".to_string()
}

fn default_stream_type() -> String {
    "float".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            stream_name: default_stream_name(),
            stream_type: default_stream_type(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Accepted spellings of a channel list.
#[derive(Deserialize)]
#[serde(untagged)]
enum ChannelList {
    List(Vec<u32>),
    Single(u32),
    Text(String),
}

/// Deserialize `"1,3"`, `[1, 3]` or `1` into a list of indices.
fn channel_list<'de, D>(deserializer: D) -> Result<Vec<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    match ChannelList::deserialize(deserializer)? {
        ChannelList::List(list) => Ok(list),
        ChannelList::Single(channel) => Ok(vec![channel]),
        ChannelList::Text(text) => parse_channel_list(&text).map_err(serde::de::Error::custom),
    }
}

/// Parse a comma-separated channel list. Blank entries are skipped.
pub fn parse_channel_list(text: &str) -> Result<Vec<u32>, String> {
    text.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            item.parse::<u32>()
                .map_err(|e| format!("invalid channel '{item}': {e}"))
        })
        .collect()
}

impl BridgeConfig {
    /// Load configuration from [`DEFAULT_CONFIG_FILE`] and environment variables
    pub fn load() -> Result<Self, figment::Error> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Load configuration from a specific file path
    ///
    /// Environment variables can override configuration with prefix `BIOPAC_LSL_`.
    /// Example: `BIOPAC_LSL_DEVICE__SAMPLETIME=2`
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, figment::Error> {
        Self::figment(path.as_ref()).extract()
    }

    /// The provider stack, exposed for callers that want to merge more sources.
    pub fn figment(path: &Path) -> Figment {
        Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }

    /// Channel selection for the device binding.
    pub fn channel_selection(&self) -> ChannelSelection {
        ChannelSelection::new(
            self.device.channels.clone(),
            self.device.digital_channels.clone(),
        )
    }

    /// Acquisition settings for the device binding.
    pub fn acquisition_settings(&self) -> AcquisitionSettings {
        AcquisitionSettings::new(self.device.sampletime, self.channel_selection())
    }
}
