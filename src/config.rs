//! Album configuration module.
//!
//! Handles loading, validating, and merging `album.toml`. Stock defaults are
//! overridden by whatever keys the user file sets; everything else keeps its
//! default value.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [media]
//! image_extensions = ["jpg", "jpeg", "png"]   # matched case-insensitively
//! video_extensions = ["mp4", "mpg", "mpeg"]
//!
//! [layout]
//! columns = 3               # images per row in generated templates
//! order = "asc"             # "asc" = oldest first, anything else = newest first
//! # stylesheet = "my.css"   # :use path written into generated templates
//!
//! [processing]
//! max_processes = 4         # Max parallel encoding workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Name of the config file looked up in the config directory.
pub const CONFIG_FILENAME: &str = "album.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Album configuration loaded from `album.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AlbumConfig {
    /// Which file extensions count as images and videos.
    pub media: MediaConfig,
    /// Defaults for `make-template`.
    pub layout: LayoutConfig,
    /// Parallel media encoding settings.
    pub processing: ProcessingConfig,
}

impl AlbumConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.layout.columns == 0 {
            return Err(ConfigError::Validation(
                "layout.columns must be at least 1".into(),
            ));
        }
        if self.media.image_extensions.is_empty() {
            return Err(ConfigError::Validation(
                "media.image_extensions must not be empty".into(),
            ));
        }
        if self.media.video_extensions.is_empty() {
            return Err(ConfigError::Validation(
                "media.video_extensions must not be empty".into(),
            ));
        }
        if let Some(ext) = self
            .media
            .image_extensions
            .iter()
            .find(|e| self.media.video_extensions.iter().any(|v| v.eq_ignore_ascii_case(e)))
        {
            return Err(ConfigError::Validation(format!(
                "extension \"{ext}\" is listed as both image and video"
            )));
        }
        Ok(())
    }
}

/// Extension sets used to classify files as images or videos.
///
/// Extensions are written without the leading dot and compared
/// case-insensitively.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MediaConfig {
    pub image_extensions: Vec<String>,
    pub video_extensions: Vec<String>,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            image_extensions: vec!["jpg".into(), "jpeg".into(), "png".into()],
            video_extensions: vec!["mp4".into(), "mpg".into(), "mpeg".into()],
        }
    }
}

/// Defaults applied by `make-template` when the command line leaves them out.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    /// Images per row.
    pub columns: usize,
    /// Sort order token: `asc` is oldest first, any other value newest first.
    pub order: String,
    /// Stylesheet referenced by the generated `:use` line. When absent the
    /// bundled stylesheet is written next to the template.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stylesheet: Option<String>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            columns: 3,
            order: "asc".to_string(),
            stylesheet: None,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel media encoding workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)`, never less than one
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(AlbumConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `album.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Load config from `album.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(dir: &Path) -> Result<AlbumConfig, ConfigError> {
    let merged = match load_raw_config(dir)? {
        Some(overlay) => merge_toml(stock_defaults_value()?, overlay),
        None => stock_defaults_value()?,
    };
    let config: AlbumConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `album.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Albummer Configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Media classification
# ---------------------------------------------------------------------------
[media]
# Extensions (without the dot) recognised as images. Matching ignores case.
image_extensions = ["jpg", "jpeg", "png"]

# Extensions recognised as videos. Videos are always embedded as video/mp4.
video_extensions = ["mp4", "mpg", "mpeg"]

# ---------------------------------------------------------------------------
# make-template defaults (command-line arguments take precedence)
# ---------------------------------------------------------------------------
[layout]
# Images per row. Videos always get a row of their own.
columns = 3

# "asc" lays out the oldest file first; any other value puts the newest first.
order = "asc"

# Stylesheet written into the :use line of new templates.
# Omit to use the bundled stylesheet (copied next to the template).
# stylesheet = "my.css"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel workers used to read and encode media files.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
