//! Assembler configuration.
//!
//! Handles loading, validating, and merging `mdma.toml`. Stock defaults are
//! the base layer; a user file is merged on top, and command-line flags
//! override both.
//!
//! ```text
//! stock defaults  →  mdma.toml (cwd or --config)  →  CLI flags
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [markdown]
//! dialect = "github"        # or "commonmark"
//!
//! [output]
//! minify = false            # no indentation, no wrapping
//! indent = 2                # spaces per nesting level (0-8)
//! wrap = 68                 # text wrap column (0 = never, otherwise >= 20)
//!
//! [media]
//! monolith = false          # embed images, stylesheets and icons as data URIs
//! preview = 8               # image preview shrink factor (0 or 1 = no previews)
//! remote = true             # fetch http(s) assets
//! base_dir = ""             # root for relative asset paths
//! ```
//!
//! Config files are sparse: override just the values you want. Unknown keys
//! are rejected to catch typos early.

use crate::dom::WriteOptions;
use crate::markdown::Dialect;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Config file picked up from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "mdma.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Everything that tunes one assembly.
///
/// All fields have defaults; user files need only the values they change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssemblerConfig {
    pub markdown: MarkdownConfig,
    pub output: OutputConfig,
    pub media: MediaConfig,
}

impl AssemblerConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.output.indent > 8 {
            return Err(ConfigError::Validation(
                "output.indent must be 0-8".into(),
            ));
        }
        if self.output.wrap != 0 && self.output.wrap < 20 {
            return Err(ConfigError::Validation(
                "output.wrap must be 0 or at least 20".into(),
            ));
        }
        Ok(())
    }

    /// Serializer settings for this config.
    pub fn write_options(&self) -> WriteOptions {
        if self.output.minify {
            WriteOptions::minified()
        } else {
            WriteOptions::pretty(self.output.indent, self.output.wrap)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarkdownConfig {
    pub dialect: Dialect,
}

/// Serializer formatting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub minify: bool,
    /// Spaces per nesting level in pretty mode.
    pub indent: usize,
    /// Text wrap column in pretty mode; 0 never wraps.
    pub wrap: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            minify: false,
            indent: 2,
            wrap: 68,
        }
    }
}

/// Image, stylesheet and icon handling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MediaConfig {
    /// Replace asset references with `data:` URIs.
    pub monolith: bool,
    /// Preview shrink factor; previews are only made above 1.
    pub preview: u8,
    /// Allow `http(s)` asset fetches.
    pub remote: bool,
    /// Root for relative asset paths. Empty means the Markdown file's
    /// directory, or the working directory for stdin.
    pub base_dir: String,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            monolith: false,
            preview: 8,
            remote: true,
            base_dir: String::new(),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(AssemblerConfig::default()).expect("default config must serialize")
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

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist, `Err` if it exists but
/// contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<AssemblerConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: AssemblerConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path`, merged on top of stock defaults.
///
/// A missing file yields the defaults. Unknown keys and out-of-range values
/// are errors.
pub fn load_config(path: &Path) -> Result<AssemblerConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `mdma.toml` with all keys and explanations.
///
/// Used by the `--gen-config` CLI flag.
pub fn stock_config_toml() -> &'static str {
    r##"# MDMA Configuration
# ==================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# The file is read from ./mdma.toml, or from the path given with --config.
# Command-line flags override the values set here.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Markdown
# ---------------------------------------------------------------------------
[markdown]
# "github" adds tables, strikethrough, task lists, footnotes and
# blockquote tags to plain "commonmark".
dialect = "github"

# ---------------------------------------------------------------------------
# Output formatting
# ---------------------------------------------------------------------------
[output]
# Drop all indentation and wrapping.
minify = false

# Spaces per nesting level when not minified (0-8).
indent = 2

# Wrap text at this column when not minified. 0 disables wrapping,
# otherwise it must be at least 20.
wrap = 68

# ---------------------------------------------------------------------------
# Media
# ---------------------------------------------------------------------------
[media]
# Embed images, stylesheets and icons as data: URIs so the page is a
# single self-contained file.
monolith = false

# Images get a tiny inline preview (shown as their background while the
# real image loads), shrunk by this factor. 0 or 1 disables previews.
# Images with transparency or an existing style are left alone.
preview = 8

# Fetch http(s) assets. When false, remote references stay as they are.
remote = true

# Directory relative asset paths are resolved against. Empty means the
# Markdown file's directory, or the working directory when reading stdin.
base_dir = ""
"##
}
