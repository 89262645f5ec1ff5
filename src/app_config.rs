use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::default::Default;
use std::path::{Path, PathBuf};

use crate::errors::ConfigError;
use crate::export::{ExportOptions, FilterRules};

/// Application configuration module
/// This module handles the declarative JSON configuration: loading,
/// validating and saving it. Configuration files are plain data and are
/// never evaluated.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Input files or directories
    #[serde(default = "default_inputs")]
    pub inputs: Vec<PathBuf>,

    /// Output directories, paired with `inputs` by position
    #[serde(default)]
    pub outputs: Vec<PathBuf>,

    /// Send every input to the first output directory
    #[serde(default)]
    pub limited_output: bool,

    /// Event export job
    #[serde(default)]
    pub export: ExportConfig,

    /// Section deletion job
    #[serde(default)]
    pub delete: DeleteConfig,

    /// Output encoding settings shared by both jobs
    #[serde(default)]
    pub output: OutputConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

// @struct: Event export settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ExportConfig {
    // @field: Run the export job
    #[serde(default)]
    pub enabled: bool,

    // @field: Field used to group events
    #[serde(default = "default_field_name")]
    pub field_name: String,

    // @field: First line of every exported file; None means the default banner
    #[serde(default)]
    pub custom_message: Option<String>,

    // @field: Field contents selecting the exported events
    #[serde(default = "default_filter")]
    pub filter: Vec<String>,

    // @field: Output name tails, paired with `filter` by position
    #[serde(default = "default_name_tails")]
    pub name_tails: Vec<String>,

    // @field: Also export everything but the text into `_t` files
    #[serde(default)]
    pub text_excluded: bool,

    // @field: Name outputs `E<number>` after the first number in the input name
    #[serde(default)]
    pub rename_number: bool,

    // @field: Keep `{...}` override codes in exported text
    #[serde(default)]
    pub keep_override_code: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            field_name: default_field_name(),
            custom_message: None,
            filter: default_filter(),
            name_tails: default_name_tails(),
            text_excluded: false,
            rename_number: false,
            keep_override_code: false,
        }
    }
}

/// Section deletion settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DeleteConfig {
    /// Run the deletion job
    #[serde(default)]
    pub enabled: bool,

    /// Section headers to remove, brackets included
    #[serde(default = "default_sections")]
    pub sections: Vec<String>,

    /// Appended to the output file stem
    #[serde(default = "default_delete_name_tail")]
    pub name_tail: String,

    /// Write the result back over the input file
    #[serde(default)]
    pub overwrite: bool,
}

impl Default for DeleteConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            sections: default_sections(),
            name_tail: default_delete_name_tail(),
            overwrite: false,
        }
    }
}

/// Output encoding settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Write outputs in the input's encoding (CRLF for exports) instead of
    /// UTF-8 without BOM and LF
    #[serde(default)]
    pub keep_source_encoding: bool,
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_inputs() -> Vec<PathBuf> {
    vec![PathBuf::from(".")]
}

fn default_field_name() -> String {
    "Style".to_string()
}

fn default_filter() -> Vec<String> {
    vec!["中文字幕".to_string(), "英文字幕".to_string()]
}

fn default_name_tails() -> Vec<String> {
    vec!["_CN".to_string(), "_EN".to_string()]
}

fn default_sections() -> Vec<String> {
    vec!["[Aegisub Project Garbage]".to_string()]
}

fn default_delete_name_tail() -> String {
    "_new".to_string()
}

/// Banner written when no custom message is configured
pub fn default_custom_message() -> String {
    format!("# Exported by asstools {}", env!("CARGO_PKG_VERSION"))
}

impl Config {
    /// Parse a configuration from JSON text and validate it.
    pub fn from_json(json: &str) -> std::result::Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("Failed to load config file: {}", path.display()))
    }

    /// Write the configuration as pretty JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).context("Failed to serialize config to JSON")?;
        std::fs::write(path, json).with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.export.field_name.trim().is_empty() {
            return Err(invalid("export.field_name", "must not be empty"));
        }

        for tail in &self.export.name_tails {
            if has_path_separator(tail) {
                return Err(invalid("export.name_tails", &format!("'{}' contains a path separator", tail)));
            }
        }

        if self.delete.enabled && self.delete.sections.is_empty() {
            return Err(invalid("delete.sections", "at least one section is required"));
        }

        for section in &self.delete.sections {
            if section.len() < 2 || !section.starts_with('[') || !section.ends_with(']') {
                return Err(invalid(
                    "delete.sections",
                    &format!("'{}' is not a bracketed section name", section),
                ));
            }
        }

        if has_path_separator(&self.delete.name_tail) {
            return Err(invalid("delete.name_tail", "contains a path separator"));
        }

        Ok(())
    }

    /// Build the immutable export settings for one run.
    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            field_name: self.export.field_name.clone(),
            rules: FilterRules::new(&self.export.filter, &self.export.name_tails),
            strip_override: !self.export.keep_override_code,
            text_excluded: self.export.text_excluded,
            rename_number: self.export.rename_number,
            keep_source_encoding: self.output.keep_source_encoding,
            custom_message: self
                .export
                .custom_message
                .clone()
                .unwrap_or_else(default_custom_message),
        }
    }

    /// Section headers to delete
    pub fn sections_to_delete(&self) -> HashSet<String> {
        self.delete.sections.iter().cloned().collect()
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            inputs: default_inputs(),
            outputs: Vec::new(),
            limited_output: false,
            export: ExportConfig::default(),
            delete: DeleteConfig::default(),
            output: OutputConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

fn invalid(key: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn has_path_separator(value: &str) -> bool {
    value.contains('/') || value.contains('\\')
}
