/*!
 * Tests for configuration loading, validation and derived settings
 */

use std::path::PathBuf;

use asstools::app_config::{self, Config, LogLevel};
use asstools::errors::ConfigError;
use asstools::export::FilterRule;
use crate::common;

/// Test default configuration values
#[test]
fn test_default_config_shouldHaveExpectedValues() {
    let config = Config::default();
    assert_eq!(config.inputs, vec![PathBuf::from(".")]);
    assert!(config.outputs.is_empty());
    assert!(!config.export.enabled);
    assert_eq!(config.export.field_name, "Style");
    assert_eq!(config.export.filter, vec!["中文字幕", "英文字幕"]);
    assert_eq!(config.export.name_tails, vec!["_CN", "_EN"]);
    assert_eq!(config.delete.sections, vec!["[Aegisub Project Garbage]"]);
    assert_eq!(config.delete.name_tail, "_new");
    assert!(!config.output.keep_source_encoding);
    assert_eq!(config.log_level, LogLevel::Info);
    assert!(config.validate().is_ok());
}

/// Missing keys fall back to their defaults
#[test]
fn test_fromJson_withPartialConfig_shouldFillDefaults() {
    let json = r#"{ "export": { "enabled": true, "filter": [] }, "log_level": "debug" }"#;
    let config = Config::from_json(json).unwrap();
    assert!(config.export.enabled);
    assert!(config.export.filter.is_empty());
    assert_eq!(config.export.field_name, "Style");
    assert_eq!(config.log_level, LogLevel::Debug);
}

/// Unknown keys are rejected rather than ignored
#[test]
fn test_fromJson_withUnknownKey_shouldFail() {
    let err = Config::from_json(r#"{ "export": { "enabeld": true } }"#).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn test_validate_withEmptyFieldName_shouldFail() {
    let mut config = Config::default();
    config.export.field_name = "  ".to_string();
    let err = config.validate().unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "export.field_name"));
}

#[test]
fn test_validate_withPathSeparatorInTail_shouldFail() {
    let mut config = Config::default();
    config.export.name_tails = vec!["_CN".to_string(), "../EN".to_string()];
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.delete.name_tail = "sub\\x".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withUnbracketedSection_shouldFail() {
    let mut config = Config::default();
    config.delete.sections = vec!["Fonts".to_string()];
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("Fonts"));
}

#[test]
fn test_validate_withDeleteEnabledAndNoSections_shouldFail() {
    let mut config = Config::default();
    config.delete.enabled = true;
    config.delete.sections.clear();
    assert!(config.validate().is_err());
}

/// The export settings are derived from the configuration
#[test]
fn test_exportOptions_shouldReflectConfig() {
    let mut config = Config::default();
    config.export.keep_override_code = true;
    config.export.custom_message = Some(String::new());
    config.output.keep_source_encoding = true;

    let options = config.export_options();
    assert!(!options.strip_override);
    assert!(options.keep_source_encoding);
    assert_eq!(options.custom_message, "");
    assert_eq!(options.rules.rules()[0], FilterRule::new("中文字幕", "_CN"));
}

/// Without a custom message the default banner is used
#[test]
fn test_exportOptions_withoutMessage_shouldUseBanner() {
    let options = Config::default().export_options();
    assert_eq!(options.custom_message, app_config::default_custom_message());
    assert!(options.custom_message.starts_with("# Exported by asstools"));
}

/// A saved configuration loads back unchanged
#[test]
fn test_saveAndLoad_shouldPreserveValues() {
    let temp_dir = common::create_temp_dir().unwrap();
    let path = temp_dir.path().join("asstools.json");

    let mut config = Config::default();
    config.export.enabled = true;
    config.export.rename_number = true;
    config.outputs = vec![PathBuf::from("out")];
    config.save(&path).unwrap();

    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_load_withMissingFile_shouldFail() {
    let temp_dir = common::create_temp_dir().unwrap();
    assert!(Config::load(temp_dir.path().join("missing.json")).is_err());
}

#[test]
fn test_sectionsToDelete_shouldContainConfiguredNames() {
    let sections = Config::default().sections_to_delete();
    assert!(sections.contains("[Aegisub Project Garbage]"));
    assert_eq!(sections.len(), 1);
}
