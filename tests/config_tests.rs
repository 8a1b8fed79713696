//! Tests for configuration files, presets and schema generation.

use quote_scorer::config::{
    generate_example_config, generate_json_schema, load_config_file, load_or_default,
    ConfigFileError, ConfigPreset, EngineConfig, Validatable,
};
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("write config");
    path
}

#[test]
fn test_load_full_config() {
    let tmp = TempDir::new().expect("temp dir");
    let path = write(
        &tmp,
        ".quote-scorer.yaml",
        "ml:\n  enabled: false\n  timeout_ms: 750\n  max_weight: 0.2\n\
         execution:\n  parallel_axes: false\n\
         reporting:\n  max_recommendations: 5\n  include_minor_alerts_in_summary: true\n",
    );

    let config = load_config_file(&path).expect("valid config");
    assert!(!config.ml.enabled);
    assert_eq!(config.ml.timeout_ms, 750);
    assert!((config.ml.max_weight - 0.2).abs() < f64::EPSILON);
    assert!(!config.execution.parallel_axes);
    assert_eq!(config.reporting.max_recommendations, Some(5));
    assert!(config.reporting.include_minor_alerts_in_summary);
    assert!(config.validate().is_empty());
}

#[test]
fn test_missing_sections_take_defaults() {
    let tmp = TempDir::new().expect("temp dir");
    let path = write(&tmp, "quote-scorer.yaml", "execution:\n  parallel_axes: false\n");

    let config = load_config_file(&path).expect("valid config");
    assert_eq!(config.ml, EngineConfig::default().ml);
    assert!(!config.execution.parallel_axes);
}

#[test]
fn test_empty_file_is_default() {
    let tmp = TempDir::new().expect("temp dir");
    let path = write(&tmp, "quote-scorer.yaml", "   \n");
    assert_eq!(load_config_file(&path).expect("empty config"), EngineConfig::default());
}

#[test]
fn test_missing_file_is_reported() {
    let tmp = TempDir::new().expect("temp dir");
    let err = load_config_file(&tmp.path().join("absent.yaml")).expect_err("no file");
    assert!(matches!(err, ConfigFileError::NotFound(_)));
}

#[test]
fn test_invalid_yaml_falls_back_to_default() {
    let tmp = TempDir::new().expect("temp dir");
    let path = write(&tmp, "broken.yaml", "ml: [unclosed\n");

    assert!(matches!(
        load_config_file(&path),
        Err(ConfigFileError::Parse(_))
    ));
    let (config, loaded_from) = load_or_default(Some(&path));
    assert_eq!(config, EngineConfig::default());
    assert!(loaded_from.is_none());
}

#[test]
fn test_explicit_path_is_reported() {
    let tmp = TempDir::new().expect("temp dir");
    let path = write(&tmp, "custom.yaml", "ml:\n  timeout_ms: 100\n");

    let (config, loaded_from) = load_or_default(Some(&path));
    assert_eq!(config.ml.timeout_ms, 100);
    assert_eq!(loaded_from, Some(path));
}

#[test]
fn test_out_of_range_values_fail_validation() {
    let tmp = TempDir::new().expect("temp dir");
    let path = write(
        &tmp,
        "quote-scorer.yaml",
        "ml:\n  timeout_ms: 0\n  max_weight: 0.8\nreporting:\n  max_recommendations: 0\n",
    );

    let errors = load_config_file(&path).expect("parses").validate();
    let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
    assert_eq!(fields.len(), 3, "{fields:?}");
}

#[test]
fn test_example_config_round_trips() {
    let example = generate_example_config();
    assert!(example.starts_with("# quote-scorer configuration"));

    let tmp = TempDir::new().expect("temp dir");
    let path = write(&tmp, ".quote-scorer.yaml", &example);
    assert_eq!(load_config_file(&path).expect("example parses"), EngineConfig::default());
}

#[test]
fn test_presets_are_valid() {
    for preset in ConfigPreset::all() {
        let config = EngineConfig::from_preset(*preset);
        assert!(config.validate().is_empty(), "preset {preset} is invalid");
        assert_eq!(ConfigPreset::from_name(preset.name()), Some(*preset));
    }
    assert!(!EngineConfig::from_preset(ConfigPreset::Deterministic).ml.enabled);
    assert!(!EngineConfig::from_preset(ConfigPreset::Deterministic).execution.parallel_axes);
}

#[test]
fn test_json_schema_lists_sections() {
    let schema: serde_json::Value =
        serde_json::from_str(&generate_json_schema()).expect("schema is JSON");
    let properties = schema["properties"].as_object().expect("object schema");
    for section in ["ml", "execution", "reporting"] {
        assert!(properties.contains_key(section), "missing {section}");
    }
}
