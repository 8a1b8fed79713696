//! Configuration module for quote-scorer.
//!
//! This module provides:
//! - Type-safe configuration structures
//! - Validation for all configuration values
//! - Named presets
//! - YAML config file loading and discovery
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use quote_scorer::config::{EngineConfig, ConfigPreset};
//!
//! let config = EngineConfig::from_preset(ConfigPreset::Deterministic);
//!
//! let config = EngineConfig::builder()
//!     .ml_timeout_ms(500)
//!     .parallel_axes(false)
//!     .build();
//!
//! use quote_scorer::config::load_or_default;
//! let (config, loaded_from) = load_or_default(None);
//! ```
//!
//! # Configuration File
//!
//! Place a `.quote-scorer.yaml` file in the working directory or
//! `~/.config/quote-scorer/`:
//!
//! ```yaml
//! ml:
//!   enabled: true
//!   timeout_ms: 1500
//!   max_weight: 0.2
//! execution:
//!   parallel_axes: false
//! ```

mod defaults;
pub mod file;
mod types;
mod validation;

pub use defaults::{ConfigPreset, DEFAULT_ML_MAX_WEIGHT, DEFAULT_ML_TIMEOUT_MS};
pub use types::{EngineConfig, EngineConfigBuilder, ExecutionConfig, MlConfig, ReportingConfig};
pub use validation::{ConfigError, Validatable};

pub use file::{
    discover_config_file, generate_example_config, load_config_file, load_or_default,
    ConfigFileError,
};

/// Generate a JSON Schema for the `EngineConfig` configuration format.
///
/// The schema documents every option that can be set in `.quote-scorer.yaml`.
#[must_use]
pub fn generate_json_schema() -> String {
    let schema = schemars::schema_for!(EngineConfig);
    serde_json::to_string_pretty(&schema).unwrap_or_default()
}
