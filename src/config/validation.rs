//! Configuration validation.

use super::types::{EngineConfig, ExecutionConfig, MlConfig, ReportingConfig};
use crate::scoring::ml::MAX_ML_WEIGHT;

// ============================================================================
// Configuration Error
// ============================================================================

/// Error type for configuration validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    /// The field that failed validation
    pub field: String,
    /// Description of the validation error
    pub message: String,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Validation Trait
// ============================================================================

/// Trait for validatable configuration types.
pub trait Validatable {
    /// Validate the configuration, returning any errors found.
    fn validate(&self) -> Vec<ConfigError>;

    /// Check if the configuration is valid.
    fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

// ============================================================================
// Validation Implementations
// ============================================================================

impl Validatable for EngineConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        errors.extend(self.ml.validate());
        errors.extend(self.execution.validate());
        errors.extend(self.reporting.validate());
        errors
    }
}

impl Validatable for MlConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if self.timeout_ms == 0 {
            errors.push(ConfigError {
                field: "ml.timeout_ms".to_string(),
                message: "Timeout must be greater than 0".to_string(),
            });
        }
        if !(0.0..=MAX_ML_WEIGHT).contains(&self.max_weight) {
            errors.push(ConfigError {
                field: "ml.max_weight".to_string(),
                message: format!(
                    "Max weight must be between 0.0 and {MAX_ML_WEIGHT}, got {}",
                    self.max_weight
                ),
            });
        }
        errors
    }
}

impl Validatable for ExecutionConfig {
    fn validate(&self) -> Vec<ConfigError> {
        Vec::new()
    }
}

impl Validatable for ReportingConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if self.max_recommendations == Some(0) {
            errors.push(ConfigError {
                field: "reporting.max_recommendations".to_string(),
                message: "Must list at least one recommendation; leave unset to list all"
                    .to_string(),
            });
        }
        errors
    }
}
