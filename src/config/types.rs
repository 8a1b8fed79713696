//! Configuration types for the scoring engine.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::defaults::{DEFAULT_ML_MAX_WEIGHT, DEFAULT_ML_TIMEOUT_MS};

// ============================================================================
// Engine Configuration
// ============================================================================

/// Top-level engine configuration, loadable from a YAML file.
///
/// Every section has defaults, so an empty file is a valid configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct EngineConfig {
    /// Machine-learned adjustment settings
    pub ml: MlConfig,
    /// How the axes are executed
    pub execution: ExecutionConfig,
    /// Rendering of text summaries
    pub reporting: ReportingConfig,
}

impl EngineConfig {
    /// Create a new `EngineConfig` with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an `EngineConfig` builder.
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }
}

// ============================================================================
// Builder for EngineConfig
// ============================================================================

/// Builder for constructing `EngineConfig` with a fluent API.
#[derive(Debug, Default)]
#[must_use]
pub struct EngineConfigBuilder {
    config: EngineConfig,
}

impl EngineConfigBuilder {
    pub const fn ml_enabled(mut self, enabled: bool) -> Self {
        self.config.ml.enabled = enabled;
        self
    }

    pub const fn ml_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.config.ml.timeout_ms = timeout_ms;
        self
    }

    pub const fn ml_max_weight(mut self, max_weight: f64) -> Self {
        self.config.ml.max_weight = max_weight;
        self
    }

    pub const fn parallel_axes(mut self, parallel: bool) -> Self {
        self.config.execution.parallel_axes = parallel;
        self
    }

    pub const fn max_recommendations(mut self, max: Option<usize>) -> Self {
        self.config.reporting.max_recommendations = max;
        self
    }

    #[must_use]
    pub fn build(self) -> EngineConfig {
        self.config
    }
}

// ============================================================================
// Sections
// ============================================================================

/// Machine-learned adjustment settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct MlConfig {
    /// Call the ML provider when one is installed
    pub enabled: bool,
    /// Longest wait for a prediction, in milliseconds
    pub timeout_ms: u64,
    /// Ceiling of the prediction's share in the final score (0.0-0.3)
    pub max_weight: f64,
}

impl Default for MlConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_ms: DEFAULT_ML_TIMEOUT_MS,
            max_weight: DEFAULT_ML_MAX_WEIGHT,
        }
    }
}

/// How the nine axes are executed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Evaluate axes on the rayon thread pool
    pub parallel_axes: bool,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            parallel_axes: true,
        }
    }
}

/// Rendering of text summaries. Never alters the engine output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ReportingConfig {
    /// Number of recommendations listed (all when unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_recommendations: Option<usize>,
    /// List minor alerts from the axes in the summary
    pub include_minor_alerts_in_summary: bool,
}
