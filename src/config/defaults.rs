//! Default values and named presets.

use super::types::{EngineConfig, ExecutionConfig, MlConfig, ReportingConfig};

/// Default wait for an ML prediction, in milliseconds.
pub const DEFAULT_ML_TIMEOUT_MS: u64 = 2_000;

/// Default ceiling of the ML weight.
pub const DEFAULT_ML_MAX_WEIGHT: f64 = 0.3;

// ============================================================================
// Configuration Presets
// ============================================================================

/// Named configuration presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigPreset {
    /// Parallel axes, ML blend when a provider is installed
    Default,
    /// Sequential axes and no ML: byte-for-byte reproducible output
    Deterministic,
    /// Parallel axes, no ML call
    Fast,
}

impl ConfigPreset {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Deterministic => "deterministic",
            Self::Fast => "fast",
        }
    }

    /// Parse a preset from a string name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "default" => Some(Self::Default),
            "deterministic" | "reproducible" => Some(Self::Deterministic),
            "fast" | "rules-only" => Some(Self::Fast),
            _ => None,
        }
    }

    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Default => "Parallel axes with the ML blend when a provider is installed",
            Self::Deterministic => "Sequential axes without ML, for audits and tests",
            Self::Fast => "Rule-based scoring only, no call to the ML provider",
        }
    }

    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Default, Self::Deterministic, Self::Fast]
    }
}

impl std::fmt::Display for ConfigPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// Preset Implementations
// ============================================================================

impl EngineConfig {
    /// Create an `EngineConfig` from a named preset.
    #[must_use]
    pub fn from_preset(preset: ConfigPreset) -> Self {
        match preset {
            ConfigPreset::Default => Self::default(),
            ConfigPreset::Deterministic => Self::deterministic_preset(),
            ConfigPreset::Fast => Self::fast_preset(),
        }
    }

    #[must_use]
    pub fn deterministic_preset() -> Self {
        Self {
            ml: MlConfig {
                enabled: false,
                ..MlConfig::default()
            },
            execution: ExecutionConfig {
                parallel_axes: false,
            },
            reporting: ReportingConfig::default(),
        }
    }

    #[must_use]
    pub fn fast_preset() -> Self {
        Self {
            ml: MlConfig {
                enabled: false,
                ..MlConfig::default()
            },
            ..Self::default()
        }
    }
}
