//! Multi-axis weighted scoring.
//!
//! A quote is evaluated on nine axes, each made of sub-criteria and control
//! points with fixed point budgets. The [`ScoringEngine`] re-weights the axes
//! for the caller profile, normalizes the result to 1350 points, optionally
//! blends a machine-learned prediction and maps the total to a letter grade.

pub mod axes;
mod axis_config;
mod confidence;
mod engine;
pub mod ml;
pub mod rules;
pub mod text;
mod types;

pub use axes::{default_strategies, AxisStrategy, EvaluationInput};
pub use axis_config::{axis_config, AxisConfig, AXIS_CONFIGS, SCORING_SCHEME_VERSION};
pub use confidence::{blend_with_ml, enrichment_confidence, BASE_CONFIDENCE};
pub use engine::ScoringEngine;
pub use ml::{MlAdjustmentProvider, MlFeatures, MlPrediction, NoOpMlProvider};
pub use types::*;
