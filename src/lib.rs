//! **Multi-axis trust scoring for construction price quotes.**
//!
//! `quote-scorer` turns a quote, a bundle of third-party facts about the
//! contractor and its market, and a caller context into a score on a
//! 1350-point scale, a letter grade from A+ to E, a confidence level and a
//! prioritized list of alerts and recommendations.
//!
//! ## Core Concepts & Modules
//!
//! - **[`model`]**: the input contracts, [`Quote`], [`EnrichmentBundle`] and
//!   [`ScoringContext`]. All plain serde data.
//! - **[`scoring`]**: the [`ScoringEngine`], the nine axis strategies and
//!   the score types. Each axis is made of sub-criteria, each sub-criterion
//!   of control points with a fixed point budget.
//! - **[`config`]**: engine configuration, presets and YAML discovery.
//! - **[`reports`]**: JSON and text rendering of a [`FinalScore`].
//!
//! ## Getting Started
//!
//! ```no_run
//! use quote_scorer::{
//!     EngineConfig, EnrichmentBundle, Profile, Quote, ScoringContext, ScoringEngine,
//! };
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let quote: Quote = serde_json::from_str(&std::fs::read_to_string("quote.json")?)?;
//!     let context = ScoringContext::new(Profile::B2C, "renovation", quote.total_amount);
//!
//!     let engine = ScoringEngine::new(EngineConfig::default());
//!     let score = engine.calculate_score(&quote, &EnrichmentBundle::default(), &context)?;
//!
//!     println!(
//!         "Grade {} ({:.0}/1350), confidence {:.0}%",
//!         score.grade, score.total_score, score.confidence_level
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## ML Adjustment
//!
//! A machine-learned model can nudge the rule-based score. Implement
//! [`MlAdjustmentProvider`] and install it with
//! [`ScoringEngine::with_ml_provider`]; the prediction weighs at most 30 %
//! of the final score, and any provider failure falls back to the
//! rule-based score.

// Lint to discourage unwrap() in production code - prefer explicit error handling
#![warn(clippy::unwrap_used)]
#![allow(
    // Counts and point budgets are small: usize/u32 → f64 casts are exact in practice
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::similar_names
)]

pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod reports;
pub mod scoring;
pub mod utils;

// Re-export main types for convenience
pub use config::{ConfigError, ConfigPreset, EngineConfig, EngineConfigBuilder, Validatable};
pub use error::{ErrorContext, Result, ScoringError};
pub use model::{AmountBand, EnrichmentBundle, Profile, Quote, ScoringContext, StatedNeed};
pub use reports::ReportFormat;
pub use scoring::{
    Alert, AxisId, AxisScore, AxisStrategy, FinalScore, Grade, MlAdjustment,
    MlAdjustmentProvider, MlFeatures, MlPrediction, NoOpMlProvider, Priority, Recommendation,
    ScoringEngine, Severity, GLOBAL_MAX_POINTS,
};
