//! Report rendering for scoring results.
//!
//! - JSON: the full [`FinalScore`], for programmatic consumers
//! - Summary: compact text for the shell
//!
//! Rendering never alters the score itself: the reporting options only
//! decide what a summary lists.

mod summary;

pub use summary::SummaryReporter;

use clap::ValueEnum;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::config::ReportingConfig;
use crate::error::Result;
use crate::scoring::FinalScore;

/// Output format for reports
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Structured JSON output
    #[default]
    Json,
    /// Brief summary output
    Summary,
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Summary => write!(f, "summary"),
        }
    }
}

/// Pretty-printed JSON of a score.
pub fn to_json(score: &FinalScore) -> Result<String> {
    Ok(serde_json::to_string_pretty(score)?)
}

/// Uncolored text summary of a score.
#[must_use]
pub fn summary(score: &FinalScore, config: &ReportingConfig) -> String {
    SummaryReporter::new().no_color().render(score, config)
}

/// Render a score in the requested format.
pub fn render(
    score: &FinalScore,
    format: ReportFormat,
    config: &ReportingConfig,
    colored: bool,
) -> Result<String> {
    match format {
        ReportFormat::Json => to_json(score),
        ReportFormat::Summary => {
            let reporter = if colored {
                SummaryReporter::new()
            } else {
                SummaryReporter::new().no_color()
            };
            Ok(reporter.render(score, config))
        }
    }
}
