//! Score command handler.
//!
//! Implements the `score` subcommand: load the inputs, run the engine,
//! render the result and check the minimum score.

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::de::DeserializeOwned;

use super::{exit_codes, write_output, OutputTarget};
use crate::config::EngineConfig;
use crate::error::{ErrorContext, ScoringError};
use crate::model::{EnrichmentBundle, Quote, ScoringContext};
use crate::reports::{self, ReportFormat};
use crate::scoring::ScoringEngine;

/// Score command configuration
#[derive(Debug, Clone)]
pub struct ScoreConfig {
    pub quote_path: PathBuf,
    pub enrichment_path: Option<PathBuf>,
    pub context_path: PathBuf,
    pub output: ReportFormat,
    pub output_file: Option<PathBuf>,
    pub min_score: Option<f64>,
    pub no_color: bool,
    pub quiet: bool,
    pub engine: EngineConfig,
}

/// Load a JSON document from disk.
pub fn load_json<T: DeserializeOwned>(path: &Path, what: &str) -> crate::error::Result<T> {
    let content = std::fs::read_to_string(path).map_err(|e| ScoringError::io(path, e))?;
    serde_json::from_str(&content).with_context(|| format!("loading {what}"))
}

/// Run the score command, returning the desired exit code.
///
/// The caller is responsible for calling `std::process::exit()` with the
/// returned code when it is non-zero.
pub fn run_score(config: ScoreConfig) -> Result<i32> {
    let quote: Quote = load_json(&config.quote_path, "quote")?;
    let enrichment: EnrichmentBundle = match &config.enrichment_path {
        Some(path) => load_json(path, "enrichment")?,
        None => EnrichmentBundle::default(),
    };
    let context: ScoringContext = load_json(&config.context_path, "context")?;

    tracing::info!(
        "Scoring {} quote for a {} customer",
        context.project_type,
        context.profile
    );

    let engine = ScoringEngine::try_new(config.engine.clone())?;
    let score = engine.calculate_score(&quote, &enrichment, &context)?;

    let target = OutputTarget::from_option(config.output_file.clone());
    let colored = !config.no_color && target.is_terminal();
    let text = reports::render(
        &score,
        config.output,
        &config.engine.reporting,
        colored,
    )?;
    write_output(&text, &target, config.quiet)?;

    if let Some(threshold) = config.min_score {
        if score.total_score < threshold {
            tracing::warn!(
                "Score {:.0} is below the minimum of {:.0}",
                score.total_score,
                threshold
            );
            return Ok(exit_codes::BELOW_MIN_SCORE);
        }
    }
    Ok(exit_codes::SUCCESS)
}
