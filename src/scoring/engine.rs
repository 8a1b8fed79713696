//! The scoring orchestrator.
//!
//! Runs the nine axis strategies, re-weights them for the caller profile,
//! normalizes to the 1350-point scale, optionally blends an ML prediction
//! and assembles the [`FinalScore`].

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rayon::prelude::*;

use super::axes::{default_strategies, AxisStrategy, EvaluationInput};
use super::axis_config::{axis_config, SCORING_SCHEME_VERSION};
use super::confidence::{blend_with_ml, enrichment_confidence};
use super::ml::{self, MlAdjustmentProvider, MlFeatures, NoOpMlProvider};
use super::types::{
    AxisScore, AxisWeighting, FinalScore, Grade, MlAdjustment, Priority, Recommendation,
    RecommendationCategory, ScoreMetadata, GLOBAL_MAX_POINTS,
};
use crate::config::{EngineConfig, Validatable};
use crate::error::{Result, ScoringError};
use crate::model::{EnrichmentBundle, Profile, Quote, ScoringContext};
use crate::utils::fingerprint;

/// Axes under this percentage are candidates for an improvement recommendation.
const WEAK_AXIS_PERCENTAGE: f64 = 60.0;

/// How many weak axes get an orchestrator recommendation.
const WEAK_AXES_REPORTED: usize = 2;

/// Under this total, the customer should look for other offers.
const ALTERNATIVES_BELOW: f64 = 600.0;

/// Under this total, the offer needs additional checks.
const VERIFICATION_BELOW: f64 = 840.0;

/// Multi-axis weighted scoring engine.
///
/// The engine holds no per-request state: one instance can score any number
/// of quotes, concurrently, from several threads.
///
/// # Example
///
/// ```ignore
/// use quote_scorer::{EngineConfig, ScoringEngine};
///
/// let engine = ScoringEngine::new(EngineConfig::default());
/// let score = engine.calculate_score(&quote, &enrichment, &context)?;
/// println!("{} ({:.0}/1350)", score.grade, score.total_score);
/// ```
pub struct ScoringEngine {
    config: EngineConfig,
    strategies: Vec<Box<dyn AxisStrategy>>,
    ml_provider: Arc<dyn MlAdjustmentProvider>,
    ml_in_flight: ml::InFlight,
}

impl ScoringEngine {
    /// Create an engine with the nine standard axes and no ML provider.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            strategies: default_strategies(),
            ml_provider: Arc::new(NoOpMlProvider),
            ml_in_flight: ml::InFlight::default(),
        }
    }

    /// Create an engine after validating its configuration.
    pub fn try_new(config: EngineConfig) -> Result<Self> {
        let errors = config.validate();
        if !errors.is_empty() {
            let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
            return Err(ScoringError::config(messages.join("; ")));
        }
        Ok(Self::new(config))
    }

    /// Install an ML adjustment provider.
    #[must_use]
    pub fn with_ml_provider(mut self, provider: Arc<dyn MlAdjustmentProvider>) -> Self {
        self.ml_provider = provider;
        self.ml_in_flight = ml::InFlight::default();
        self
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Score a quote.
    ///
    /// Fails only on a malformed context or quote; missing enrichment and
    /// ML failures degrade the result instead.
    pub fn calculate_score(
        &self,
        quote: &Quote,
        enrichment: &EnrichmentBundle,
        context: &ScoringContext,
    ) -> Result<FinalScore> {
        context.validate()?;
        validate_quote(quote)?;

        let input = EvaluationInput::new(quote, enrichment, context);
        let mut axis_scores = self.evaluate_axes(&input);

        let (weighted_raw, weighted_max) = apply_weighting(&mut axis_scores, context.profile);
        let base_score = if weighted_max > 0.0 {
            weighted_raw / weighted_max * GLOBAL_MAX_POINTS
        } else {
            0.0
        };

        let ml_adjustment = self.ml_adjustment(quote, enrichment, context, base_score);
        let total_score = ml_adjustment
            .as_ref()
            .map_or(base_score, |ml| ml.adjusted_score);

        let mut confidence_level = enrichment_confidence(enrichment);
        if let Some(ml) = &ml_adjustment {
            confidence_level = blend_with_ml(confidence_level, ml.confidence);
        }

        let grade = Grade::from_score(total_score);
        let overall_alerts = axis_scores
            .iter()
            .flat_map(|axis| axis.alerts.iter())
            .filter(|alert| alert.severity.is_reportable())
            .cloned()
            .collect();
        let overall_recommendations =
            merge_recommendations(&axis_scores, weighted_max, total_score);

        let metadata = ScoreMetadata {
            profile: context.profile,
            project_type: context.project_type.clone(),
            project_amount: input.project_total(),
            project_amount_band: context.project_amount_band,
            region: context.region.clone(),
            trade_type: input.trade().map(str::to_string),
            scoring_version: SCORING_SCHEME_VERSION.to_string(),
            enrichment_sources: enrichment
                .present_sources()
                .into_iter()
                .map(str::to_string)
                .collect(),
            weighted_raw,
            weighted_max,
            base_score,
            input_fingerprint: fingerprint(&(quote, enrichment, context))?,
            evaluated_at: Utc::now(),
        };

        tracing::info!(
            total_score,
            grade = grade.letter(),
            confidence = confidence_level,
            ml = ml_adjustment.is_some(),
            "Quote scored"
        );

        Ok(FinalScore {
            total_score,
            grade,
            percentage: total_score / GLOBAL_MAX_POINTS * 100.0,
            axis_scores,
            overall_alerts,
            overall_recommendations,
            confidence_level,
            ml_adjustment,
            metadata,
        })
    }

    /// Run every strategy, in axis order.
    fn evaluate_axes(&self, input: &EvaluationInput<'_>) -> Vec<AxisScore> {
        let axes: Vec<AxisScore> = if self.config.execution.parallel_axes {
            self.strategies
                .par_iter()
                .map(|strategy| strategy.evaluate_input(input))
                .collect()
        } else {
            self.strategies
                .iter()
                .map(|strategy| strategy.evaluate_input(input))
                .collect()
        };

        for axis in &axes {
            tracing::debug!(
                axis = axis.axis_id.key(),
                score = axis.score,
                max = axis.max_points,
                alerts = axis.alerts.len(),
                "Axis evaluated"
            );
        }
        axes
    }

    /// Ask the provider for a prediction and blend it, or `None` on any failure.
    fn ml_adjustment(
        &self,
        quote: &Quote,
        enrichment: &EnrichmentBundle,
        context: &ScoringContext,
        base_score: f64,
    ) -> Option<MlAdjustment> {
        if !self.config.ml.enabled {
            return None;
        }
        if !self.ml_provider.is_available() {
            tracing::debug!("ML provider {} unavailable, using base score", self.ml_provider.name());
            return None;
        }

        let features = MlFeatures::extract(quote, enrichment, context);
        let timeout = Duration::from_millis(self.config.ml.timeout_ms);
        let prediction = match ml::predict_with_timeout(
            &self.ml_provider,
            &self.ml_in_flight,
            features,
            base_score,
            timeout,
        ) {
            Ok(prediction) => prediction,
            Err(e) => {
                tracing::warn!("ML adjustment skipped, using base score: {}", e);
                return None;
            }
        };

        let ml_weight = ml::ml_weight(prediction.confidence, self.config.ml.max_weight);
        let adjusted_score = ml::blend(base_score, prediction.predicted_score, ml_weight);
        tracing::debug!(
            predicted = prediction.predicted_score,
            confidence = prediction.confidence,
            ml_weight,
            "ML prediction blended"
        );

        Some(MlAdjustment {
            provider: self.ml_provider.name().to_string(),
            model_version: prediction.model_version,
            base_score,
            predicted_score: prediction.predicted_score,
            confidence: prediction.confidence,
            ml_weight,
            adjusted_score,
            adjustments: prediction.adjustments,
            feature_importance: prediction.feature_importance,
        })
    }
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl std::fmt::Debug for ScoringEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoringEngine")
            .field("config", &self.config)
            .field("axes", &self.strategies.len())
            .field("ml_provider", &self.ml_provider.name())
            .finish()
    }
}

fn validate_quote(quote: &Quote) -> Result<()> {
    if !quote.total_amount.is_finite() || quote.total_amount < 0.0 {
        return Err(ScoringError::invalid_value(
            "quote.totalAmount",
            format!("must be a non-negative amount, got {}", quote.total_amount),
        ));
    }
    Ok(())
}

/// Apply the profile weight to every axis score and budget.
///
/// Returns `(Σ adjusted scores, Σ adjusted budgets)`.
fn apply_weighting(axes: &mut [AxisScore], profile: Profile) -> (f64, f64) {
    let mut weighted_raw = 0.0;
    let mut weighted_max = 0.0;
    for axis in axes.iter_mut() {
        let config = axis_config(axis.axis_id);
        let weight = config.weight_for(profile);
        let weighting = AxisWeighting {
            weight,
            adjusted_score: axis.score * weight,
            adjusted_max: config.max_points * weight,
        };
        weighted_raw += weighting.adjusted_score;
        weighted_max += weighting.adjusted_max;
        axis.weighting = Some(weighting);
    }
    (weighted_raw, weighted_max)
}

/// Axis recommendations followed by the orchestrator's, sorted by priority.
fn merge_recommendations(
    axes: &[AxisScore],
    weighted_max: f64,
    total_score: f64,
) -> Vec<Recommendation> {
    let mut recommendations: Vec<Recommendation> = axes
        .iter()
        .flat_map(|axis| axis.recommendations.iter().cloned())
        .collect();
    recommendations.extend(weak_axis_recommendations(axes, weighted_max));
    recommendations.extend(global_recommendation(total_score));

    // Stable: ties keep insertion order.
    recommendations.sort_by(|a, b| b.priority.rank().cmp(&a.priority.rank()));
    recommendations
}

/// One high-priority recommendation for each of the weakest axes under 60 %.
fn weak_axis_recommendations(axes: &[AxisScore], weighted_max: f64) -> Vec<Recommendation> {
    let mut weakest: Vec<&AxisScore> = axes
        .iter()
        .filter(|axis| axis.percentage < WEAK_AXIS_PERCENTAGE)
        .collect();
    weakest.sort_by(|a, b| a.percentage.total_cmp(&b.percentage));

    weakest
        .into_iter()
        .take(WEAK_AXES_REPORTED)
        .map(|axis| {
            let weight = axis.weighting.as_ref().map_or(1.0, |w| w.weight);
            let upside = if weighted_max > 0.0 {
                (axis.max_points - axis.score) * weight / weighted_max * GLOBAL_MAX_POINTS
            } else {
                0.0
            };
            Recommendation {
                priority: Priority::High,
                category: axis.axis_id.into(),
                suggestion: format!(
                    "Improve {} ({:.0}%): up to {upside:.0} points can be gained",
                    axis.axis_id.name(),
                    axis.percentage
                ),
                potential_impact: upside,
                actionable: true,
            }
        })
        .collect()
}

fn global_recommendation(total_score: f64) -> Option<Recommendation> {
    let (priority, suggestion) = if total_score < ALTERNATIVES_BELOW {
        (
            Priority::High,
            "This quote carries significant risk: consider requesting alternative quotes",
        )
    } else if total_score < VERIFICATION_BELOW {
        (
            Priority::Medium,
            "Perform additional verification with the contractor before signing",
        )
    } else {
        return None;
    };
    Some(Recommendation {
        priority,
        category: RecommendationCategory::Global,
        suggestion: suggestion.to_string(),
        potential_impact: 0.0,
        actionable: true,
    })
}
