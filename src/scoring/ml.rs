//! Machine-learned score adjustment.
//!
//! The engine never depends on a concrete model. A provider implements
//! [`MlAdjustmentProvider`]; the engine extracts [`MlFeatures`], asks for a
//! prediction with a bounded wait and blends it into the base score with a
//! weight that grows with the provider's confidence but never exceeds 0.3.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::types::GLOBAL_MAX_POINTS;
use crate::error::{MlErrorKind, Result, ScoringError};
use crate::model::{EnrichmentBundle, Quote, ScoringContext};

/// Share of the prediction in the final score at full confidence.
pub const ML_CONFIDENCE_FACTOR: f64 = 0.3;

/// Hard ceiling of the ML weight, whatever the configuration says.
pub const MAX_ML_WEIGHT: f64 = 0.3;

/// Provider calls one engine lets run at once, abandoned ones included.
pub const MAX_IN_FLIGHT_PREDICTIONS: usize = 4;

/// Features handed to a provider, in a stable order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MlFeatures {
    pub numeric: IndexMap<String, f64>,
    pub categorical: IndexMap<String, String>,
}

impl MlFeatures {
    /// Extract features from a scoring request.
    ///
    /// Facts that are absent from the inputs are left out rather than
    /// filled with placeholder values.
    #[must_use]
    pub fn extract(quote: &Quote, enrichment: &EnrichmentBundle, context: &ScoringContext) -> Self {
        let mut features = Self::default();
        let items = &quote.extracted_data.line_items;

        features.number("total_amount", Some(quote.total_amount));
        features.number("line_item_count", Some(items.len() as f64));
        if !items.is_empty() {
            let priced = items.iter().filter(|i| i.unit_price.is_some()).count();
            features.number("priced_line_share", Some(priced as f64 / items.len() as f64));
        }

        let company = enrichment.company.as_ref();
        let reference = context
            .evaluation_date
            .or(quote.extracted_data.dates.issue_date);
        let created = company
            .and_then(|c| c.legal_status_details.as_ref())
            .and_then(|d| d.creation_date);
        if let (Some(created), Some(reference)) = (created, reference) {
            let days = (reference - created).num_days();
            features.number("company_age_years", Some(days.max(0) as f64 / 365.25));
        }

        let reputation = company.and_then(|c| c.reputation.as_ref());
        features.number("average_rating", reputation.and_then(|r| r.average_rating));
        features.number("review_count", reputation.map(|r| f64::from(r.review_count)));
        features.number(
            "complaint_count",
            reputation.map(|r| f64::from(r.complaint_count)),
        );
        features.number(
            "financial_score",
            company.and_then(|c| c.financial_score.as_ref()).map(|s| s.score),
        );
        features.number(
            "certification_count",
            Some(enrichment.all_certifications().count() as f64),
        );
        features.number(
            "employee_count",
            company
                .and_then(|c| c.human_resources.as_ref())
                .and_then(|h| h.employee_count)
                .map(f64::from),
        );
        features.number(
            "regional_price_index",
            enrichment.regional_data.as_ref().and_then(|r| r.price_index),
        );

        features.category("profile", Some(context.profile.name()));
        features.category("project_type", Some(context.project_type.as_str()));
        features.category(
            "trade_type",
            context
                .trade_type
                .as_deref()
                .or(quote.trade_type.as_deref()),
        );
        features.category("amount_band", Some(context.project_amount_band.name()));
        features.category("region", Some(context.region.as_str()));

        features
    }

    fn number(&mut self, name: &str, value: Option<f64>) {
        if let Some(value) = value.filter(|v| v.is_finite()) {
            self.numeric.insert(name.to_string(), value);
        }
    }

    fn category(&mut self, name: &str, value: Option<&str>) {
        if let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) {
            self.categorical.insert(name.to_string(), value.to_string());
        }
    }
}

/// What a provider returns for one request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MlPrediction {
    /// Predicted score on the 0-1350 scale
    pub predicted_score: f64,
    /// Provider confidence in 0-1
    pub confidence: f64,
    pub adjustments: IndexMap<String, f64>,
    pub feature_importance: IndexMap<String, f64>,
    pub model_version: Option<String>,
}

impl MlPrediction {
    /// Reject non-finite values and clamp confidence into 0-1.
    pub fn validated(mut self) -> Result<Self> {
        if !self.predicted_score.is_finite() {
            return Err(ScoringError::ml(
                "validating prediction",
                MlErrorKind::InvalidPrediction(format!(
                    "predicted score is {}",
                    self.predicted_score
                )),
            ));
        }
        if !self.confidence.is_finite() {
            return Err(ScoringError::ml(
                "validating prediction",
                MlErrorKind::InvalidPrediction(format!("confidence is {}", self.confidence)),
            ));
        }
        self.confidence = self.confidence.clamp(0.0, 1.0);
        Ok(self)
    }
}

/// Trait for ML adjustment providers.
///
/// Implementations wrap a model client. Retries, if any, belong to the
/// provider: the engine calls `predict` once per request.
///
/// `predict` runs on a worker thread and receives the time the engine will
/// wait for it. Once that elapses the engine falls back to the rule-based
/// score, but the worker keeps running until `predict` returns and counts
/// against [`MAX_IN_FLIGHT_PREDICTIONS`] meanwhile. Providers must therefore
/// bound their own I/O by `timeout` (request or socket timeouts) rather
/// than block indefinitely.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use quote_scorer::{ScoringEngine, EngineConfig};
///
/// let engine = ScoringEngine::new(EngineConfig::default())
///     .with_ml_provider(Arc::new(MyModelClient::connect(url)?));
/// ```
pub trait MlAdjustmentProvider: Send + Sync {
    /// Predict a score for the request described by `features`, giving up
    /// after `timeout`.
    fn predict(
        &self,
        features: &MlFeatures,
        base_score: f64,
        timeout: Duration,
    ) -> Result<MlPrediction>;

    /// Name recorded in the report (e.g. "gradient-boosting").
    fn name(&self) -> &'static str;

    /// Whether the provider can serve predictions right now.
    fn is_available(&self) -> bool;
}

/// A provider that never predicts.
///
/// Installed by default so the engine can hold a provider unconditionally.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpMlProvider;

impl MlAdjustmentProvider for NoOpMlProvider {
    fn predict(
        &self,
        _features: &MlFeatures,
        _base_score: f64,
        _timeout: Duration,
    ) -> Result<MlPrediction> {
        Err(ScoringError::ml(
            self.name(),
            MlErrorKind::Unavailable("no model configured".to_string()),
        ))
    }

    fn name(&self) -> &'static str {
        "NoOp"
    }

    fn is_available(&self) -> bool {
        false
    }
}

/// Weight of the prediction for a provider confidence.
///
/// `max_weight` comes from configuration and is itself capped at 0.3.
#[must_use]
pub fn ml_weight(confidence: f64, max_weight: f64) -> f64 {
    let cap = if max_weight.is_finite() {
        max_weight.clamp(0.0, MAX_ML_WEIGHT)
    } else {
        MAX_ML_WEIGHT
    };
    (confidence.clamp(0.0, 1.0) * ML_CONFIDENCE_FACTOR).min(cap)
}

/// Blend the base score with a prediction, clamped to the global scale.
#[must_use]
pub fn blend(base_score: f64, predicted_score: f64, weight: f64) -> f64 {
    (base_score * (1.0 - weight) + predicted_score * weight).clamp(0.0, GLOBAL_MAX_POINTS)
}

/// Number of prediction workers still running, shared by one engine.
#[derive(Debug, Clone, Default)]
pub struct InFlight(Arc<AtomicUsize>);

impl InFlight {
    /// Take a worker slot, or `None` when `limit` workers are running.
    fn acquire(&self, limit: usize) -> Option<InFlightSlot> {
        self.0
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < limit).then_some(n + 1)
            })
            .ok()
            .map(|_| InFlightSlot(Arc::clone(&self.0)))
    }

    /// Workers currently running, including abandoned ones.
    #[must_use]
    pub fn current(&self) -> usize {
        self.0.load(Ordering::Acquire)
    }
}

/// Released when the worker holding it finishes.
struct InFlightSlot(Arc<AtomicUsize>);

impl Drop for InFlightSlot {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Ask the provider for a prediction, waiting at most `timeout`.
///
/// The provider runs on its own thread, which holds an `in_flight` slot
/// until `predict` returns. A late answer is dropped. When every slot is
/// taken by workers that outlived their timeout, the provider is not called.
pub fn predict_with_timeout(
    provider: &Arc<dyn MlAdjustmentProvider>,
    in_flight: &InFlight,
    features: MlFeatures,
    base_score: f64,
    timeout: Duration,
) -> Result<MlPrediction> {
    let name = provider.name();
    if !provider.is_available() {
        return Err(ScoringError::ml(
            name,
            MlErrorKind::Unavailable("provider reports unavailable".to_string()),
        ));
    }
    let Some(slot) = in_flight.acquire(MAX_IN_FLIGHT_PREDICTIONS) else {
        return Err(ScoringError::ml(
            name,
            MlErrorKind::Unavailable(format!(
                "{MAX_IN_FLIGHT_PREDICTIONS} earlier predictions still running"
            )),
        ));
    };

    let (tx, rx) = mpsc::channel();
    let worker = Arc::clone(provider);
    thread::Builder::new()
        .name("ml-predict".to_string())
        .spawn(move || {
            let _slot = slot;
            // Receiver is gone after a timeout.
            let _ = tx.send(worker.predict(&features, base_score, timeout));
        })
        .map_err(|e| ScoringError::ml(name, MlErrorKind::Unavailable(e.to_string())))?;

    match rx.recv_timeout(timeout) {
        Ok(result) => result?.validated(),
        Err(RecvTimeoutError::Timeout) => Err(ScoringError::ml(
            name,
            MlErrorKind::Timeout(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX)),
        )),
        Err(RecvTimeoutError::Disconnected) => Err(ScoringError::ml(
            name,
            MlErrorKind::PredictionFailed("worker exited without a result".to_string()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CompanyData, Profile, Reputation};

    #[test]
    fn test_noop_provider() {
        let provider = NoOpMlProvider;
        assert_eq!(provider.name(), "NoOp");
        assert!(!provider.is_available());
        assert!(provider
            .predict(&MlFeatures::default(), 900.0, Duration::from_millis(10))
            .is_err());
    }

    #[test]
    fn test_in_flight_slots_are_bounded() {
        let in_flight = InFlight::default();
        let first = in_flight.acquire(2).expect("free slot");
        let second = in_flight.acquire(2).expect("free slot");
        assert!(in_flight.acquire(2).is_none());
        assert_eq!(in_flight.current(), 2);

        drop(first);
        assert_eq!(in_flight.current(), 1);
        assert!(in_flight.acquire(2).is_some());
        drop(second);
        assert_eq!(in_flight.current(), 0);
    }

    #[test]
    fn test_weight_is_capped() {
        assert!(ml_weight(0.0, 0.3).abs() < f64::EPSILON);
        assert!((ml_weight(1.0, 0.3) - 0.3).abs() < 1e-12);
        assert!((ml_weight(1.0, 0.9) - 0.3).abs() < 1e-12);
        assert!((ml_weight(2.5, 0.3) - 0.3).abs() < 1e-12);
        assert!((ml_weight(1.0, 0.1) - 0.1).abs() < 1e-12);
        assert!((ml_weight(0.5, 0.3) - 0.15).abs() < 1e-12);
    }

    #[test]
    fn test_blend_bounds() {
        assert!((blend(900.0, 1350.0, 0.0) - 900.0).abs() < 1e-9);
        assert!((blend(1000.0, 2000.0, 0.3) - 1300.0).abs() < 1e-9);
        assert!((blend(1300.0, 5000.0, 0.3) - 1350.0).abs() < 1e-9);
        assert!(blend(100.0, -5000.0, 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_validation_clamps_confidence() {
        let prediction = MlPrediction {
            predicted_score: 1000.0,
            confidence: 1.7,
            ..Default::default()
        };
        let validated = prediction.validated().expect("finite prediction");
        assert!((validated.confidence - 1.0).abs() < f64::EPSILON);

        let nan = MlPrediction {
            predicted_score: f64::NAN,
            confidence: 0.5,
            ..Default::default()
        };
        assert!(nan.validated().is_err());
    }

    #[test]
    fn test_feature_extraction_order_and_absence() {
        let quote = Quote {
            total_amount: 12_000.0,
            ..Default::default()
        };
        let enrichment = EnrichmentBundle {
            company: Some(CompanyData {
                reputation: Some(Reputation {
                    average_rating: Some(4.2),
                    review_count: 31,
                    complaint_count: 1,
                }),
                ..Default::default()
            }),
            ..Default::default()
        };
        let context = ScoringContext::new(Profile::B2C, "renovation", 12_000.0);
        let features = MlFeatures::extract(&quote, &enrichment, &context);

        let numeric: Vec<&str> = features.numeric.keys().map(String::as_str).collect();
        assert_eq!(
            numeric,
            vec![
                "total_amount",
                "line_item_count",
                "average_rating",
                "review_count",
                "complaint_count",
                "certification_count",
            ]
        );
        assert_eq!(features.categorical.get("amount_band").map(String::as_str), Some("medium"));
        assert!(!features.categorical.contains_key("region"));
    }
}
