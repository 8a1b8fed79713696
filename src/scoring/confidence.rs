//! Global confidence level of a score.
//!
//! Confidence reflects how much third-party evidence backed the evaluation,
//! not how good the quote is.

use crate::model::EnrichmentBundle;

/// Confidence with no enrichment at all.
pub const BASE_CONFIDENCE: f64 = 70.0;

const MAX_CONFIDENCE: f64 = 100.0;

/// Share of the rule-based confidence kept when ML was used.
const RULE_SHARE: f64 = 0.7;

/// Bonus for each kind of enrichment fact, in the order it is checked.
const BONUSES: &[(&str, f64, fn(&EnrichmentBundle) -> bool)] = &[
    ("financial data", 10.0, EnrichmentBundle::has_financial_data),
    ("reputation", 5.0, EnrichmentBundle::has_reputation),
    ("legal status details", 5.0, EnrichmentBundle::has_legal_status_details),
    ("price references", 5.0, has_price_references),
    ("regional data", 3.0, has_regional_data),
    ("compliance data", 2.0, has_compliance_data),
];

fn has_price_references(enrichment: &EnrichmentBundle) -> bool {
    !enrichment.price_references.is_empty()
}

fn has_regional_data(enrichment: &EnrichmentBundle) -> bool {
    enrichment.regional_data.is_some()
}

fn has_compliance_data(enrichment: &EnrichmentBundle) -> bool {
    enrichment.compliance_data.is_some()
}

/// Rule-based confidence from the enrichment facts present, capped at 100.
#[must_use]
pub fn enrichment_confidence(enrichment: &EnrichmentBundle) -> f64 {
    let mut confidence = BASE_CONFIDENCE;
    for (source, bonus, present) in BONUSES {
        if present(enrichment) {
            tracing::debug!(source = *source, bonus = *bonus, "Confidence bonus");
            confidence += bonus;
        }
    }
    confidence.min(MAX_CONFIDENCE)
}

/// Blend rule-based confidence with the ML provider's own (0-1).
#[must_use]
pub fn blend_with_ml(confidence: f64, ml_confidence: f64) -> f64 {
    let blended =
        confidence * RULE_SHARE + ml_confidence.clamp(0.0, 1.0) * MAX_CONFIDENCE * (1.0 - RULE_SHARE);
    blended.clamp(0.0, MAX_CONFIDENCE)
}
