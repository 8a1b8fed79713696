//! Guarantees axis: legal guarantees and commercial after-sales commitments.

use super::{AxisReport, AxisStrategy, EvaluationInput};
use crate::scoring::rules::{
    count_share, matched_signals, ControlPointBuilder, AFTER_SALES_GROUPS, BIENNIAL_KEYWORDS,
    COMMERCIAL_WARRANTY_KEYWORDS, DECENNIAL_KEYWORDS, PERFECT_COMPLETION_KEYWORDS,
};
use crate::scoring::types::{AxisId, AxisScore, ControlPointScore};

/// Commercial warranty length rewarded in full, in years.
const LONG_WARRANTY_YEARS: u32 = 5;

/// Guarantees offered to the customer after completion.
#[derive(Debug, Clone, Copy, Default)]
pub struct GuaranteesAxis;

impl AxisStrategy for GuaranteesAxis {
    fn axis_id(&self) -> AxisId {
        AxisId::Guarantees
    }

    fn evaluate_input(&self, input: &EvaluationInput<'_>) -> AxisScore {
        let mut report = AxisReport::new(AxisId::Guarantees);

        report.criterion(
            "legal_guarantees",
            "Ask the contractor to state the legal guarantees (completion, biennial, decennial)",
            vec![
                legal_guarantee(input, "perfect_completion", PERFECT_COMPLETION_KEYWORDS),
                legal_guarantee(input, "biennial_guarantee", BIENNIAL_KEYWORDS),
                decennial_coverage(input),
            ],
        );
        report.criterion(
            "commercial_guarantees",
            "Ask for a written commercial warranty and after-sales terms",
            vec![extended_warranty(input), after_sales_service(input)],
        );

        report.finish()
    }
}

/// A legal guarantee evidenced by wording, with partial credit for a bare flag.
fn legal_guarantee(
    input: &EvaluationInput<'_>,
    id: &'static str,
    keywords: &[&str],
) -> ControlPointScore {
    let mut cp = ControlPointBuilder::new(id, 15.0);
    if let Some(keyword) = input.text.first_match(keywords) {
        cp.award(1.0, format!("\"{keyword}\""));
    } else if input.quote.extracted_data.legal_mentions.has_guarantee {
        cp.award(0.35, "generic guarantee flag")
            .absent(id.replace('_', " "))
            .confidence(60);
    } else {
        cp.absent(id.replace('_', " "));
    }
    cp.build()
}

fn decennial_coverage(input: &EvaluationInput<'_>) -> ControlPointScore {
    let mut cp = ControlPointBuilder::new("decennial_coverage", 15.0);
    if input.quote.extracted_data.legal_mentions.has_decennial_insurance {
        cp.award(1.0, "decennial insurance flag");
    } else if let Some(keyword) = input.text.first_match(DECENNIAL_KEYWORDS) {
        cp.award(1.0, format!("\"{keyword}\""));
    } else {
        cp.absent("decennial coverage");
    }
    cp.build()
}

fn extended_warranty(input: &EvaluationInput<'_>) -> ControlPointScore {
    let mut cp = ControlPointBuilder::new("extended_warranty", 20.0);
    match input.text.first_match(COMMERCIAL_WARRANTY_KEYWORDS) {
        Some(keyword) => {
            cp.award(0.6, format!("commercial warranty (\"{keyword}\")"));
        }
        None => {
            cp.absent("commercial warranty");
        }
    }
    match input.text.commercial_warranty_years() {
        Some(years) if years >= LONG_WARRANTY_YEARS => {
            cp.award(0.4, format!("{years}-year warranty"));
        }
        Some(years) => {
            cp.award(0.2, format!("{years}-year warranty"));
        }
        None => {
            cp.absent("warranty duration");
        }
    }
    cp.confidence(75);
    cp.build()
}

fn after_sales_service(input: &EvaluationInput<'_>) -> ControlPointScore {
    let mut cp = ControlPointBuilder::new("after_sales_service", 15.0);
    let matched = matched_signals(&input.text, AFTER_SALES_GROUPS);
    if matched.is_empty() {
        cp.absent("after-sales service");
    } else {
        cp.award(
            count_share(matched.len(), &[0.0, 0.6, 1.0]),
            format!("after-sales: {}", matched.join(", ")),
        );
    }
    cp.confidence(75);
    cp.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EnrichmentBundle, Profile, Quote, ScoringContext};
    use crate::scoring::types::Severity;

    fn context() -> ScoringContext {
        ScoringContext::new(Profile::B2C, "renovation", 12_000.0)
    }

    #[test]
    fn test_empty_quote_raises_major_threshold_alert() {
        let axis = GuaranteesAxis.evaluate(&Quote::default(), &EnrichmentBundle::default(), &context());
        let declared: f64 = axis.sub_criteria.iter().map(|s| s.max_points).sum();
        assert!((declared - 80.0).abs() < f64::EPSILON);
        assert!(axis.score.abs() < f64::EPSILON);
        assert_eq!(axis.alerts.len(), 1);
        assert_eq!(axis.alerts[0].severity, Severity::Major);
    }

    #[test]
    fn test_full_guarantees() {
        let mut quote = Quote::default();
        quote.extracted_data.legal_mentions.text = vec![
            "Garantie de parfait achèvement, garantie biennale de bon fonctionnement, \
             garantie décennale"
                .to_string(),
            "Garantie constructeur 5 ans sur la pompe à chaleur. Contrat d'entretien et SAV inclus"
                .to_string(),
        ];
        let axis = GuaranteesAxis.evaluate(&quote, &EnrichmentBundle::default(), &context());
        assert!((axis.score - 80.0).abs() < 1e-9, "score {}", axis.score);
        assert!(axis.alerts.is_empty());
    }

    fn after_sales_points(free_text: &str) -> f64 {
        let mut quote = Quote::default();
        quote.extracted_data.free_text = Some(free_text.to_string());
        let axis = GuaranteesAxis.evaluate(&quote, &EnrichmentBundle::default(), &context());
        axis.control_point("after_sales_service")
            .expect("control point")
            .score
    }

    #[test]
    fn test_single_after_sales_commitment_earns_partial_credit() {
        assert!((after_sales_points("Contrat d'entretien proposé") - 9.0).abs() < 1e-9);
        assert!((after_sales_points("Service après-vente assuré") - 9.0).abs() < 1e-9);
        assert!((after_sales_points("SAV et contrat d'entretien") - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_savoir_faire_is_not_after_sales() {
        assert!(after_sales_points("Notre savoir-faire artisanal").abs() < f64::EPSILON);
    }
}
