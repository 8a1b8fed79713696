//! Innovation axis: energy performance and sustainable practices.

use super::{AxisReport, AxisStrategy, EvaluationInput};
use crate::scoring::rules::{
    count_share, ControlPointBuilder, ECO_MATERIAL_KEYWORDS, ENERGY_EFFICIENCY_KEYWORDS,
    FINANCIAL_AID_KEYWORDS, WASTE_MANAGEMENT_KEYWORDS,
};
use crate::scoring::text::{contains_term, normalize_text};
use crate::scoring::types::{AxisId, AxisScore, ControlPointScore};

const ENERGY_SHARES: &[f64] = &[0.0, 0.45, 0.7, 1.0];
const PRACTICE_SHARES: &[f64] = &[0.0, 0.6, 1.0];

/// Energy and environmental added value of the quote.
#[derive(Debug, Clone, Copy, Default)]
pub struct InnovationAxis;

impl AxisStrategy for InnovationAxis {
    fn axis_id(&self) -> AxisId {
        AxisId::Innovation
    }

    fn evaluate_input(&self, input: &EvaluationInput<'_>) -> AxisScore {
        let mut report = AxisReport::new(AxisId::Innovation);

        report.criterion(
            "energy_performance",
            "Ask about energy-efficient alternatives and the public aid they unlock",
            vec![efficient_solutions(input), financial_aid_eligibility(input)],
        );
        report.criterion(
            "sustainable_practices",
            "Ask about low-impact materials and how site waste is handled",
            vec![
                practice(input, "eco_materials", ECO_MATERIAL_KEYWORDS),
                practice(input, "waste_management", WASTE_MANAGEMENT_KEYWORDS),
            ],
        );

        report.finish()
    }
}

fn efficient_solutions(input: &EvaluationInput<'_>) -> ControlPointScore {
    let mut cp = ControlPointBuilder::new("efficient_solutions", 18.0);
    let matched = input.text.matched(ENERGY_EFFICIENCY_KEYWORDS);
    if matched.is_empty() {
        cp.absent("energy-efficient solution");
    } else {
        cp.award(
            count_share(matched.len(), ENERGY_SHARES),
            format!("energy solutions: {}", matched.join(", ")),
        );
    }
    cp.confidence(70);
    cp.build()
}

fn financial_aid_eligibility(input: &EvaluationInput<'_>) -> ControlPointScore {
    let mut cp = ControlPointBuilder::new("financial_aid_eligibility", 12.0);
    match input.text.first_match(FINANCIAL_AID_KEYWORDS) {
        Some(keyword) => {
            cp.award(0.65, format!("aid scheme (\"{keyword}\")"));
        }
        None => {
            cp.absent("aid scheme");
        }
    }
    let rge = input.enrichment.all_certifications().any(|c| {
        c.validity_at(input.reference_date) != Some(false)
            && contains_term(&normalize_text(&c.name), "rge")
    });
    if rge {
        cp.award(0.35, "RGE certification");
    } else {
        cp.absent("RGE certification");
    }
    cp.confidence(70);
    cp.build()
}

fn practice(input: &EvaluationInput<'_>, id: &'static str, keywords: &[&str]) -> ControlPointScore {
    let mut cp = ControlPointBuilder::new(id, 10.0);
    let matched = input.text.matched(keywords);
    if matched.is_empty() {
        cp.absent(id.replace('_', " "));
    } else {
        cp.award(
            count_share(matched.len(), PRACTICE_SHARES),
            matched.join(", "),
        );
    }
    cp.confidence(70);
    cp.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Certification, EnrichmentBundle, Profile, Quote, ScoringContext};

    #[test]
    fn test_budget_is_50() {
        let context = ScoringContext::new(Profile::B2C, "renovation", 12_000.0);
        let axis =
            InnovationAxis.evaluate(&Quote::default(), &EnrichmentBundle::default(), &context);
        let declared: f64 = axis.sub_criteria.iter().map(|s| s.max_points).sum();
        assert!((declared - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_aid_eligibility_with_rge() {
        let context = ScoringContext::new(Profile::B2C, "renovation", 12_000.0);
        let mut quote = Quote::default();
        quote.extracted_data.free_text = Some("Éligible MaPrimeRénov'".to_string());
        let enrichment = EnrichmentBundle {
            certifications: vec![Certification {
                name: "RGE QualiPAC".to_string(),
                is_valid: Some(true),
                ..Default::default()
            }],
            ..Default::default()
        };
        let axis = InnovationAxis.evaluate(&quote, &enrichment, &context);
        let cp = axis
            .control_point("financial_aid_eligibility")
            .expect("control point");
        assert!((cp.score - 12.0).abs() < 1e-9);
    }
}
