//! Price axis: market position, price structure, arithmetic consistency.

use super::{AxisReport, AxisStrategy, EvaluationInput};
use crate::model::{LineItem, PriceReference};
use crate::scoring::rules::{
    ControlPointBuilder, KeywordRule, LABOR_KEYWORDS, LEGAL_VAT_RATES, LUMP_SUM_KEYWORDS,
    LUMP_SUM_UNITS, MATERIAL_KEYWORDS,
};
use crate::scoring::text::{contains_term, normalize_text, token_coverage};
use crate::scoring::types::{Alert, AxisId, AxisScore, ControlPointScore, Severity};

const MARKET: &str = "market_position";
const ARITHMETIC: &str = "arithmetic_consistency";

/// Minimum token coverage for a line item to be priced against a reference.
const REFERENCE_MATCH: f64 = 0.5;

/// A unit price this far above the reference high band is flagged.
const OVERPRICE_FACTOR: f64 = 1.5;

const STRUCTURE_RULES: &[KeywordRule] = &[
    KeywordRule {
        signal: "labor itemized",
        keywords: LABOR_KEYWORDS,
        share: 0.5,
    },
    KeywordRule {
        signal: "materials itemized",
        keywords: MATERIAL_KEYWORDS,
        share: 0.5,
    },
];

/// Fairness and consistency of the quoted price.
#[derive(Debug, Clone, Copy, Default)]
pub struct PriceAxis;

impl AxisStrategy for PriceAxis {
    fn axis_id(&self) -> AxisId {
        AxisId::Price
    }

    fn evaluate_input(&self, input: &EvaluationInput<'_>) -> AxisScore {
        let mut report = AxisReport::new(AxisId::Price);

        let market = vec![
            line_item_benchmark(input, &mut report),
            total_vs_regional(input, &mut report),
        ];
        report.criterion(
            MARKET,
            "Compare this quote with at least two other quotes for the same works",
            market,
        );

        report.criterion(
            "price_structure",
            "Ask for unit prices and quantities instead of lump sums",
            vec![
                unit_prices_detailed(input),
                labor_material_split(input),
                lump_sum_usage(input),
            ],
        );

        let arithmetic = vec![line_totals(input, &mut report), vat_totals(input, &mut report)];
        report.criterion(
            ARITHMETIC,
            "Ask the contractor to correct the totals of the quote",
            arithmetic,
        );

        report.finish()
    }
}

/// Regional price level applied to references that are not regional already.
fn price_index(input: &EvaluationInput<'_>) -> f64 {
    input
        .enrichment
        .regional_data
        .as_ref()
        .and_then(|r| r.price_index)
        .filter(|index| index.is_finite() && *index > 0.0)
        .unwrap_or(1.0)
}

/// Best matching reference for a line, first one wins on ties.
fn best_reference<'a>(
    references: &'a [PriceReference],
    item: &LineItem,
) -> Option<&'a PriceReference> {
    let mut best: Option<(&'a PriceReference, f64)> = None;
    for reference in references {
        let coverage = token_coverage(&reference.label, &item.description);
        if coverage >= REFERENCE_MATCH && best.map_or(true, |(_, c)| coverage > c) {
            best = Some((reference, coverage));
        }
    }
    best.map(|(reference, _)| reference)
}

fn line_item_benchmark(input: &EvaluationInput<'_>, report: &mut AxisReport) -> ControlPointScore {
    let mut cp = ControlPointBuilder::new("line_item_benchmark", 70.0);
    let references = &input.enrichment.price_references;
    if references.is_empty() {
        cp.credit(0.5).absent("price references").confidence(30);
        return cp.build();
    }

    let context_region = normalize_text(&input.context.region);
    let index = price_index(input);
    let priced: Vec<(&LineItem, f64)> = input
        .quote
        .extracted_data
        .line_items
        .iter()
        .filter_map(|item| item.unit_price.filter(|p| *p > 0.0).map(|p| (item, p)))
        .collect();

    let mut shares = Vec::new();
    let mut overpriced = Vec::new();
    for (item, unit_price) in &priced {
        let Some(reference) = best_reference(references, item) else {
            continue;
        };
        let regional = reference
            .region
            .as_deref()
            .is_some_and(|r| !context_region.is_empty() && normalize_text(r) == context_region);
        let scale = if regional { 1.0 } else { index };

        let share = if *unit_price >= reference.band_low() * scale
            && *unit_price <= reference.band_high() * scale
        {
            1.0
        } else if *unit_price >= reference.floor() * scale
            && *unit_price <= reference.ceiling() * scale
        {
            0.6
        } else if *unit_price < reference.floor() * scale {
            0.3
        } else {
            0.1
        };
        if *unit_price > reference.band_high() * scale * OVERPRICE_FACTOR {
            overpriced.push(item.description.clone());
        }
        shares.push(share);
    }

    if shares.is_empty() {
        cp.credit(0.5)
            .absent("line item matching a price reference")
            .confidence(40);
        return cp.build();
    }

    let mean = shares.iter().sum::<f64>() / shares.len() as f64;
    cp.award(
        mean,
        format!("{}/{} priced lines benchmarked", shares.len(), priced.len()),
    );
    if (index - 1.0).abs() > f64::EPSILON {
        cp.note(format!("regional price index {index:.2}"));
    }
    let coverage = shares.len() as f64 / priced.len().max(1) as f64;
    cp.confidence(50 + (coverage * 40.0).round() as u8);

    if !overpriced.is_empty() {
        report.alert(
            Alert::new(
                Severity::Major,
                AxisId::Price,
                format!(
                    "{} line(s) priced more than 50% above the market range: {}",
                    overpriced.len(),
                    overpriced.join(", ")
                ),
                "The customer may overpay for part of the works",
            )
            .at(MARKET, "line_item_benchmark")
            .recommending("Negotiate the flagged lines or request competing quotes"),
        );
    }
    cp.build()
}

fn total_vs_regional(input: &EvaluationInput<'_>, report: &mut AxisReport) -> ControlPointScore {
    let mut cp = ControlPointBuilder::new("total_vs_regional", 50.0);
    let average = input
        .enrichment
        .regional_data
        .as_ref()
        .and_then(|r| r.average_project_cost)
        .filter(|avg| *avg > 0.0);
    let total = input.project_total();

    let Some(average) = average else {
        cp.credit(0.5).absent("regional average project cost").confidence(30);
        return cp.build();
    };
    if total <= 0.0 {
        cp.absent("quote total").confidence(40);
        return cp.build();
    }

    let ratio = total / average;
    let share = if (0.7..=1.3).contains(&ratio) {
        1.0
    } else if (0.5..0.7).contains(&ratio) || (1.3..=1.6).contains(&ratio) {
        0.6
    } else if ratio > 1.6 {
        0.3
    } else {
        0.2
    };
    cp.award(share, format!("total at {:.0}% of regional average", ratio * 100.0))
        .confidence(80);

    if ratio < 0.5 {
        report.alert(
            Alert::new(
                Severity::Major,
                AxisId::Price,
                format!(
                    "Abnormally low price: {:.0}% of the regional average for comparable projects",
                    ratio * 100.0
                ),
                "An abnormally low price often hides omitted works or later supplements",
            )
            .at(MARKET, "total_vs_regional")
            .recommending("Check that every requested work item is included in the quote"),
        );
    }
    cp.build()
}

fn unit_prices_detailed(input: &EvaluationInput<'_>) -> ControlPointScore {
    let mut cp = ControlPointBuilder::new("unit_prices_detailed", 40.0);
    let items = &input.quote.extracted_data.line_items;
    if items.is_empty() {
        cp.absent("line items").confidence(60);
        return cp.build();
    }
    let detailed = items.iter().filter(|item| item.is_detailed()).count();
    cp.award(
        detailed as f64 / items.len() as f64,
        format!("{detailed}/{} lines with unit price and quantity", items.len()),
    );
    cp.build()
}

fn labor_material_split(input: &EvaluationInput<'_>) -> ControlPointScore {
    let mut cp = ControlPointBuilder::new("labor_material_split", 20.0);
    cp.keyword_rules(&input.text, STRUCTURE_RULES);
    cp.confidence(75);
    cp.build()
}

fn is_lump_sum(item: &LineItem) -> bool {
    let unit_lump = item
        .unit
        .as_deref()
        .map(normalize_text)
        .is_some_and(|unit| LUMP_SUM_UNITS.contains(&unit.as_str()));
    let description = normalize_text(&item.description);
    unit_lump
        || LUMP_SUM_KEYWORDS
            .iter()
            .any(|k| contains_term(&description, k))
        || !item.is_detailed()
}

fn lump_sum_usage(input: &EvaluationInput<'_>) -> ControlPointScore {
    let mut cp = ControlPointBuilder::new("lump_sum_usage", 20.0);
    let items = &input.quote.extracted_data.line_items;
    if items.is_empty() {
        cp.absent("line items").confidence(60);
        return cp.build();
    }
    let lump = items.iter().filter(|item| is_lump_sum(item)).count();
    let share_lump = lump as f64 / items.len() as f64;
    let share = if share_lump <= 0.2 {
        1.0
    } else if share_lump <= 0.5 {
        0.6
    } else if share_lump < 1.0 {
        0.3
    } else {
        0.0
    };
    cp.credit(share)
        .note(format!("{lump}/{} lump-sum lines", items.len()));
    cp.build()
}

fn line_totals(input: &EvaluationInput<'_>, report: &mut AxisReport) -> ControlPointScore {
    let mut cp = ControlPointBuilder::new("line_totals", 25.0);
    let checkable: Vec<(&LineItem, f64, f64)> = input
        .quote
        .extracted_data
        .line_items
        .iter()
        .filter_map(|item| Some((item, item.computed_total()?, item.total?)))
        .collect();
    if checkable.is_empty() {
        cp.credit(0.5).absent("line totals to check").confidence(40);
        return cp.build();
    }

    let wrong: Vec<&str> = checkable
        .iter()
        .filter(|(_, computed, printed)| {
            (computed - printed).abs() > (printed.abs() * 0.01).max(0.5)
        })
        .map(|(item, _, _)| item.description.as_str())
        .collect();
    let consistent = checkable.len() - wrong.len();
    cp.award(
        consistent as f64 / checkable.len() as f64,
        format!("{consistent}/{} line totals consistent", checkable.len()),
    )
    .confidence(95);

    if !wrong.is_empty() {
        report.alert(
            Alert::new(
                Severity::Major,
                AxisId::Price,
                format!(
                    "{} line total(s) differ from unit price × quantity: {}",
                    wrong.len(),
                    wrong.join(", ")
                ),
                "The amount to pay may not match the works described",
            )
            .at(ARITHMETIC, "line_totals")
            .recommending("Ask the contractor to correct the line totals"),
        );
    }
    cp.build()
}

fn vat_totals(input: &EvaluationInput<'_>, report: &mut AxisReport) -> ControlPointScore {
    let mut cp = ControlPointBuilder::new("vat_totals", 25.0);
    let totals = &input.quote.extracted_data.totals;

    match (totals.total_ht, totals.total_vat, totals.total_ttc) {
        (Some(ht), Some(vat), Some(ttc)) => {
            if (ht + vat - ttc).abs() <= (ttc.abs() * 0.005).max(1.0) {
                cp.award(0.6, "excl. VAT + VAT = incl. VAT");
            } else {
                cp.absent("consistent VAT totals").confidence(95);
                report.alert(
                    Alert::new(
                        Severity::Major,
                        AxisId::Price,
                        format!("Totals do not add up: {ht:.2} + {vat:.2} ≠ {ttc:.2}"),
                        "The amount to pay is ambiguous",
                    )
                    .at(ARITHMETIC, "vat_totals")
                    .recommending("Ask for corrected totals before signing"),
                );
            }
        }
        (_, _, Some(_)) => {
            cp.credit(0.2).absent("full VAT breakdown").confidence(50);
        }
        _ => {
            cp.absent("declared totals").confidence(40);
        }
    }

    let rate = totals.vat_rate.or_else(|| match (totals.total_ht, totals.total_vat) {
        (Some(ht), Some(vat)) if ht > 0.0 => Some((vat / ht * 1000.0).round() / 10.0),
        _ => None,
    });
    match rate {
        Some(rate) if LEGAL_VAT_RATES.iter().any(|legal| (legal - rate).abs() < 0.15) => {
            cp.award(0.4, format!("legal VAT rate {rate}%"));
        }
        Some(rate) => {
            cp.absent("legal VAT rate")
                .note(format!("VAT rate {rate}% is not a French rate"));
        }
        None => {
            cp.absent("VAT rate").cap_confidence(50);
        }
    }
    cp.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        EnrichmentBundle, Profile, Quote, RegionalData, ScoringContext,
    };

    fn line(description: &str, unit_price: f64, quantity: f64) -> LineItem {
        LineItem {
            description: description.to_string(),
            unit_price: Some(unit_price),
            quantity: Some(quantity),
            unit: Some("m2".to_string()),
            total: Some(unit_price * quantity),
        }
    }

    fn context() -> ScoringContext {
        ScoringContext::new(Profile::B2C, "renovation", 12_000.0)
    }

    fn reference(label: &str, median: f64) -> PriceReference {
        PriceReference {
            label: label.to_string(),
            median,
            ..Default::default()
        }
    }

    #[test]
    fn test_budget_is_250() {
        let axis = PriceAxis.evaluate(&Quote::default(), &EnrichmentBundle::default(), &context());
        let declared: f64 = axis.sub_criteria.iter().map(|s| s.max_points).sum();
        assert!((declared - 250.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_benchmark_in_band_scores_full() {
        let mut quote = Quote::default();
        quote.extracted_data.line_items = vec![line("Pose carrelage sol", 50.0, 20.0)];
        let enrichment = EnrichmentBundle {
            price_references: vec![reference("pose carrelage", 50.0)],
            ..Default::default()
        };
        let axis = PriceAxis.evaluate(&quote, &enrichment, &context());
        let cp = axis.control_point("line_item_benchmark").expect("control point");
        assert!((cp.score - 70.0).abs() < 1e-9);
    }

    #[test]
    fn test_overpriced_line_is_major_alert() {
        let mut quote = Quote::default();
        quote.extracted_data.line_items = vec![line("Pose carrelage sol", 200.0, 10.0)];
        let enrichment = EnrichmentBundle {
            price_references: vec![reference("pose carrelage", 50.0)],
            ..Default::default()
        };
        let axis = PriceAxis.evaluate(&quote, &enrichment, &context());
        assert!(axis.alerts.iter().any(|a| {
            a.severity == Severity::Major
                && a.control_point_id.as_deref() == Some("line_item_benchmark")
        }));
    }

    #[test]
    fn test_abnormally_low_total() {
        let quote = Quote {
            total_amount: 3_000.0,
            ..Default::default()
        };
        let enrichment = EnrichmentBundle {
            regional_data: Some(RegionalData {
                average_project_cost: Some(10_000.0),
                ..Default::default()
            }),
            ..Default::default()
        };
        let axis = PriceAxis.evaluate(&quote, &enrichment, &context());
        assert!(axis
            .alerts
            .iter()
            .any(|a| a.message.starts_with("Abnormally low price")));
    }

    #[test]
    fn test_vat_inconsistency_flagged() {
        let mut quote = Quote::default();
        quote.extracted_data.totals.total_ht = Some(1_000.0);
        quote.extracted_data.totals.total_vat = Some(100.0);
        quote.extracted_data.totals.total_ttc = Some(1_250.0);
        let axis = PriceAxis.evaluate(&quote, &EnrichmentBundle::default(), &context());
        assert!(axis
            .alerts
            .iter()
            .any(|a| a.control_point_id.as_deref() == Some("vat_totals")));
        let cp = axis.control_point("vat_totals").expect("control point");
        // 10 % is still a legal rate
        assert!((cp.score - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_lump_sum_detection() {
        let lump = LineItem {
            description: "Forfait plomberie".to_string(),
            unit_price: Some(800.0),
            quantity: Some(1.0),
            ..Default::default()
        };
        assert!(is_lump_sum(&lump));
        assert!(!is_lump_sum(&line("Peinture murs", 25.0, 40.0)));
    }
}
