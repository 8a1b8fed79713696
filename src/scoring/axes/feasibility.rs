//! Feasibility axis: technical scope, company capacity, site constraints.

use super::{AxisReport, AxisStrategy, EvaluationInput};
use crate::scoring::rules::{
    count_share, ladder_share, matched_signals, ControlPointBuilder, DESCRIPTION_LADDER,
    SITE_PREPARATION_KEYWORDS, TECHNICAL_GROUPS, WEATHER_PROVISION_KEYWORDS,
};
use crate::scoring::text::token_coverage;
use crate::scoring::types::{Alert, AxisId, AxisScore, ControlPointScore, Severity};

const TECHNICAL_SHARES: &[f64] = &[0.0, 0.3, 0.55, 0.75, 1.0];
const SITE_PREPARATION_SHARES: &[f64] = &[0.0, 0.4, 0.7, 1.0];

/// Whether the company can deliver the quoted works.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeasibilityAxis;

impl AxisStrategy for FeasibilityAxis {
    fn axis_id(&self) -> AxisId {
        AxisId::Feasibility
    }

    fn evaluate_input(&self, input: &EvaluationInput<'_>) -> AxisScore {
        let mut report = AxisReport::new(AxisId::Feasibility);

        report.criterion(
            "technical_scope",
            "Ask for a precise technical description of each work item",
            vec![work_description_precision(input), technical_references(input)],
        );

        let capacity = vec![
            workforce_capacity(input, &mut report),
            relevant_experience(input),
        ];
        report.criterion(
            "capacity",
            "Ask how many people will work on site and for references of similar projects",
            capacity,
        );

        report.criterion(
            "site_constraints",
            "Ask how the site will be prepared, protected and cleaned",
            vec![weather_exposure(input), site_preparation(input)],
        );

        report.finish()
    }
}

fn work_description_precision(input: &EvaluationInput<'_>) -> ControlPointScore {
    let mut cp = ControlPointBuilder::new("work_description_precision", 35.0);
    let lines = input.text.lines();
    if lines.is_empty() {
        cp.absent("line item descriptions").confidence(50);
        return cp.build();
    }

    let words: usize = lines.iter().map(|l| l.split_whitespace().count()).sum();
    let mean_words = words as f64 / lines.len() as f64;
    let with_unit = input
        .quote
        .extracted_data
        .line_items
        .iter()
        .filter(|item| item.unit.as_deref().is_some_and(|u| !u.trim().is_empty()))
        .count();
    let unit_share = with_unit as f64 / lines.len() as f64;

    cp.award(
        0.7 * ladder_share(mean_words, DESCRIPTION_LADDER),
        format!("{mean_words:.1} words per line"),
    )
    .award(
        0.3 * unit_share,
        format!("{with_unit}/{} lines with a unit", lines.len()),
    );
    cp.build()
}

fn technical_references(input: &EvaluationInput<'_>) -> ControlPointScore {
    let mut cp = ControlPointBuilder::new("technical_references", 25.0);
    let matched = matched_signals(&input.text, TECHNICAL_GROUPS);
    if matched.is_empty() {
        cp.absent("technical references");
    } else {
        cp.award(
            count_share(matched.len(), TECHNICAL_SHARES),
            format!("technical references: {}", matched.join(", ")),
        );
    }
    cp.confidence(75);
    cp.build()
}

fn workforce_capacity(input: &EvaluationInput<'_>, report: &mut AxisReport) -> ControlPointScore {
    let mut cp = ControlPointBuilder::new("workforce_capacity", 30.0);
    let band = input.context.project_amount_band;
    let required = band.minimum_workforce();
    let staff = input
        .company()
        .and_then(|c| c.human_resources.as_ref())
        .and_then(|hr| {
            hr.employee_count
                .or((hr.qualified_staff > 0).then_some(hr.qualified_staff))
        });

    let Some(staff) = staff else {
        cp.credit(0.4).absent("workforce").confidence(30);
        return cp.build();
    };

    let found = format!("{staff} staff for a {} project (needs {required})", band.name());
    if staff >= required {
        cp.award(1.0, found).confidence(85);
    } else if staff * 2 >= required {
        cp.award(0.6, found).confidence(85);
    } else {
        cp.award(0.2, found).confidence(85);
        report.alert(
            Alert::new(
                Severity::Major,
                AxisId::Feasibility,
                format!(
                    "Workforce of {staff} is small for a {} project (at least {required} expected)",
                    band.name()
                ),
                "Delays or subcontracting are likely",
            )
            .at("capacity", "workforce_capacity")
            .recommending("Ask whether the works will be subcontracted and to whom"),
        );
    }
    cp.build()
}

fn relevant_experience(input: &EvaluationInput<'_>) -> ControlPointScore {
    let mut cp = ControlPointBuilder::new("relevant_experience", 20.0);
    if let Some(portfolio) = input.company().and_then(|c| c.portfolio.as_ref()) {
        let share = match portfolio.similar_projects {
            10.. => 1.0,
            3..=9 => 0.75,
            1..=2 => 0.5,
            0 if portfolio.completed_projects >= 10 => 0.4,
            0 => 0.2,
        };
        cp.award(
            share,
            format!(
                "{} similar of {} completed projects",
                portfolio.similar_projects, portfolio.completed_projects
            ),
        )
        .confidence(80);
        return cp.build();
    }

    let nature = input.trade().unwrap_or(&input.context.project_type);
    let activity_match = input.company().is_some_and(|company| {
        company
            .activities
            .iter()
            .any(|activity| token_coverage(nature, activity) >= 0.5)
    });
    if activity_match {
        cp.award(0.5, "declared activity matches the works")
            .absent("portfolio")
            .confidence(40);
    } else {
        cp.credit(0.3).absent("portfolio").confidence(30);
    }
    cp.build()
}

fn weather_exposure(input: &EvaluationInput<'_>) -> ControlPointScore {
    let mut cp = ControlPointBuilder::new("weather_exposure", 20.0);
    if !input.is_outdoor_work() {
        cp.award(1.0, "indoor works").confidence(80);
        return cp.build();
    }

    let provision = input.text.first_match(WEATHER_PROVISION_KEYWORDS);
    match (&input.enrichment.weather_data, input.start_month()) {
        (Some(weather), Some(month)) => {
            if !weather.high_risk_months.contains(&month) {
                cp.award(1.0, format!("start month {month} outside weather-risk months"))
                    .confidence(85);
            } else if let Some(keyword) = provision {
                cp.award(0.7, format!("weather provision (\"{keyword}\")"))
                    .note(format!("start month {month} is a weather-risk month"))
                    .confidence(80);
            } else {
                cp.credit(0.3)
                    .absent("weather provision")
                    .note(format!("start month {month} is a weather-risk month"))
                    .confidence(80);
            }
        }
        (Some(_), None) => {
            cp.credit(0.5).absent("start date").confidence(50);
        }
        (None, _) => match provision {
            Some(keyword) => {
                cp.award(0.75, format!("weather provision (\"{keyword}\")"))
                    .absent("weather statistics")
                    .confidence(50);
            }
            None => {
                cp.credit(0.5).absent("weather statistics").confidence(40);
            }
        },
    }
    cp.build()
}

fn site_preparation(input: &EvaluationInput<'_>) -> ControlPointScore {
    let mut cp = ControlPointBuilder::new("site_preparation", 20.0);
    let matched = input.text.matched(SITE_PREPARATION_KEYWORDS);
    if matched.is_empty() {
        cp.absent("site preparation");
    } else {
        cp.award(
            count_share(matched.len(), SITE_PREPARATION_SHARES),
            format!("site preparation: {}", matched.join(", ")),
        );
    }
    cp.confidence(75);
    cp.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        CompanyData, EnrichmentBundle, HumanResources, Profile, Quote, ScoringContext,
        WeatherData,
    };
    use chrono::NaiveDate;

    #[test]
    fn test_budget_is_150() {
        let context = ScoringContext::new(Profile::B2B, "renovation", 12_000.0);
        let axis = FeasibilityAxis.evaluate(&Quote::default(), &EnrichmentBundle::default(), &context);
        let declared: f64 = axis.sub_criteria.iter().map(|s| s.max_points).sum();
        assert!((declared - 150.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_small_workforce_for_major_project() {
        let context = ScoringContext::new(Profile::B2B, "construction", 250_000.0);
        let enrichment = EnrichmentBundle {
            company: Some(CompanyData {
                human_resources: Some(HumanResources {
                    employee_count: Some(2),
                    qualified_staff: 1,
                }),
                ..Default::default()
            }),
            ..Default::default()
        };
        let axis = FeasibilityAxis.evaluate(&Quote::default(), &enrichment, &context);
        assert!(axis.alerts.iter().any(|a| a.severity == Severity::Major
            && a.control_point_id.as_deref() == Some("workforce_capacity")));
    }

    #[test]
    fn test_weather_risk_month_without_provision() {
        let context = ScoringContext::new(Profile::B2C, "toiture", 9_000.0);
        let mut quote = Quote::default();
        quote.extracted_data.dates.start_date = NaiveDate::from_ymd_opt(2025, 12, 1);
        let enrichment = EnrichmentBundle {
            weather_data: Some(WeatherData {
                high_risk_months: vec![11, 12, 1, 2],
                ..Default::default()
            }),
            ..Default::default()
        };
        let axis = FeasibilityAxis.evaluate(&quote, &enrichment, &context);
        let cp = axis.control_point("weather_exposure").expect("control point");
        assert!((cp.score - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_technical_references_count_distinct_signals() {
        let context = ScoringContext::new(Profile::B2C, "renovation", 12_000.0);
        let technical_points = |free_text: &str| {
            let mut quote = Quote::default();
            quote.extracted_data.free_text = Some(free_text.to_string());
            FeasibilityAxis
                .evaluate(&quote, &EnrichmentBundle::default(), &context)
                .control_point("technical_references")
                .expect("control point")
                .score
        };

        // "Mme" is not a thickness in millimetres.
        assert!(technical_points("Attention de Mme Dupont").abs() < f64::EPSILON);
        // Two phrasings of the same standard count once.
        assert!((technical_points("Pose selon DTU 45.11 et norme NF") - 7.5).abs() < 1e-9);
        assert!(
            (technical_points("Isolant 200 mm, lambda 0,032, selon DTU 45.11") - 18.75).abs()
                < 1e-9
        );
    }
}
