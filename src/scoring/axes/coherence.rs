//! Request-quote coherence axis.
//!
//! Compares the quote with what the customer actually asked for. Without a
//! stated need there is nothing to compare against: the axis scores zero
//! over its full budget and asks the caller to supply one next time.

use super::{AxisReport, AxisStrategy, EvaluationInput};
use crate::model::StatedNeed;
use crate::scoring::axis_config::axis_config;
use crate::scoring::rules::{ControlPointBuilder, ANCILLARY_WORK_KEYWORDS};
use crate::scoring::text::{contains_term, token_coverage};
use crate::scoring::types::{
    Alert, AxisId, AxisScore, ControlPointScore, Priority, Recommendation, Severity,
    SubCriteriaScore,
};

const BUDGET_AND_DEADLINE: &str = "budget_and_deadline";

/// Minimum token coverage for a requested item to count as quoted.
const COVERAGE_MATCH: f64 = 0.5;

/// Tolerated overrun of the budget ceiling before it is flagged.
const BUDGET_TOLERANCE: f64 = 1.1;

const NOT_SUPPLIED: &str = "stated need not supplied";

/// Catalog of the axis: sub-criteria and their control points with budgets.
const CATALOG: &[(&str, &[(&str, f64)])] = &[
    (
        "scope_match",
        &[("requested_work_covered", 45.0), ("unrequested_work", 25.0)],
    ),
    ("constraints_respected", &[("constraints_addressed", 40.0)]),
    (
        BUDGET_AND_DEADLINE,
        &[("budget_fit", 25.0), ("deadline_fit", 15.0)],
    ),
];

/// How well the quote answers the customer's request.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoherenceAxis;

impl AxisStrategy for CoherenceAxis {
    fn axis_id(&self) -> AxisId {
        AxisId::Coherence
    }

    fn evaluate_input(&self, input: &EvaluationInput<'_>) -> AxisScore {
        let Some(need) = input.context.stated_need.as_ref() else {
            return not_evaluated();
        };
        let mut report = AxisReport::new(AxisId::Coherence);

        report.criterion(
            "scope_match",
            "Ask the contractor to quote exactly the requested works, and only those",
            vec![requested_work_covered(input, need), unrequested_work(input, need)],
        );
        report.criterion(
            "constraints_respected",
            "Check with the contractor how each of your constraints will be handled",
            vec![constraints_addressed(input, need)],
        );
        let budget = vec![
            budget_fit(input, need, &mut report),
            deadline_fit(input, need, &mut report),
        ];
        report.criterion(
            BUDGET_AND_DEADLINE,
            "Negotiate the price and the schedule against your budget and deadline",
            budget,
        );

        report.finish()
    }
}

/// Zero score over the full budget, one informational alert, one recommendation.
fn not_evaluated() -> AxisScore {
    let sub_criteria = CATALOG
        .iter()
        .map(|(id, points)| {
            let control_points = points
                .iter()
                .map(|(cp, max)| ControlPointScore::new(*cp, 0.0, *max, NOT_SUPPLIED, 100))
                .collect();
            let max = points.iter().map(|(_, max)| max).sum();
            SubCriteriaScore::new(*id, max, control_points)
        })
        .collect();

    let max_points = axis_config(AxisId::Coherence).max_points;
    AxisScore::new(
        AxisId::Coherence,
        max_points,
        sub_criteria,
        vec![Alert::new(
            Severity::Minor,
            AxisId::Coherence,
            "Request-quote coherence not evaluated: no stated need was supplied",
            "The quote cannot be checked against what was requested",
        )],
        vec![Recommendation {
            priority: Priority::Low,
            category: AxisId::Coherence.into(),
            suggestion: "Supply the customer's stated need (desired works, constraints, \
                         deadline, budget) to evaluate request-quote coherence"
                .to_string(),
            potential_impact: max_points,
            actionable: true,
        }],
    )
}

fn requested_work_covered(input: &EvaluationInput<'_>, need: &StatedNeed) -> ControlPointScore {
    let mut cp = ControlPointBuilder::new("requested_work_covered", 45.0);
    if need.desired_work.is_empty() {
        cp.credit(0.5).absent("desired works").confidence(40);
        return cp.build();
    }

    let mut covered = 0usize;
    for wanted in &need.desired_work {
        let quoted = input
            .text
            .lines()
            .iter()
            .any(|line| token_coverage(wanted, line) >= COVERAGE_MATCH);
        if quoted {
            covered += 1;
            cp.found(wanted.clone());
        } else {
            cp.absent(wanted.clone());
        }
    }
    cp.credit(covered as f64 / need.desired_work.len() as f64)
        .note(format!(
            "{covered}/{} requested items quoted",
            need.desired_work.len()
        ))
        .confidence(75);
    cp.build()
}

fn unrequested_work(input: &EvaluationInput<'_>, need: &StatedNeed) -> ControlPointScore {
    let mut cp = ControlPointBuilder::new("unrequested_work", 25.0);
    let lines = input.text.lines();
    if lines.is_empty() {
        cp.absent("line items").confidence(50);
        return cp.build();
    }
    if need.desired_work.is_empty() {
        cp.credit(0.5).absent("desired works").confidence(40);
        return cp.build();
    }

    let extra: Vec<&String> = lines
        .iter()
        .filter(|line| {
            let ancillary = ANCILLARY_WORK_KEYWORDS
                .iter()
                .any(|k| contains_term(line, k));
            let requested = need.desired_work.iter().any(|wanted| {
                token_coverage(wanted, line) >= COVERAGE_MATCH
                    || token_coverage(line, wanted) >= COVERAGE_MATCH
            });
            !ancillary && !requested
        })
        .collect();

    let share_extra = extra.len() as f64 / lines.len() as f64;
    let share = if extra.is_empty() {
        1.0
    } else if share_extra <= 0.2 {
        0.7
    } else if share_extra <= 0.4 {
        0.4
    } else {
        0.0
    };
    cp.credit(share).confidence(70);
    if extra.is_empty() {
        cp.note("no unrequested line");
    } else {
        cp.note(format!(
            "unrequested lines: {}",
            extra
                .iter()
                .map(|line| line.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ));
    }
    cp.build()
}

fn constraints_addressed(input: &EvaluationInput<'_>, need: &StatedNeed) -> ControlPointScore {
    let mut cp = ControlPointBuilder::new("constraints_addressed", 40.0);
    if need.constraints.is_empty() {
        cp.credit(1.0).note("no constraint stated").confidence(80);
        return cp.build();
    }

    let mut addressed = 0usize;
    for constraint in &need.constraints {
        if token_coverage(constraint, input.text.full()) >= COVERAGE_MATCH {
            addressed += 1;
            cp.found(constraint.clone());
        } else {
            cp.absent(constraint.clone());
        }
    }
    cp.credit(addressed as f64 / need.constraints.len() as f64)
        .confidence(65);
    cp.build()
}

fn budget_fit(
    input: &EvaluationInput<'_>,
    need: &StatedNeed,
    report: &mut AxisReport,
) -> ControlPointScore {
    let mut cp = ControlPointBuilder::new("budget_fit", 25.0);
    let Some(ceiling) = need.budget_ceiling else {
        cp.credit(0.5).absent("budget ceiling").confidence(40);
        return cp.build();
    };
    let total = input.project_total();

    if total <= ceiling {
        cp.award(1.0, format!("total {total:.0} within budget {ceiling:.0}"))
            .confidence(95);
    } else if total <= ceiling * BUDGET_TOLERANCE {
        cp.award(0.6, format!("total {total:.0} slightly above budget {ceiling:.0}"))
            .confidence(95);
    } else {
        cp.note(format!("total {total:.0} exceeds budget {ceiling:.0}"))
            .confidence(95);
        let overrun = if ceiling > 0.0 {
            (total / ceiling - 1.0) * 100.0
        } else {
            100.0
        };
        report.alert(
            Alert::new(
                Severity::Major,
                AxisId::Coherence,
                format!("Quote exceeds the stated budget by {overrun:.0}%"),
                "The project cannot be financed as planned",
            )
            .at(BUDGET_AND_DEADLINE, "budget_fit")
            .recommending("Negotiate the scope or the price to fit the budget"),
        );
    }
    cp.build()
}

fn deadline_fit(
    input: &EvaluationInput<'_>,
    need: &StatedNeed,
    report: &mut AxisReport,
) -> ControlPointScore {
    let mut cp = ControlPointBuilder::new("deadline_fit", 15.0);
    let Some(deadline) = need.deadline else {
        cp.credit(0.5).absent("deadline").confidence(40);
        return cp.build();
    };

    match input.quote.extracted_data.dates.planned_end() {
        Some(end) if end <= deadline => {
            cp.award(1.0, format!("planned end {end} before deadline {deadline}"))
                .confidence(90);
        }
        Some(end) => {
            cp.note(format!("planned end {end} after deadline {deadline}"))
                .confidence(90);
            report.alert(
                Alert::new(
                    Severity::Major,
                    AxisId::Coherence,
                    format!("Planned completion {end} is after the requested deadline {deadline}"),
                    "The works will not be delivered on time",
                )
                .at(BUDGET_AND_DEADLINE, "deadline_fit")
                .recommending("Agree on a completion date with late-delivery penalties"),
            );
        }
        None => {
            cp.credit(0.4).absent("planned completion date").confidence(40);
        }
    }
    cp.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EnrichmentBundle, LineItem, Profile, Quote, ScoringContext};
    use chrono::NaiveDate;

    fn quote() -> Quote {
        let mut quote = Quote {
            total_amount: 12_000.0,
            ..Default::default()
        };
        quote.extracted_data.line_items = vec![
            LineItem {
                description: "Remplacement chaudière gaz condensation".to_string(),
                ..Default::default()
            },
            LineItem {
                description: "Protection et nettoyage du chantier".to_string(),
                ..Default::default()
            },
        ];
        quote.extracted_data.dates.start_date = NaiveDate::from_ymd_opt(2025, 3, 1);
        quote.extracted_data.dates.duration_days = Some(5);
        quote
    }

    #[test]
    fn test_without_need_scores_zero_with_one_alert() {
        let context = ScoringContext::new(Profile::B2C, "renovation", 12_000.0);
        let axis = CoherenceAxis.evaluate(&quote(), &EnrichmentBundle::default(), &context);
        assert!(axis.score.abs() < f64::EPSILON);
        assert!((axis.max_points - 150.0).abs() < f64::EPSILON);
        let declared: f64 = axis.sub_criteria.iter().map(|s| s.max_points).sum();
        assert!((declared - 150.0).abs() < f64::EPSILON);
        assert_eq!(axis.alerts.len(), 1);
        assert_eq!(axis.recommendations.len(), 1);
    }

    #[test]
    fn test_matching_need_scores_high() {
        let context = ScoringContext::new(Profile::B2C, "renovation", 12_000.0).with_stated_need(
            StatedNeed {
                desired_work: vec!["remplacement chaudière".to_string()],
                constraints: Vec::new(),
                deadline: NaiveDate::from_ymd_opt(2025, 3, 31),
                budget_ceiling: Some(13_000.0),
            },
        );
        let axis = CoherenceAxis.evaluate(&quote(), &EnrichmentBundle::default(), &context);
        assert!((axis.score - 150.0).abs() < 1e-9, "score {}", axis.score);
        assert!(axis.alerts.is_empty());
    }

    #[test]
    fn test_budget_and_deadline_overrun() {
        let context = ScoringContext::new(Profile::B2C, "renovation", 12_000.0).with_stated_need(
            StatedNeed {
                desired_work: vec!["remplacement chaudière".to_string()],
                constraints: Vec::new(),
                deadline: NaiveDate::from_ymd_opt(2025, 3, 2),
                budget_ceiling: Some(9_000.0),
            },
        );
        let axis = CoherenceAxis.evaluate(&quote(), &EnrichmentBundle::default(), &context);
        let flagged: Vec<_> = axis
            .alerts
            .iter()
            .filter_map(|a| a.control_point_id.as_deref())
            .collect();
        assert_eq!(flagged, vec!["budget_fit", "deadline_fit"]);
    }
}
