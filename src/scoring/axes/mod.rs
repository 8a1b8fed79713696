//! The nine axis strategies.
//!
//! Each strategy owns a fixed set of sub-criteria and scores only its own
//! control points; it never sees other axes' results. Strategies are
//! stateless unit structs, built once and shared across threads.
//!
//! # Example
//!
//! ```ignore
//! use quote_scorer::scoring::axes::{AxisStrategy, PriceAxis};
//!
//! let axis = PriceAxis.evaluate(&quote, &enrichment, &context);
//! println!("{}: {:.0}/{:.0}", axis.axis_id, axis.score, axis.max_points);
//! ```

mod coherence;
mod compliance;
mod feasibility;
mod guarantees;
mod innovation;
mod price;
mod quality;
mod schedule;
mod transparency;

pub use coherence::CoherenceAxis;
pub use compliance::ComplianceAxis;
pub use feasibility::FeasibilityAxis;
pub use guarantees::GuaranteesAxis;
pub use innovation::InnovationAxis;
pub use price::PriceAxis;
pub use quality::QualityAxis;
pub use schedule::ScheduleAxis;
pub use transparency::TransparencyAxis;

use chrono::{Datelike, NaiveDate};

use super::axis_config::{axis_config, AxisConfig};
use super::rules::{OUTDOOR_WORK_KEYWORDS, STRUCTURAL_WORK_KEYWORDS};
use super::text::{contains_term, normalize_text, QuoteText};
use super::types::{
    Alert, AxisId, AxisScore, ControlPointScore, Priority, Recommendation, Severity,
    SubCriteriaScore,
};
use crate::model::{CompanyData, EnrichmentBundle, Quote, ScoringContext};

/// Everything an axis may look at, prepared once per scoring request.
#[derive(Debug, Clone)]
pub struct EvaluationInput<'a> {
    pub quote: &'a Quote,
    pub enrichment: &'a EnrichmentBundle,
    pub context: &'a ScoringContext,
    /// Normalized text index of the quote
    pub text: QuoteText,
    /// Date that date-dependent checks are anchored to
    pub reference_date: Option<NaiveDate>,
}

impl<'a> EvaluationInput<'a> {
    pub fn new(
        quote: &'a Quote,
        enrichment: &'a EnrichmentBundle,
        context: &'a ScoringContext,
    ) -> Self {
        Self {
            quote,
            enrichment,
            context,
            text: QuoteText::from_quote(quote),
            reference_date: context
                .evaluation_date
                .or(quote.extracted_data.dates.issue_date),
        }
    }

    #[must_use]
    pub fn company(&self) -> Option<&'a CompanyData> {
        self.enrichment.company.as_ref()
    }

    /// Trade type from the context, else from the quote.
    #[must_use]
    pub fn trade(&self) -> Option<&'a str> {
        self.context
            .trade_type
            .as_deref()
            .or(self.quote.trade_type.as_deref())
            .filter(|t| !t.trim().is_empty())
    }

    /// Quote total including VAT.
    #[must_use]
    pub fn project_total(&self) -> f64 {
        if self.quote.total_amount > 0.0 {
            self.quote.total_amount
        } else {
            self.quote
                .extracted_data
                .totals
                .total_ttc
                .unwrap_or(0.0)
        }
    }

    /// Project and trade type, normalized, for work-nature checks.
    fn work_nature(&self) -> String {
        let mut nature = normalize_text(&self.context.project_type);
        for extra in [Some(self.quote.project_type.as_str()), self.trade()]
            .into_iter()
            .flatten()
        {
            nature.push(' ');
            nature.push_str(&normalize_text(extra));
        }
        nature
    }

    /// Whether the works are exposed to the weather.
    #[must_use]
    pub fn is_outdoor_work(&self) -> bool {
        let nature = self.work_nature();
        OUTDOOR_WORK_KEYWORDS
            .iter()
            .any(|k| contains_term(&nature, k))
    }

    /// Whether decennial insurance is mandatory for these works.
    #[must_use]
    pub fn requires_decennial_insurance(&self) -> bool {
        if let Some(compliance) = &self.enrichment.compliance_data {
            return compliance.requires_decennial_insurance;
        }
        let nature = self.work_nature();
        STRUCTURAL_WORK_KEYWORDS
            .iter()
            .any(|k| contains_term(&nature, k))
    }

    /// Planned start month (1-12), if a start date is declared.
    #[must_use]
    pub fn start_month(&self) -> Option<u32> {
        self.quote
            .extracted_data
            .dates
            .start_date
            .map(|d| d.month())
    }
}

/// Contract shared by the nine axes.
pub trait AxisStrategy: Send + Sync {
    /// The axis this strategy scores.
    fn axis_id(&self) -> AxisId;

    /// Score the axis from a prepared input.
    fn evaluate_input(&self, input: &EvaluationInput<'_>) -> AxisScore;

    /// Score the axis for a quote, its enrichment and the caller context.
    fn evaluate(
        &self,
        quote: &Quote,
        enrichment: &EnrichmentBundle,
        context: &ScoringContext,
    ) -> AxisScore {
        self.evaluate_input(&EvaluationInput::new(quote, enrichment, context))
    }

    /// Static configuration of the axis.
    fn config(&self) -> &'static AxisConfig {
        axis_config(self.axis_id())
    }
}

/// The nine strategies, in axis order.
#[must_use]
pub fn default_strategies() -> Vec<Box<dyn AxisStrategy>> {
    vec![
        Box::new(ComplianceAxis),
        Box::new(PriceAxis),
        Box::new(QualityAxis),
        Box::new(FeasibilityAxis),
        Box::new(CoherenceAxis),
        Box::new(TransparencyAxis),
        Box::new(GuaranteesAxis),
        Box::new(ScheduleAxis),
        Box::new(InnovationAxis),
    ]
}

/// Axis-level alert raised when the axis percentage falls under a threshold.
#[derive(Debug, Clone, Copy)]
struct AxisAlertRule {
    threshold: f64,
    severity: Severity,
    impact: &'static str,
}

const fn alert_rule(axis: AxisId) -> AxisAlertRule {
    match axis {
        AxisId::Compliance => AxisAlertRule {
            threshold: 60.0,
            severity: Severity::Critical,
            impact: "Legal protections of the customer are not established",
        },
        AxisId::Guarantees => AxisAlertRule {
            threshold: 60.0,
            severity: Severity::Major,
            impact: "Defects after completion may not be covered",
        },
        AxisId::Price => AxisAlertRule {
            threshold: 50.0,
            severity: Severity::Major,
            impact: "The price cannot be trusted as fair or consistent",
        },
        AxisId::Quality => AxisAlertRule {
            threshold: 50.0,
            severity: Severity::Major,
            impact: "The company's track record gives little assurance",
        },
        AxisId::Feasibility => AxisAlertRule {
            threshold: 50.0,
            severity: Severity::Major,
            impact: "The company may not be able to deliver the works as quoted",
        },
        AxisId::Coherence => AxisAlertRule {
            threshold: 50.0,
            severity: Severity::Major,
            impact: "The quote does not answer what was requested",
        },
        AxisId::Transparency => AxisAlertRule {
            threshold: 50.0,
            severity: Severity::Major,
            impact: "Key commercial information is missing from the quote",
        },
        AxisId::Schedule => AxisAlertRule {
            threshold: 50.0,
            severity: Severity::Minor,
            impact: "Delivery dates are uncertain",
        },
        AxisId::Innovation => AxisAlertRule {
            threshold: 50.0,
            severity: Severity::Minor,
            impact: "Energy savings and aid eligibility are not leveraged",
        },
    }
}

/// Sub-criterion under which an axis-local recommendation is emitted.
const SUB_CRITERION_TARGET: f64 = 0.5;

/// Collects the sub-criteria and alerts of one axis evaluation.
#[derive(Debug)]
pub(crate) struct AxisReport {
    axis_id: AxisId,
    criteria: Vec<(SubCriteriaScore, &'static str)>,
    alerts: Vec<Alert>,
}

impl AxisReport {
    pub(crate) fn new(axis_id: AxisId) -> Self {
        Self {
            axis_id,
            criteria: Vec::new(),
            alerts: Vec::new(),
        }
    }

    /// Add a sub-criterion; its budget is the sum of its control points.
    ///
    /// `advice` becomes the recommendation when the sub-criterion scores low.
    pub(crate) fn criterion(
        &mut self,
        id: &'static str,
        advice: &'static str,
        control_points: Vec<ControlPointScore>,
    ) {
        let max_points = control_points.iter().map(|cp| cp.max_points).sum();
        self.criteria
            .push((SubCriteriaScore::new(id, max_points, control_points), advice));
    }

    pub(crate) fn alert(&mut self, alert: Alert) {
        self.alerts.push(alert);
    }

    /// Assemble the axis score with its threshold alert and recommendations.
    pub(crate) fn finish(self) -> AxisScore {
        let config = axis_config(self.axis_id);
        let priority = match self.axis_id {
            AxisId::Compliance | AxisId::Price => Priority::High,
            _ => Priority::Medium,
        };

        let recommendations = self
            .criteria
            .iter()
            .filter(|(sub, _)| sub.ratio() < SUB_CRITERION_TARGET)
            .map(|(sub, advice)| Recommendation {
                priority,
                category: self.axis_id.into(),
                suggestion: (*advice).to_string(),
                potential_impact: sub.max_points - sub.score,
                actionable: true,
            })
            .collect();

        let sub_criteria: Vec<SubCriteriaScore> =
            self.criteria.into_iter().map(|(sub, _)| sub).collect();
        let mut alerts = self.alerts;

        let mut axis = AxisScore::new(
            self.axis_id,
            config.max_points,
            sub_criteria,
            Vec::new(),
            recommendations,
        );

        let rule = alert_rule(self.axis_id);
        if axis.percentage < rule.threshold {
            alerts.push(Alert::new(
                rule.severity,
                self.axis_id,
                format!(
                    "{} score is {:.0}%, below the {:.0}% threshold",
                    self.axis_id.name(),
                    axis.percentage,
                    rule.threshold
                ),
                rule.impact,
            ));
        }
        axis.alerts = alerts;
        axis
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Profile;

    #[test]
    fn test_default_strategies_follow_axis_order() {
        let ids: Vec<AxisId> = default_strategies().iter().map(|s| s.axis_id()).collect();
        assert_eq!(ids, AxisId::ALL.to_vec());
    }

    #[test]
    fn test_reference_date_prefers_context() {
        let mut quote = Quote::default();
        quote.extracted_data.dates.issue_date = NaiveDate::from_ymd_opt(2025, 1, 10);
        let enrichment = EnrichmentBundle::default();
        let context = ScoringContext::new(Profile::B2C, "renovation", 1_000.0)
            .with_evaluation_date(NaiveDate::from_ymd_opt(2025, 2, 1).expect("valid date"));
        let input = EvaluationInput::new(&quote, &enrichment, &context);
        assert_eq!(input.reference_date, NaiveDate::from_ymd_opt(2025, 2, 1));

        let context = ScoringContext::new(Profile::B2C, "renovation", 1_000.0);
        let input = EvaluationInput::new(&quote, &enrichment, &context);
        assert_eq!(input.reference_date, NaiveDate::from_ymd_opt(2025, 1, 10));
    }

    #[test]
    fn test_work_nature_checks() {
        let quote = Quote::default();
        let enrichment = EnrichmentBundle::default();
        let context = ScoringContext::new(Profile::B2C, "toiture", 8_000.0);
        let input = EvaluationInput::new(&quote, &enrichment, &context);
        assert!(input.is_outdoor_work());
        assert!(input.requires_decennial_insurance());

        let context = ScoringContext::new(Profile::B2C, "peinture interieure", 2_000.0);
        let input = EvaluationInput::new(&quote, &enrichment, &context);
        assert!(!input.is_outdoor_work());
    }

    #[test]
    fn test_report_adds_threshold_alert_and_recommendation() {
        let mut report = AxisReport::new(AxisId::Schedule);
        report.criterion(
            "timeline_definition",
            "State the start date and the duration of the works",
            vec![ControlPointScore::new("start_date", 0.0, 40.0, "absent", 50)],
        );
        report.criterion(
            "timeline_realism",
            "Justify the announced duration",
            vec![ControlPointScore::new("duration_realism", 30.0, 30.0, "ok", 80)],
        );
        let axis = report.finish();
        assert!((axis.percentage - 30.0 / 70.0 * 100.0).abs() < 1e-9);
        assert_eq!(axis.alerts.len(), 1);
        assert_eq!(axis.alerts[0].severity, Severity::Minor);
        assert_eq!(axis.recommendations.len(), 1);
        assert!((axis.recommendations[0].potential_impact - 40.0).abs() < f64::EPSILON);
        assert_eq!(axis.recommendations[0].priority, Priority::Medium);
    }
}
