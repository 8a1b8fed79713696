//! Quality & reputation axis: reviews, certifications, financial health.

use super::{AxisReport, AxisStrategy, EvaluationInput};
use crate::model::Certification;
use crate::scoring::rules::{
    ladder_share, ControlPointBuilder, MATURITY_LADDER, QUALIFICATION_KEYWORDS, RATING_LADDER,
    TRADE_QUALIFICATIONS,
};
use crate::scoring::text::{contains_term, normalize_text, token_coverage};
use crate::scoring::types::{Alert, AxisId, AxisScore, ControlPointScore, Severity};

const REPUTATION: &str = "reputation";

/// Reviews needed before a low rating is treated as meaningful.
const MIN_REVIEWS: u32 = 5;
const MAX_COMPLAINTS: u32 = 5;

/// Track record of the company.
#[derive(Debug, Clone, Copy, Default)]
pub struct QualityAxis;

impl AxisStrategy for QualityAxis {
    fn axis_id(&self) -> AxisId {
        AxisId::Quality
    }

    fn evaluate_input(&self, input: &EvaluationInput<'_>) -> AxisScore {
        let mut report = AxisReport::new(AxisId::Quality);

        let reputation = vec![
            customer_rating(input, &mut report),
            complaint_history(input, &mut report),
        ];
        report.criterion(
            REPUTATION,
            "Read recent customer reviews and ask for references of past clients",
            reputation,
        );

        let certifications = vec![
            valid_certifications(input, &mut report),
            trade_relevant_qualification(input),
        ];
        report.criterion(
            "certifications",
            "Ask for the company's trade qualifications (Qualibat, RGE, Qualifelec...)",
            certifications,
        );

        report.criterion(
            "financial_health",
            "Check the company's financial situation before paying a deposit",
            vec![financial_score(input), company_maturity(input)],
        );

        report.finish()
    }
}

fn customer_rating(input: &EvaluationInput<'_>, report: &mut AxisReport) -> ControlPointScore {
    let mut cp = ControlPointBuilder::new("customer_rating", 45.0);
    let reputation = input.company().and_then(|c| c.reputation.as_ref());
    let Some((rating, reviews)) =
        reputation.and_then(|r| Some((r.average_rating?, r.review_count)))
    else {
        cp.credit(0.4).absent("customer rating").confidence(30);
        return cp.build();
    };
    let rating = rating.clamp(0.0, 5.0);

    let mut share = ladder_share(rating, RATING_LADDER);
    if reviews < MIN_REVIEWS {
        share *= 0.8;
        cp.note(format!("only {reviews} review(s)")).confidence(50);
    } else {
        cp.confidence(90);
    }
    cp.award(share, format!("rating {rating:.1}/5 over {reviews} reviews"));

    if rating < 3.0 && reviews >= MIN_REVIEWS {
        report.alert(
            Alert::new(
                Severity::Major,
                AxisId::Quality,
                format!("Poor customer rating: {rating:.1}/5 over {reviews} reviews"),
                "Past customers report unsatisfactory work",
            )
            .at(REPUTATION, "customer_rating")
            .recommending("Contact past customers before committing"),
        );
    }
    cp.build()
}

fn complaint_history(input: &EvaluationInput<'_>, report: &mut AxisReport) -> ControlPointScore {
    let mut cp = ControlPointBuilder::new("complaint_history", 35.0);
    let Some(reputation) = input.company().and_then(|c| c.reputation.as_ref()) else {
        cp.credit(0.4).absent("complaint history").confidence(30);
        return cp.build();
    };
    let complaints = reputation.complaint_count;
    let share = match complaints {
        0 => 1.0,
        1..=2 => 0.7,
        3..=MAX_COMPLAINTS => 0.4,
        _ => 0.0,
    };
    cp.credit(share)
        .found(format!("{complaints} complaint(s) on record"))
        .confidence(85);

    if complaints > MAX_COMPLAINTS {
        report.alert(
            Alert::new(
                Severity::Major,
                AxisId::Quality,
                format!("{complaints} complaints recorded against the company"),
                "Disputes with customers are frequent",
            )
            .at(REPUTATION, "complaint_history")
            .recommending("Ask how past complaints were resolved"),
        );
    }
    cp.build()
}

fn valid_certifications(input: &EvaluationInput<'_>, report: &mut AxisReport) -> ControlPointScore {
    let mut cp = ControlPointBuilder::new("valid_certifications", 40.0);
    let certifications: Vec<&Certification> = input.enrichment.all_certifications().collect();

    if certifications.is_empty() {
        match input.text.first_match(QUALIFICATION_KEYWORDS) {
            Some(keyword) => {
                cp.award(0.25, format!("qualification claimed on quote (\"{keyword}\")"))
                    .absent("verified certification")
                    .confidence(40);
            }
            None => {
                cp.absent("certification").confidence(50);
            }
        }
        return cp.build();
    }

    let (mut valid, mut expired, mut unknown) = (Vec::new(), Vec::new(), Vec::new());
    for certification in &certifications {
        match certification.validity_at(input.reference_date) {
            Some(true) => valid.push(certification.name.as_str()),
            Some(false) => expired.push(certification.name.as_str()),
            None => unknown.push(certification.name.as_str()),
        }
    }

    let share = match valid.len() {
        0 if !unknown.is_empty() => 0.35,
        0 => 0.0,
        1 => 0.7,
        _ => 1.0,
    };
    cp.credit(share);
    if !valid.is_empty() {
        cp.found(format!("valid: {}", valid.join(", ")));
    }
    if !unknown.is_empty() {
        cp.note(format!("validity unknown: {}", unknown.join(", ")))
            .cap_confidence(60);
    }
    if !expired.is_empty() {
        cp.note(format!("expired: {}", expired.join(", ")));
    }

    if valid.is_empty() && unknown.is_empty() {
        report.alert(
            Alert::new(
                Severity::Minor,
                AxisId::Quality,
                format!("Only expired certifications: {}", expired.join(", ")),
                "Claimed qualifications may no longer be held",
            )
            .at("certifications", "valid_certifications")
            .recommending("Ask for current certificates"),
        );
    }
    cp.build()
}

/// Qualification keywords expected for a trade, if the trade is known.
fn expected_qualifications(trade: &str) -> Option<&'static [&'static str]> {
    let trade = normalize_text(trade);
    TRADE_QUALIFICATIONS
        .iter()
        .find(|(trades, _)| trades.iter().any(|t| contains_term(&trade, t)))
        .map(|(_, qualifications)| *qualifications)
}

fn trade_relevant_qualification(input: &EvaluationInput<'_>) -> ControlPointScore {
    let mut cp = ControlPointBuilder::new("trade_relevant_qualification", 30.0);
    let held: Vec<String> = input
        .enrichment
        .all_certifications()
        .filter(|c| c.validity_at(input.reference_date) != Some(false))
        .map(|c| normalize_text(&c.name))
        .collect();
    let holds_any = |keywords: &[&str]| {
        held.iter()
            .any(|name| keywords.iter().any(|k| contains_term(name, k)))
    };

    let Some(trade) = input.trade() else {
        if holds_any(QUALIFICATION_KEYWORDS) {
            cp.award(0.65, "recognised qualification")
                .absent("trade type")
                .confidence(50);
        } else {
            cp.absent("trade type").absent("recognised qualification").confidence(40);
        }
        return cp.build();
    };

    if expected_qualifications(trade).is_some_and(holds_any) {
        cp.award(1.0, format!("qualification matching trade \"{trade}\""));
    } else if holds_any(QUALIFICATION_KEYWORDS) {
        cp.award(0.6, "recognised qualification")
            .absent(format!("qualification specific to \"{trade}\""));
    } else {
        cp.absent("recognised qualification");
        let activity_match = input.company().is_some_and(|company| {
            company
                .activities
                .iter()
                .any(|activity| token_coverage(trade, activity) >= 0.5)
        });
        if activity_match {
            cp.award(0.35, "declared activity matches trade");
        } else {
            cp.absent("declared activity matching trade");
        }
        cp.cap_confidence(70);
    }
    cp.build()
}

fn financial_score(input: &EvaluationInput<'_>) -> ControlPointScore {
    let mut cp = ControlPointBuilder::new("financial_score", 30.0);
    let company = input.company();

    if let Some(score) = company.and_then(|c| c.financial_score.as_ref()) {
        let share = (score.score / 100.0).clamp(0.0, 1.0);
        let label = score
            .rating
            .as_deref()
            .map_or_else(String::new, |r| format!(" ({r})"));
        cp.award(share, format!("financial score {:.0}/100{label}", score.score))
            .confidence(90);
        return cp.build();
    }

    let Some(accounts) = company.and_then(|c| c.financial_data.as_ref()) else {
        cp.credit(0.4).absent("financial data").confidence(30);
        return cp.build();
    };
    match accounts.net_income {
        Some(income) if income > 0.0 => {
            cp.award(0.4, "positive net income");
        }
        Some(_) => {
            cp.note("net loss");
        }
        None => {
            cp.absent("net income");
        }
    }
    match accounts.equity {
        Some(equity) if equity > 0.0 => {
            cp.award(0.3, "positive equity");
        }
        Some(_) => {
            cp.note("negative equity");
        }
        None => {
            cp.absent("equity");
        }
    }
    match accounts.revenue {
        Some(revenue) if revenue >= input.project_total() * 2.0 => {
            cp.award(0.1, "revenue covers project size");
        }
        Some(_) => {
            cp.note("project large relative to revenue");
        }
        None => {
            cp.absent("revenue");
        }
    }
    cp.confidence(70);
    cp.build()
}

fn company_maturity(input: &EvaluationInput<'_>) -> ControlPointScore {
    let mut cp = ControlPointBuilder::new("company_maturity", 20.0);
    let created = input
        .company()
        .and_then(|c| c.legal_status_details.as_ref())
        .and_then(|s| s.creation_date);

    match (created, input.reference_date) {
        (Some(created), Some(reference)) => {
            let years = ((reference - created).num_days() as f64 / 365.25).max(0.0);
            cp.award(
                ladder_share(years, MATURITY_LADDER),
                format!("company age {years:.1} years"),
            )
            .confidence(90);
        }
        (Some(_), None) => {
            cp.credit(0.5)
                .found("creation date")
                .absent("reference date")
                .confidence(40);
        }
        (None, _) => {
            cp.credit(0.4).absent("creation date").confidence(30);
        }
    }
    cp.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        CompanyData, EnrichmentBundle, FinancialScore, Profile, Quote, Reputation,
        ScoringContext,
    };
    use chrono::NaiveDate;

    fn context() -> ScoringContext {
        ScoringContext::new(Profile::B2C, "renovation", 12_000.0)
            .with_evaluation_date(NaiveDate::from_ymd_opt(2025, 6, 1).expect("valid date"))
    }

    fn with_company(company: CompanyData) -> EnrichmentBundle {
        EnrichmentBundle {
            company: Some(company),
            ..Default::default()
        }
    }

    #[test]
    fn test_budget_is_200() {
        let axis = QualityAxis.evaluate(&Quote::default(), &EnrichmentBundle::default(), &context());
        let declared: f64 = axis.sub_criteria.iter().map(|s| s.max_points).sum();
        assert!((declared - 200.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_poor_rating_alert_needs_enough_reviews() {
        let few = with_company(CompanyData {
            reputation: Some(Reputation {
                average_rating: Some(2.1),
                review_count: 3,
                complaint_count: 0,
            }),
            ..Default::default()
        });
        let axis = QualityAxis.evaluate(&Quote::default(), &few, &context());
        assert!(axis
            .alerts
            .iter()
            .all(|a| a.control_point_id.as_deref() != Some("customer_rating")));

        let many = with_company(CompanyData {
            reputation: Some(Reputation {
                average_rating: Some(2.1),
                review_count: 40,
                complaint_count: 0,
            }),
            ..Default::default()
        });
        let axis = QualityAxis.evaluate(&Quote::default(), &many, &context());
        assert!(axis
            .alerts
            .iter()
            .any(|a| a.control_point_id.as_deref() == Some("customer_rating")));
    }

    #[test]
    fn test_expired_certifications_minor_alert() {
        let enrichment = EnrichmentBundle {
            certifications: vec![Certification {
                name: "RGE Qualibat".to_string(),
                valid_until: NaiveDate::from_ymd_opt(2024, 1, 1),
                ..Default::default()
            }],
            ..Default::default()
        };
        let axis = QualityAxis.evaluate(&Quote::default(), &enrichment, &context());
        let alert = axis
            .alerts
            .iter()
            .find(|a| a.control_point_id.as_deref() == Some("valid_certifications"))
            .expect("expired alert");
        assert_eq!(alert.severity, Severity::Minor);
    }

    #[test]
    fn test_trade_qualification_match() {
        let enrichment = EnrichmentBundle {
            certifications: vec![Certification {
                name: "Qualifelec".to_string(),
                is_valid: Some(true),
                ..Default::default()
            }],
            ..Default::default()
        };
        let context = context().with_trade_type("électricité");
        let axis = QualityAxis.evaluate(&Quote::default(), &enrichment, &context);
        let cp = axis
            .control_point("trade_relevant_qualification")
            .expect("control point");
        assert!((cp.score - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_financial_score_scales_linearly() {
        let enrichment = with_company(CompanyData {
            financial_score: Some(FinancialScore {
                score: 50.0,
                rating: None,
            }),
            ..Default::default()
        });
        let axis = QualityAxis.evaluate(&Quote::default(), &enrichment, &context());
        let cp = axis.control_point("financial_score").expect("control point");
        assert!((cp.score - 15.0).abs() < 1e-9);
    }
}
