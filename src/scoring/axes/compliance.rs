//! Compliance axis: company identity, insurance, regulation, legal mentions.

use super::{AxisReport, AxisStrategy, EvaluationInput};
use crate::model::Profile;
use crate::scoring::rules::{
    ControlPointBuilder, KeywordRule, CIVIL_LIABILITY_KEYWORDS, COVERAGE_AREA_KEYWORDS,
    DECENNIAL_KEYWORDS, INSURER_KEYWORDS, LATE_PENALTY_KEYWORDS, LEGAL_FORM_KEYWORDS,
    MEDIATOR_KEYWORDS, RECOVERY_INDEMNITY_KEYWORDS, VAT_EXEMPTION_KEYWORDS, WITHDRAWAL_KEYWORDS,
};
use crate::scoring::text::{digits_only, is_valid_siret, normalize_text};
use crate::scoring::types::{Alert, AxisId, AxisScore, ControlPointScore, Severity};

const IDENTITY: &str = "company_identity";
const INSURANCE: &str = "insurance";

const B2C_MENTIONS: &[KeywordRule] = &[
    KeywordRule {
        signal: "withdrawal right",
        keywords: WITHDRAWAL_KEYWORDS,
        share: 0.52,
    },
    KeywordRule {
        signal: "consumer mediator",
        keywords: MEDIATOR_KEYWORDS,
        share: 0.48,
    },
];

const B2B_MENTIONS: &[KeywordRule] = &[
    KeywordRule {
        signal: "late-payment penalties",
        keywords: LATE_PENALTY_KEYWORDS,
        share: 0.52,
    },
    KeywordRule {
        signal: "recovery indemnity",
        keywords: RECOVERY_INDEMNITY_KEYWORDS,
        share: 0.48,
    },
];

/// Legal and regulatory compliance of the quote and the company.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComplianceAxis;

impl AxisStrategy for ComplianceAxis {
    fn axis_id(&self) -> AxisId {
        AxisId::Compliance
    }

    fn evaluate_input(&self, input: &EvaluationInput<'_>) -> AxisScore {
        let mut report = AxisReport::new(AxisId::Compliance);

        let identity = vec![
            siret_valid(input, &mut report),
            company_active(input, &mut report),
            legal_form_declared(input),
        ];
        report.criterion(
            IDENTITY,
            "Ask for the company's SIRET and check it against the company registry",
            identity,
        );

        let insurance = vec![
            decennial_insurance(input, &mut report),
            civil_liability(input),
            insurer_details(input),
        ];
        report.criterion(
            INSURANCE,
            "Request the insurance certificates (decennial and civil liability) before signing",
            insurance,
        );

        report.criterion(
            "regulatory_rules",
            "Ask the contractor to reference the applicable rules and DTU standards",
            vec![mandatory_rules_covered(input), dtu_references(input)],
        );

        report.criterion(
            "mandatory_mentions",
            "Ask for a quote carrying all mandatory legal mentions",
            vec![profile_mentions(input), vat_mentions(input)],
        );

        report.finish()
    }
}

fn siret_valid(input: &EvaluationInput<'_>, report: &mut AxisReport) -> ControlPointScore {
    let mut cp = ControlPointBuilder::new("siret_valid", 35.0);
    let declared = input
        .quote
        .extracted_data
        .legal_mentions
        .siret
        .clone()
        .or_else(|| input.text.find_siret());
    let registry = input.company().and_then(|c| c.siret.as_deref());

    match declared {
        Some(siret) if is_valid_siret(&siret) => {
            cp.award(0.55, "valid SIRET on quote");
            match registry {
                Some(known) if digits_only(known) == digits_only(&siret) => {
                    cp.award(0.45, "SIRET matches registry").confidence(95);
                }
                Some(_) => {
                    cp.absent("registry match").confidence(90);
                    report.alert(
                        Alert::new(
                            Severity::Major,
                            AxisId::Compliance,
                            "SIRET on the quote differs from the company registry record",
                            "The quote may not come from the company it claims to",
                        )
                        .at(IDENTITY, "siret_valid")
                        .recommending("Check the company identity on the official registry"),
                    );
                }
                None => {
                    cp.credit(0.15).absent("registry record").confidence(60);
                }
            }
        }
        Some(siret) => {
            cp.absent("valid SIRET on quote")
                .note(format!("\"{siret}\" fails the SIRET checksum"))
                .confidence(90);
            report.alert(
                Alert::new(
                    Severity::Major,
                    AxisId::Compliance,
                    "SIRET printed on the quote is invalid",
                    "The company cannot be identified reliably",
                )
                .at(IDENTITY, "siret_valid")
                .recommending("Ask the contractor for a valid SIRET"),
            );
        }
        None => match registry {
            Some(known) if is_valid_siret(known) => {
                cp.award(0.3, "valid SIRET in registry")
                    .absent("SIRET on quote")
                    .confidence(70);
            }
            _ => {
                cp.absent("SIRET on quote").absent("registry record").confidence(50);
            }
        },
    }
    cp.build()
}

fn company_active(input: &EvaluationInput<'_>, report: &mut AxisReport) -> ControlPointScore {
    let mut cp = ControlPointBuilder::new("company_active", 30.0);
    match input.company().and_then(|c| c.legal_status_details.as_ref()) {
        Some(status) if status.is_active && !status.collective_proceedings => {
            cp.award(1.0, "active registry status").confidence(95);
        }
        Some(status) => {
            let reason = if status.is_active {
                "Company is under collective proceedings"
            } else {
                "Company is not active in the registry"
            };
            cp.note(reason.to_lowercase()).confidence(95);
            report.alert(
                Alert::new(
                    Severity::Critical,
                    AxisId::Compliance,
                    reason,
                    "Deposits and guarantees may be lost if the company stops trading",
                )
                .at(IDENTITY, "company_active")
                .recommending("Do not pay any deposit before the company's situation is clarified"),
            );
        }
        None if input.company().is_some() => {
            cp.credit(0.4).absent("registry status details").confidence(50);
        }
        None => {
            cp.absent("company record").confidence(30);
        }
    }
    cp.build()
}

fn legal_form_declared(input: &EvaluationInput<'_>) -> ControlPointScore {
    let mut cp = ControlPointBuilder::new("legal_form_declared", 25.0);
    match input.company().and_then(|c| c.legal_status.as_deref()) {
        Some(form) if !form.trim().is_empty() => {
            cp.award(0.6, format!("registry legal form {form}"));
        }
        _ => {
            cp.absent("registry legal form").cap_confidence(60);
        }
    }
    match input.text.first_match(LEGAL_FORM_KEYWORDS) {
        Some(keyword) => {
            cp.award(0.4, format!("legal form on quote (\"{keyword}\")"));
        }
        None => {
            cp.absent("legal form on quote");
        }
    }
    cp.build()
}

fn decennial_insurance(input: &EvaluationInput<'_>, report: &mut AxisReport) -> ControlPointScore {
    let mut cp = ControlPointBuilder::new("decennial_insurance", 55.0);
    let mentions = &input.quote.extracted_data.legal_mentions;
    if mentions.has_decennial_insurance {
        cp.award(1.0, "decennial insurance flag").confidence(90);
    } else if let Some(keyword) = input.text.first_match(DECENNIAL_KEYWORDS) {
        cp.award(1.0, format!("decennial insurance (\"{keyword}\")"))
            .confidence(80);
    } else if input.requires_decennial_insurance() {
        cp.absent("decennial insurance")
            .note("mandatory for these works")
            .confidence(85);
        report.alert(
            Alert::new(
                Severity::Critical,
                AxisId::Compliance,
                "No decennial insurance on a quote for works that require it",
                "Structural defects within ten years would not be covered",
            )
            .at(INSURANCE, "decennial_insurance")
            .recommending("Require the decennial insurance certificate before signing"),
        );
    } else {
        cp.credit(0.65)
            .absent("decennial insurance")
            .note("not mandatory for these works")
            .confidence(60);
    }
    cp.build()
}

fn civil_liability(input: &EvaluationInput<'_>) -> ControlPointScore {
    let mut cp = ControlPointBuilder::new("civil_liability", 25.0);
    if let Some(keyword) = input.text.first_match(CIVIL_LIABILITY_KEYWORDS) {
        cp.award(1.0, format!("civil liability (\"{keyword}\")"));
    } else if input.quote.extracted_data.legal_mentions.has_insurance {
        cp.award(0.5, "generic insurance flag")
            .absent("civil liability wording")
            .confidence(60);
    } else {
        cp.absent("civil liability insurance").confidence(75);
    }
    cp.build()
}

fn insurer_details(input: &EvaluationInput<'_>) -> ControlPointScore {
    let mut cp = ControlPointBuilder::new("insurer_details", 20.0);
    let rules = [
        KeywordRule {
            signal: "insurer named",
            keywords: INSURER_KEYWORDS,
            share: 0.5,
        },
        KeywordRule {
            signal: "coverage area",
            keywords: COVERAGE_AREA_KEYWORDS,
            share: 0.2,
        },
    ];
    cp.keyword_rules(&input.text, &rules);
    if input.text.has_policy_number() {
        cp.award(0.3, "policy number");
    } else {
        cp.absent("policy number");
    }
    cp.confidence(75);
    cp.build()
}

fn mandatory_rules_covered(input: &EvaluationInput<'_>) -> ControlPointScore {
    let mut cp = ControlPointBuilder::new("mandatory_rules_covered", 40.0);
    let Some(compliance) = &input.enrichment.compliance_data else {
        cp.credit(0.5).absent("applicable rules").confidence(40);
        return cp.build();
    };

    let mandatory: Vec<_> = compliance
        .applicable_rules
        .iter()
        .filter(|rule| rule.mandatory)
        .collect();
    if mandatory.is_empty() {
        cp.credit(1.0).note("no mandatory rule applies").confidence(70);
        return cp.build();
    }

    let mut covered = 0usize;
    for rule in &mandatory {
        let hit = rule
            .keywords
            .iter()
            .any(|k| input.text.contains(&normalize_text(k)));
        if hit {
            covered += 1;
            cp.found(rule.label.clone());
        } else {
            cp.absent(rule.label.clone());
        }
    }
    cp.credit(covered as f64 / mandatory.len() as f64)
        .note(format!("{covered}/{} mandatory rules covered", mandatory.len()))
        .confidence(85);
    cp.build()
}

fn dtu_references(input: &EvaluationInput<'_>) -> ControlPointScore {
    let mut cp = ControlPointBuilder::new("dtu_references", 30.0);
    if input.text.has_dtu_code() {
        cp.award(0.5, "DTU reference");
    } else {
        cp.absent("DTU reference");
    }

    if input.enrichment.dtus.is_empty() {
        cp.credit(0.25).absent("applicable DTU list").cap_confidence(50);
        return cp.build();
    }
    let relevant = input.enrichment.dtus.iter().find(|dtu| {
        input.text.contains(&normalize_text(&dtu.code))
            || dtu
                .keywords
                .iter()
                .any(|k| input.text.contains(&normalize_text(k)))
    });
    match relevant {
        Some(dtu) => {
            cp.award(0.5, format!("applicable {} addressed", dtu.code));
        }
        None => {
            cp.absent("applicable DTU addressed");
        }
    }
    cp.confidence(80);
    cp.build()
}

fn profile_mentions(input: &EvaluationInput<'_>) -> ControlPointScore {
    let mut cp = ControlPointBuilder::new("profile_mentions", 25.0);
    match input.context.profile {
        Profile::B2C => {
            if input.quote.extracted_data.legal_mentions.has_withdrawal_right {
                cp.award(B2C_MENTIONS[0].share, "withdrawal right flag");
                cp.keyword_rules(&input.text, &B2C_MENTIONS[1..]);
            } else {
                cp.keyword_rules(&input.text, B2C_MENTIONS);
            }
        }
        Profile::B2B => {
            cp.keyword_rules(&input.text, B2B_MENTIONS);
        }
    }
    cp.confidence(80);
    cp.build()
}

fn vat_mentions(input: &EvaluationInput<'_>) -> ControlPointScore {
    let mut cp = ControlPointBuilder::new("vat_mentions", 15.0);
    if let Some(keyword) = input.text.first_match(VAT_EXEMPTION_KEYWORDS) {
        cp.award(1.0, format!("VAT exemption (\"{keyword}\")"));
        return cp.build();
    }
    let totals = &input.quote.extracted_data.totals;
    if totals.vat_rate.is_some() || totals.total_vat.is_some() {
        cp.award(0.55, "VAT rate or amount");
    } else {
        cp.absent("VAT rate or amount");
    }
    if totals.total_ht.is_some() && totals.total_ttc.is_some() {
        cp.award(0.25, "totals excluding and including VAT");
    } else {
        cp.absent("totals excluding and including VAT");
    }
    if input.text.contains("tva") {
        cp.award(0.2, "VAT wording");
    } else {
        cp.absent("VAT wording");
    }
    cp.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        CompanyData, EnrichmentBundle, LegalStatusDetails, Quote, ScoringContext,
    };

    fn context() -> ScoringContext {
        ScoringContext::new(Profile::B2C, "renovation", 12_000.0)
    }

    #[test]
    fn test_budget_is_300() {
        let axis =
            ComplianceAxis.evaluate(&Quote::default(), &EnrichmentBundle::default(), &context());
        let declared: f64 = axis.sub_criteria.iter().map(|s| s.max_points).sum();
        assert!((declared - 300.0).abs() < f64::EPSILON);
        assert!((axis.max_points - 300.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_missing_decennial_is_critical_for_renovation() {
        let axis =
            ComplianceAxis.evaluate(&Quote::default(), &EnrichmentBundle::default(), &context());
        assert!(axis.alerts.iter().any(|a| {
            a.severity == Severity::Critical
                && a.control_point_id.as_deref() == Some("decennial_insurance")
        }));
    }

    #[test]
    fn test_inactive_company_is_critical() {
        let enrichment = EnrichmentBundle {
            company: Some(CompanyData {
                legal_status_details: Some(LegalStatusDetails {
                    is_active: false,
                    ..Default::default()
                }),
                ..Default::default()
            }),
            ..Default::default()
        };
        let axis = ComplianceAxis.evaluate(&Quote::default(), &enrichment, &context());
        let cp = axis.control_point("company_active").expect("control point");
        assert!(cp.score.abs() < f64::EPSILON);
        assert!(axis
            .alerts
            .iter()
            .any(|a| a.control_point_id.as_deref() == Some("company_active")));
    }

    #[test]
    fn test_siret_mismatch_is_major() {
        let mut quote = Quote::default();
        quote.extracted_data.legal_mentions.siret = Some("73282932000074".to_string());
        let enrichment = EnrichmentBundle {
            company: Some(CompanyData {
                siret: Some("44306184100047".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let axis = ComplianceAxis.evaluate(&quote, &enrichment, &context());
        let alert = axis
            .alerts
            .iter()
            .find(|a| a.control_point_id.as_deref() == Some("siret_valid"))
            .expect("siret alert");
        assert_eq!(alert.severity, Severity::Major);
    }

    #[test]
    fn test_b2b_mentions_use_payment_penalties() {
        let mut quote = Quote::default();
        quote.extracted_data.free_text = Some(
            "Pénalités de retard au taux légal. Indemnité forfaitaire de recouvrement : 40 €"
                .to_string(),
        );
        let context = ScoringContext::new(Profile::B2B, "renovation", 12_000.0);
        let axis = ComplianceAxis.evaluate(&quote, &EnrichmentBundle::default(), &context);
        let cp = axis.control_point("profile_mentions").expect("control point");
        assert!((cp.score - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_entry_airlock_earns_no_legal_form_credit() {
        let mut quote = Quote::default();
        quote.extracted_data.line_items = vec![crate::model::LineItem {
            description: "Création d'un sas d'entrée vitré".to_string(),
            ..Default::default()
        }];
        let axis = ComplianceAxis.evaluate(&quote, &EnrichmentBundle::default(), &context());
        let cp = axis.control_point("legal_form_declared").expect("control point");
        assert!(cp.score.abs() < f64::EPSILON);

        quote.extracted_data.free_text = Some("Dupont SAS au capital de 8 000 €".to_string());
        let axis = ComplianceAxis.evaluate(&quote, &EnrichmentBundle::default(), &context());
        let cp = axis.control_point("legal_form_declared").expect("control point");
        assert!((cp.score - 10.0).abs() < 1e-9);
    }
}
