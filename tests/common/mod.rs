//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use chrono::NaiveDate;
use quote_scorer::model::{
    CompanyData, DeclaredDates, DeclaredTotals, EnrichmentBundle, ExtractedData, FinancialData,
    FinancialScore, IssuerDetails, LegalMentions, LegalStatusDetails, LineItem, PriceReference,
    Profile, Quote, RegionalData, Reputation, ScoringContext, StatedNeed,
};

pub const SIRET: &str = "73282932000074";

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid fixture date")
}

fn line(description: &str, unit: &str, quantity: f64, unit_price: f64) -> LineItem {
    LineItem {
        description: description.to_string(),
        unit_price: Some(unit_price),
        quantity: Some(quantity),
        unit: Some(unit.to_string()),
        total: Some(unit_price * quantity),
    }
}

/// A 12 000 € bathroom renovation quote, 10 000 € before VAT.
pub fn bathroom_quote() -> Quote {
    Quote {
        id: Some("DEV-2025-0117".to_string()),
        project_type: "renovation".to_string(),
        trade_type: Some("plomberie".to_string()),
        total_amount: 12_000.0,
        extracted_data: ExtractedData {
            line_items: vec![
                line("Dépose de l'ancienne salle de bain", "forfait", 1.0, 900.0),
                line("Pose carrelage sol", "m2", 12.0, 55.0),
                line("Fourniture carrelage sol grès cérame", "m2", 12.0, 45.0),
                line("Plomberie douche à l'italienne, main d'oeuvre", "u", 1.0, 3800.0),
                line("Mise aux normes électricité salle de bain", "u", 1.0, 1600.0),
                line("Peinture murs et plafond", "m2", 50.0, 50.0),
            ],
            dates: DeclaredDates {
                issue_date: Some(date(2025, 3, 1)),
                validity_date: Some(date(2025, 4, 30)),
                start_date: Some(date(2025, 4, 14)),
                end_date: None,
                duration_days: Some(10),
            },
            totals: DeclaredTotals {
                total_ht: Some(10_000.0),
                total_vat: Some(2_000.0),
                total_ttc: Some(12_000.0),
                vat_rate: Some(20.0),
            },
            legal_mentions: LegalMentions {
                has_insurance: true,
                has_decennial_insurance: true,
                has_guarantee: true,
                has_withdrawal_right: true,
                siret: Some(SIRET.to_string()),
                text: vec![
                    "Assurance responsabilité civile professionnelle et garantie décennale \
                     souscrites auprès de la MAAF, police n° 123456"
                        .to_string(),
                    "Garantie de parfait achèvement et garantie biennale de bon fonctionnement"
                        .to_string(),
                    "Droit de rétractation de 14 jours".to_string(),
                ],
            },
            payment_terms: Some(
                "Acompte de 30 % à la commande, solde à la réception des travaux".to_string(),
            ),
            issuer: IssuerDetails {
                name: Some("Martin Rénovation SARL".to_string()),
                address: Some("12 rue des Lilas, 75011 Paris".to_string()),
                phone: Some("01 43 00 00 00".to_string()),
                email: Some("contact@martin-renovation.fr".to_string()),
            },
            free_text: Some("Nettoyage du chantier et évacuation des gravats inclus".to_string()),
        },
    }
}

pub fn b2c_context() -> ScoringContext {
    ScoringContext::new(Profile::B2C, "renovation", 12_000.0)
        .with_region("Île-de-France")
        .with_evaluation_date(date(2025, 3, 5))
}

pub fn stated_need() -> StatedNeed {
    StatedNeed {
        desired_work: vec![
            "douche à l'italienne".to_string(),
            "carrelage sol".to_string(),
            "peinture".to_string(),
        ],
        constraints: vec!["évacuation des gravats".to_string()],
        deadline: Some(date(2025, 5, 31)),
        budget_ceiling: Some(13_000.0),
    }
}

/// Only the company registry record.
pub fn registry_only_enrichment() -> EnrichmentBundle {
    EnrichmentBundle {
        company: Some(CompanyData {
            siret: Some(SIRET.to_string()),
            siren: Some(SIRET[..9].to_string()),
            name: Some("Martin Rénovation SARL".to_string()),
            legal_status: Some("SARL".to_string()),
            legal_status_details: Some(LegalStatusDetails {
                is_active: true,
                creation_date: Some(date(2012, 5, 10)),
                collective_proceedings: false,
                share_capital: Some(10_000.0),
            }),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Registry record plus financials, reviews and market prices.
pub fn rich_enrichment() -> EnrichmentBundle {
    let mut bundle = registry_only_enrichment();
    if let Some(company) = bundle.company.as_mut() {
        company.financial_data = Some(FinancialData {
            revenue: Some(850_000.0),
            net_income: Some(42_000.0),
            equity: Some(120_000.0),
            fiscal_year: Some(2023),
        });
        company.financial_score = Some(FinancialScore {
            score: 78.0,
            rating: Some("B".to_string()),
        });
        company.reputation = Some(Reputation {
            average_rating: Some(4.6),
            review_count: 87,
            complaint_count: 1,
        });
    }
    bundle.price_references = vec![PriceReference {
        label: "pose carrelage sol".to_string(),
        unit: Some("m2".to_string()),
        median: 50.0,
        ..Default::default()
    }];
    bundle.regional_data = Some(RegionalData {
        region: "Île-de-France".to_string(),
        price_index: Some(1.12),
        average_project_cost: Some(11_500.0),
        typical_duration_days: None,
    });
    bundle
}
