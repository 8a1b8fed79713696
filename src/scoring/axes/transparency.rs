//! Transparency axis: who issued the quote, how clear it is, how it is paid.

use super::{AxisReport, AxisStrategy, EvaluationInput};
use crate::model::Profile;
use crate::scoring::rules::{
    count_share, matched_signals, ControlPointBuilder, PAYMENT_SCHEDULE_GROUPS,
    REGISTRATION_KEYWORDS, VALIDITY_KEYWORDS,
};
use crate::scoring::types::{Alert, AxisId, AxisScore, ControlPointScore, Severity};

const PAYMENT: &str = "payment_terms";

/// Deposit ceiling above which the customer carries most of the risk.
const MAX_DEPOSIT: f64 = 50.0;
/// Customary deposit ceiling for private customers.
const CONSUMER_DEPOSIT: f64 = 30.0;

/// Clarity and completeness of the commercial information.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransparencyAxis;

impl AxisStrategy for TransparencyAxis {
    fn axis_id(&self) -> AxisId {
        AxisId::Transparency
    }

    fn evaluate_input(&self, input: &EvaluationInput<'_>) -> AxisScore {
        let mut report = AxisReport::new(AxisId::Transparency);

        report.criterion(
            "company_identification",
            "Ask for the full company identification (address, contacts, registration numbers)",
            vec![contact_details(input), registration_numbers(input)],
        );
        report.criterion(
            "document_clarity",
            "Ask for a dated quote with an itemized breakdown",
            vec![quote_dating(input), line_item_breakdown(input)],
        );
        let payment = vec![payment_schedule(input), deposit_level(input, &mut report)];
        report.criterion(
            PAYMENT,
            "Ask for a written payment schedule tied to the progress of the works",
            payment,
        );

        report.finish()
    }
}

fn contact_details(input: &EvaluationInput<'_>) -> ControlPointScore {
    let mut cp = ControlPointBuilder::new("contact_details", 20.0);
    let issuer = &input.quote.extracted_data.issuer;
    let present = |field: &Option<String>| field.as_deref().is_some_and(|v| !v.trim().is_empty());

    let signals = [
        ("company name", present(&issuer.name)),
        ("address", present(&issuer.address) || input.text.has_postcode()),
        ("phone", present(&issuer.phone) || input.text.has_phone()),
        ("email", present(&issuer.email) || input.text.has_email()),
    ];
    for (signal, found) in signals {
        if found {
            cp.award(0.25, signal);
        } else {
            cp.absent(signal);
        }
    }
    cp.build()
}

fn registration_numbers(input: &EvaluationInput<'_>) -> ControlPointScore {
    let mut cp = ControlPointBuilder::new("registration_numbers", 20.0);
    let siret_on_quote = input.quote.extracted_data.legal_mentions.siret.is_some()
        || input.text.find_siret().is_some();
    if siret_on_quote {
        cp.award(0.5, "SIRET");
    } else {
        cp.absent("SIRET");
    }
    if input.text.has_vat_number() {
        cp.award(0.25, "intra-community VAT number");
    } else {
        cp.absent("intra-community VAT number");
    }
    match input.text.first_match(REGISTRATION_KEYWORDS) {
        Some(keyword) => {
            cp.award(0.25, format!("trade register (\"{keyword}\")"));
        }
        None => {
            cp.absent("trade register");
        }
    }
    cp.build()
}

fn quote_dating(input: &EvaluationInput<'_>) -> ControlPointScore {
    let mut cp = ControlPointBuilder::new("quote_dating", 15.0);
    let dates = &input.quote.extracted_data.dates;
    if dates.issue_date.is_some() {
        cp.award(0.55, "issue date");
    } else {
        cp.absent("issue date");
    }
    if dates.validity_date.is_some() {
        cp.award(0.45, "validity date");
    } else if let Some(keyword) = input.text.first_match(VALIDITY_KEYWORDS) {
        cp.award(0.45, format!("validity period (\"{keyword}\")"));
    } else {
        cp.absent("validity period");
    }
    cp.build()
}

fn line_item_breakdown(input: &EvaluationInput<'_>) -> ControlPointScore {
    let mut cp = ControlPointBuilder::new("line_item_breakdown", 20.0);
    let items = &input.quote.extracted_data.line_items;
    if items.is_empty() {
        cp.absent("line items");
        return cp.build();
    }
    let count_part = match items.len() {
        5.. => 0.5,
        3..=4 => 0.35,
        _ => 0.2,
    };
    let detailed = items.iter().filter(|item| item.is_detailed()).count();
    cp.award(count_part, format!("{} line items", items.len()))
        .award(
            0.5 * detailed as f64 / items.len() as f64,
            format!("{detailed} detailed lines"),
        );
    cp.build()
}

fn payment_schedule(input: &EvaluationInput<'_>) -> ControlPointScore {
    let mut cp = ControlPointBuilder::new("payment_schedule", 15.0);
    let matched = matched_signals(&input.text, PAYMENT_SCHEDULE_GROUPS);
    let has_terms = input
        .quote
        .extracted_data
        .payment_terms
        .as_deref()
        .is_some_and(|t| !t.trim().is_empty());

    if matched.is_empty() {
        if has_terms {
            cp.award(0.4, "payment terms").absent("payment milestones");
        } else {
            cp.absent("payment terms");
        }
    } else {
        cp.award(
            count_share(matched.len(), &[0.0, 0.65, 1.0]),
            format!("payment milestones: {}", matched.join(", ")),
        );
    }
    cp.build()
}

fn deposit_level(input: &EvaluationInput<'_>, report: &mut AxisReport) -> ControlPointScore {
    let mut cp = ControlPointBuilder::new("deposit_level", 10.0);
    let Some(deposit) = input.text.deposit_percentage() else {
        cp.credit(0.7).absent("deposit percentage").confidence(50);
        return cp.build();
    };

    let found = format!("deposit {deposit:.0}%");
    if deposit > MAX_DEPOSIT {
        cp.found(found);
        report.alert(
            Alert::new(
                Severity::Major,
                AxisId::Transparency,
                format!("Deposit of {deposit:.0}% requested before works start"),
                "Most of the price is paid before any work is delivered",
            )
            .at(PAYMENT, "deposit_level")
            .recommending("Negotiate a deposit of 30% at most"),
        );
    } else if deposit > CONSUMER_DEPOSIT {
        cp.award(0.5, found);
        if input.context.profile == Profile::B2C {
            report.alert(
                Alert::new(
                    Severity::Minor,
                    AxisId::Transparency,
                    format!("Deposit of {deposit:.0}% is above the customary 30%"),
                    "A large share of the price is paid upfront",
                )
                .at(PAYMENT, "deposit_level"),
            );
        }
    } else {
        cp.award(1.0, found);
    }
    cp.build()
}
