//! Structured construction quote, as materialized by the extraction layer.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A construction-work price proposal being evaluated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Quote {
    /// Caller-side identifier, echoed in logs only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Project type (e.g. "renovation", "construction", "maintenance")
    pub project_type: String,
    /// Trade type (e.g. "plomberie", "toiture")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trade_type: Option<String>,
    /// Total amount of the quote, VAT included, in euros
    pub total_amount: f64,
    /// Everything the extraction layer pulled out of the document
    pub extracted_data: ExtractedData,
}

/// Structured content extracted from the quote document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtractedData {
    /// Priced lines of the quote
    pub line_items: Vec<LineItem>,
    /// Dates declared on the document
    pub dates: DeclaredDates,
    /// Totals and VAT declared on the document
    pub totals: DeclaredTotals,
    /// Legal mentions (insurance, guarantees, registration numbers)
    pub legal_mentions: LegalMentions,
    /// Payment terms as written on the document
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_terms: Option<String>,
    /// Company details as printed on the quote
    pub issuer: IssuerDetails,
    /// Any remaining free text (notes, conditions)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub free_text: Option<String>,
}

/// A single priced line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LineItem {
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    /// Unit of measure ("m2", "u", "ml", "forfait")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Line total excluding VAT, as printed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
}

impl LineItem {
    /// Whether the line carries both a unit price and a quantity.
    #[must_use]
    pub fn is_detailed(&self) -> bool {
        matches!((self.unit_price, self.quantity), (Some(p), Some(q)) if p > 0.0 && q > 0.0)
    }

    /// Unit price × quantity, when both are known.
    #[must_use]
    pub fn computed_total(&self) -> Option<f64> {
        match (self.unit_price, self.quantity) {
            (Some(price), Some(qty)) => Some(price * qty),
            _ => None,
        }
    }
}

/// Dates declared on the quote.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeclaredDates {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validity_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    /// Announced duration of the works, in calendar days
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_days: Option<u32>,
}

impl DeclaredDates {
    /// Duration in days, from the explicit figure or from start/end dates.
    #[must_use]
    pub fn effective_duration_days(&self) -> Option<u32> {
        if let Some(days) = self.duration_days {
            return Some(days);
        }
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) if end >= start => {
                u32::try_from((end - start).num_days()).ok()
            }
            _ => None,
        }
    }

    /// Planned completion date, from the end date or start + duration.
    #[must_use]
    pub fn planned_end(&self) -> Option<NaiveDate> {
        self.end_date.or_else(|| {
            let start = self.start_date?;
            let days = self.duration_days?;
            start.checked_add_days(chrono::Days::new(u64::from(days)))
        })
    }
}

/// Totals and VAT as printed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeclaredTotals {
    /// Total excluding VAT
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_ht: Option<f64>,
    /// VAT amount
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_vat: Option<f64>,
    /// Total including VAT
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_ttc: Option<f64>,
    /// VAT rate as a percentage (e.g. 10.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vat_rate: Option<f64>,
}

/// Legal mentions flagged by extraction plus their raw text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LegalMentions {
    pub has_insurance: bool,
    pub has_decennial_insurance: bool,
    pub has_guarantee: bool,
    pub has_withdrawal_right: bool,
    /// SIRET as printed on the quote
    #[serde(skip_serializing_if = "Option::is_none")]
    pub siret: Option<String>,
    /// Raw legal text blocks
    pub text: Vec<String>,
}

/// Issuer details as printed on the quote header.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IssuerDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_item_detail() {
        let item = LineItem {
            description: "Pose carrelage".to_string(),
            unit_price: Some(45.0),
            quantity: Some(20.0),
            ..Default::default()
        };
        assert!(item.is_detailed());
        assert_eq!(item.computed_total(), Some(900.0));

        let lump = LineItem {
            description: "Forfait".to_string(),
            unit_price: Some(1200.0),
            ..Default::default()
        };
        assert!(!lump.is_detailed());
        assert_eq!(lump.computed_total(), None);
    }

    #[test]
    fn test_duration_from_dates() {
        let dates = DeclaredDates {
            start_date: NaiveDate::from_ymd_opt(2025, 3, 1),
            end_date: NaiveDate::from_ymd_opt(2025, 3, 15),
            ..Default::default()
        };
        assert_eq!(dates.effective_duration_days(), Some(14));
    }

    #[test]
    fn test_planned_end_from_duration() {
        let dates = DeclaredDates {
            start_date: NaiveDate::from_ymd_opt(2025, 3, 1),
            duration_days: Some(10),
            ..Default::default()
        };
        assert_eq!(dates.planned_end(), NaiveDate::from_ymd_opt(2025, 3, 11));
    }

    #[test]
    fn test_quote_deserializes_camel_case() {
        let quote: Quote = serde_json::from_str(
            r#"{"projectType":"renovation","totalAmount":12000.0,
                "extractedData":{"lineItems":[{"description":"Peinture","unitPrice":25.0,"quantity":40.0}]}}"#,
        )
        .expect("valid quote json");
        assert_eq!(quote.project_type, "renovation");
        assert_eq!(quote.extracted_data.line_items.len(), 1);
        assert!(quote.trade_type.is_none());
    }
}
