//! Third-party facts gathered about the company, market and regulation.
//!
//! Every field is optional. Evaluators treat an absent sub-object as
//! "signal not available" and lower their confidence accordingly.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The enrichment bundle handed to the engine alongside a quote.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EnrichmentBundle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<CompanyData>,
    pub price_references: Vec<PriceReference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regional_data: Option<RegionalData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compliance_data: Option<ComplianceData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather_data: Option<WeatherData>,
    pub dtus: Vec<DtuReference>,
    pub certifications: Vec<Certification>,
}

impl EnrichmentBundle {
    /// Names of the enrichment sources actually present, in a fixed order.
    #[must_use]
    pub fn present_sources(&self) -> Vec<&'static str> {
        let mut sources = Vec::new();
        if let Some(company) = &self.company {
            sources.push("company");
            if company.has_financial_data() {
                sources.push("financial");
            }
            if company.legal_status_details.is_some() {
                sources.push("legalStatus");
            }
            if company.reputation.is_some() {
                sources.push("reputation");
            }
            if !company.qualifications.is_empty() {
                sources.push("qualifications");
            }
            if company.portfolio.is_some() {
                sources.push("portfolio");
            }
            if company.human_resources.is_some() {
                sources.push("humanResources");
            }
        }
        if !self.price_references.is_empty() {
            sources.push("priceReferences");
        }
        if self.regional_data.is_some() {
            sources.push("regional");
        }
        if self.compliance_data.is_some() {
            sources.push("compliance");
        }
        if self.weather_data.is_some() {
            sources.push("weather");
        }
        if !self.dtus.is_empty() {
            sources.push("dtu");
        }
        if !self.certifications.is_empty() {
            sources.push("certifications");
        }
        sources
    }

    /// Company financial facts, if any were gathered.
    #[must_use]
    pub fn has_financial_data(&self) -> bool {
        self.company.as_ref().is_some_and(CompanyData::has_financial_data)
    }

    #[must_use]
    pub fn has_reputation(&self) -> bool {
        self.company.as_ref().is_some_and(|c| c.reputation.is_some())
    }

    #[must_use]
    pub fn has_legal_status_details(&self) -> bool {
        self.company
            .as_ref()
            .is_some_and(|c| c.legal_status_details.is_some())
    }

    /// Certifications from the bundle and the company's qualifications, merged.
    pub fn all_certifications(&self) -> impl Iterator<Item = &Certification> {
        self.certifications.iter().chain(
            self.company
                .iter()
                .flat_map(|company| company.qualifications.iter()),
        )
    }
}

/// Company registry record and its optional enrichments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompanyData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub siret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub siren: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Legal form ("SARL", "SAS", "EI", ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legal_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Declared activities (NAF labels or free text)
    pub activities: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub financial_data: Option<FinancialData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub financial_score: Option<FinancialScore>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legal_status_details: Option<LegalStatusDetails>,
    /// Trade qualifications (Qualibat, Qualifelec, RGE, ...)
    pub qualifications: Vec<Certification>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reputation: Option<Reputation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub portfolio: Option<Portfolio>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub human_resources: Option<HumanResources>,
}

impl CompanyData {
    #[must_use]
    pub fn has_financial_data(&self) -> bool {
        self.financial_data.is_some() || self.financial_score.is_some()
    }
}

/// Latest published accounts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FinancialData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revenue: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub net_income: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fiscal_year: Option<i32>,
}

/// Third-party financial risk score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FinancialScore {
    /// 0 (high risk) to 100 (very solid)
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<String>,
}

/// Registry status details.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LegalStatusDetails {
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<NaiveDate>,
    /// Receivership, safeguard or liquidation in progress
    pub collective_proceedings: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share_capital: Option<f64>,
}

/// Aggregated customer reviews.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Reputation {
    /// Average rating on a 0-5 scale
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_rating: Option<f64>,
    pub review_count: u32,
    pub complaint_count: u32,
}

/// Past work of the company.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Portfolio {
    pub completed_projects: u32,
    pub similar_projects: u32,
}

/// Staffing facts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HumanResources {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_count: Option<u32>,
    pub qualified_staff: u32,
}

/// A certification or trade qualification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Certification {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<NaiveDate>,
    /// Explicit validity flag from the issuing body, when provided
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_valid: Option<bool>,
}

impl Certification {
    /// Validity against a reference date.
    ///
    /// `None` means validity cannot be established (no flag, no usable date).
    #[must_use]
    pub fn validity_at(&self, reference: Option<NaiveDate>) -> Option<bool> {
        if self.is_valid == Some(false) {
            return Some(false);
        }
        match (self.valid_until, reference) {
            (Some(until), Some(date)) => Some(until >= date),
            _ => self.is_valid,
        }
    }
}

/// Market price benchmark for a kind of work.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PriceReference {
    /// What the benchmark prices ("pose carrelage sol", "peinture murs")
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p25: Option<f64>,
    pub median: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p75: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

impl PriceReference {
    /// Lower bound of the "normal" band (p25, else 80 % of the median).
    #[must_use]
    pub fn band_low(&self) -> f64 {
        self.p25.unwrap_or(self.median * 0.8)
    }

    /// Upper bound of the "normal" band (p75, else 120 % of the median).
    #[must_use]
    pub fn band_high(&self) -> f64 {
        self.p75.unwrap_or(self.median * 1.2)
    }

    /// Lowest plausible price (min, else 50 % of the median).
    #[must_use]
    pub fn floor(&self) -> f64 {
        self.min_price.unwrap_or(self.median * 0.5)
    }

    /// Highest plausible price (max, else 150 % of the median).
    #[must_use]
    pub fn ceiling(&self) -> f64 {
        self.max_price.unwrap_or(self.median * 1.5)
    }
}

/// Regional market statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegionalData {
    pub region: String,
    /// Regional price level relative to the national average (1.0 = average)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_index: Option<f64>,
    /// Average amount of comparable projects in the region
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_project_cost: Option<f64>,
    /// Typical duration of comparable projects, in days
    #[serde(skip_serializing_if = "Option::is_none")]
    pub typical_duration_days: Option<u32>,
}

/// Regulatory rules applicable to the project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ComplianceData {
    pub applicable_rules: Vec<ComplianceRule>,
    pub requires_decennial_insurance: bool,
}

/// One regulatory rule and the wording that evidences it on a quote.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ComplianceRule {
    pub id: String,
    pub label: String,
    pub keywords: Vec<String>,
    pub mandatory: bool,
}

/// Climate statistics for the site.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WeatherData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rainy_days_per_year: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frost_days_per_year: Option<f64>,
    /// Months (1-12) with elevated weather risk for outdoor work
    pub high_risk_months: Vec<u32>,
}

/// A unified technical document (DTU) relevant to the works.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DtuReference {
    /// e.g. "DTU 52.1"
    pub code: String,
    pub title: String,
    pub keywords: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_present_sources_empty_bundle() {
        assert!(EnrichmentBundle::default().present_sources().is_empty());
    }

    #[test]
    fn test_present_sources_order() {
        let bundle = EnrichmentBundle {
            company: Some(CompanyData {
                reputation: Some(Reputation::default()),
                financial_score: Some(FinancialScore {
                    score: 70.0,
                    rating: None,
                }),
                ..Default::default()
            }),
            regional_data: Some(RegionalData::default()),
            ..Default::default()
        };
        assert_eq!(
            bundle.present_sources(),
            vec!["company", "financial", "reputation", "regional"]
        );
    }

    #[test]
    fn test_certification_validity() {
        let reference = NaiveDate::from_ymd_opt(2025, 6, 1);
        let expired = Certification {
            name: "RGE".to_string(),
            valid_until: NaiveDate::from_ymd_opt(2024, 12, 31),
            ..Default::default()
        };
        assert_eq!(expired.validity_at(reference), Some(false));
        assert_eq!(expired.validity_at(None), None);

        let flagged = Certification {
            name: "Qualibat".to_string(),
            is_valid: Some(true),
            ..Default::default()
        };
        assert_eq!(flagged.validity_at(reference), Some(true));
    }

    #[test]
    fn test_price_reference_band_defaults() {
        let reference = PriceReference {
            label: "peinture".to_string(),
            median: 30.0,
            ..Default::default()
        };
        assert!((reference.band_low() - 24.0).abs() < 1e-9);
        assert!((reference.band_high() - 36.0).abs() < 1e-9);
        assert!((reference.ceiling() - 45.0).abs() < 1e-9);
    }
}
