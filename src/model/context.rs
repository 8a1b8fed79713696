//! Caller context that drives weighting and profile-specific checks.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{Result, ScoringError};

/// Caller profile.
///
/// Serialized as `"B2C"`/`"B2B"`; read with the same spellings as
/// [`FromStr`] accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Profile {
    /// Private individual commissioning works
    B2C,
    /// Business commissioning works
    B2B,
}

impl Profile {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::B2C => "B2C",
            Self::B2B => "B2B",
        }
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Profile {
    type Err = ScoringError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "b2c" | "consumer" | "particulier" => Ok(Self::B2C),
            "b2b" | "business" | "professionnel" => Ok(Self::B2B),
            _ => Err(ScoringError::unknown_profile(s)),
        }
    }
}

impl TryFrom<String> for Profile {
    type Error = ScoringError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// Project amount band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AmountBand {
    /// Under 5 000 €
    Small,
    /// 5 000 € to 20 000 €
    Medium,
    /// 20 000 € to 100 000 €
    Large,
    /// 100 000 € and above
    Major,
}

impl AmountBand {
    /// Band for a quote total.
    #[must_use]
    pub fn from_amount(amount: f64) -> Self {
        if amount < 5_000.0 {
            Self::Small
        } else if amount < 20_000.0 {
            Self::Medium
        } else if amount < 100_000.0 {
            Self::Large
        } else {
            Self::Major
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
            Self::Major => "major",
        }
    }

    /// Smallest workforce considered able to deliver a project of this size.
    #[must_use]
    pub const fn minimum_workforce(&self) -> u32 {
        match self {
            Self::Small => 1,
            Self::Medium => 2,
            Self::Large => 4,
            Self::Major => 10,
        }
    }

    /// Plausible duration range in days when no regional statistic exists.
    #[must_use]
    pub const fn typical_duration_days(&self) -> u32 {
        match self {
            Self::Small => 5,
            Self::Medium => 15,
            Self::Large => 45,
            Self::Major => 120,
        }
    }
}

/// What the customer asked for, used by the request/quote coherence axis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatedNeed {
    /// Works requested, one entry per item ("remplacement chaudière")
    pub desired_work: Vec<String>,
    /// Constraints the quote must honour ("travaux en site occupé")
    pub constraints: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<NaiveDate>,
    /// Maximum budget, VAT included
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget_ceiling: Option<f64>,
}

/// Scoring context supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringContext {
    pub profile: Profile,
    pub project_type: String,
    pub project_amount_band: AmountBand,
    #[serde(default)]
    pub region: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trade_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stated_need: Option<StatedNeed>,
    /// Date the evaluation is anchored to; keeps date checks reproducible
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation_date: Option<NaiveDate>,
}

impl ScoringContext {
    /// Minimal context for a profile and project, band derived from the amount.
    pub fn new(profile: Profile, project_type: impl Into<String>, amount: f64) -> Self {
        Self {
            profile,
            project_type: project_type.into(),
            project_amount_band: AmountBand::from_amount(amount),
            region: String::new(),
            trade_type: None,
            stated_need: None,
            evaluation_date: None,
        }
    }

    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    #[must_use]
    pub fn with_trade_type(mut self, trade_type: impl Into<String>) -> Self {
        self.trade_type = Some(trade_type.into());
        self
    }

    #[must_use]
    pub fn with_stated_need(mut self, need: StatedNeed) -> Self {
        self.stated_need = Some(need);
        self
    }

    #[must_use]
    pub const fn with_evaluation_date(mut self, date: NaiveDate) -> Self {
        self.evaluation_date = Some(date);
        self
    }

    /// Reject contexts that would leave weighting undefined.
    pub fn validate(&self) -> Result<()> {
        if self.project_type.trim().is_empty() {
            return Err(ScoringError::missing_field("projectType"));
        }
        if let Some(need) = &self.stated_need {
            if let Some(ceiling) = need.budget_ceiling {
                if !ceiling.is_finite() || ceiling < 0.0 {
                    return Err(ScoringError::invalid_value(
                        "statedNeed.budgetCeiling",
                        format!("must be a non-negative amount, got {ceiling}"),
                    ));
                }
            }
        }
        Ok(())
    }
}
