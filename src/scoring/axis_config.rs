//! Static configuration of the nine axes.
//!
//! The point budgets are a versioned constant of the scoring scheme: they
//! always add up to 1350. Bumping any value means bumping
//! [`SCORING_SCHEME_VERSION`].

use serde::Serialize;

use super::types::AxisId;
use crate::model::Profile;

/// Scoring scheme version
pub const SCORING_SCHEME_VERSION: &str = "1350-v1.0";

/// Static parameters of one axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisConfig {
    pub id: AxisId,
    pub name: &'static str,
    /// Nominal share of the 1350-point scale
    pub weight: f64,
    #[serde(rename = "weightB2C")]
    pub weight_b2c: f64,
    #[serde(rename = "weightB2B")]
    pub weight_b2b: f64,
    pub max_points: f64,
}

impl AxisConfig {
    /// Effective weight for a profile.
    #[must_use]
    pub const fn weight_for(&self, profile: Profile) -> f64 {
        match profile {
            Profile::B2C => self.weight_b2c,
            Profile::B2B => self.weight_b2b,
        }
    }
}

/// The nine axes, in evaluation order.
pub const AXIS_CONFIGS: [AxisConfig; 9] = [
    AxisConfig {
        id: AxisId::Compliance,
        name: "Compliance",
        weight: 0.222,
        weight_b2c: 1.0,
        weight_b2b: 0.9,
        max_points: 300.0,
    },
    AxisConfig {
        id: AxisId::Price,
        name: "Price",
        weight: 0.185,
        weight_b2c: 1.0,
        weight_b2b: 0.85,
        max_points: 250.0,
    },
    AxisConfig {
        id: AxisId::Quality,
        name: "Quality & Reputation",
        weight: 0.148,
        weight_b2c: 0.9,
        weight_b2b: 1.0,
        max_points: 200.0,
    },
    AxisConfig {
        id: AxisId::Feasibility,
        name: "Feasibility",
        weight: 0.111,
        weight_b2c: 0.8,
        weight_b2b: 1.0,
        max_points: 150.0,
    },
    AxisConfig {
        id: AxisId::Coherence,
        name: "Request-Quote Coherence",
        weight: 0.111,
        weight_b2c: 1.0,
        weight_b2b: 0.9,
        max_points: 150.0,
    },
    AxisConfig {
        id: AxisId::Transparency,
        name: "Transparency",
        weight: 0.074,
        weight_b2c: 1.0,
        weight_b2b: 0.8,
        max_points: 100.0,
    },
    AxisConfig {
        id: AxisId::Guarantees,
        name: "Guarantees",
        weight: 0.059,
        weight_b2c: 1.0,
        weight_b2b: 0.9,
        max_points: 80.0,
    },
    AxisConfig {
        id: AxisId::Schedule,
        name: "Schedule",
        weight: 0.052,
        weight_b2c: 0.8,
        weight_b2b: 1.0,
        max_points: 70.0,
    },
    AxisConfig {
        id: AxisId::Innovation,
        name: "Innovation",
        weight: 0.037,
        weight_b2c: 0.6,
        weight_b2b: 0.8,
        max_points: 50.0,
    },
];

/// Configuration of one axis.
#[must_use]
pub fn axis_config(id: AxisId) -> &'static AxisConfig {
    match id {
        AxisId::Compliance => &AXIS_CONFIGS[0],
        AxisId::Price => &AXIS_CONFIGS[1],
        AxisId::Quality => &AXIS_CONFIGS[2],
        AxisId::Feasibility => &AXIS_CONFIGS[3],
        AxisId::Coherence => &AXIS_CONFIGS[4],
        AxisId::Transparency => &AXIS_CONFIGS[5],
        AxisId::Guarantees => &AXIS_CONFIGS[6],
        AxisId::Schedule => &AXIS_CONFIGS[7],
        AxisId::Innovation => &AXIS_CONFIGS[8],
    }
}
