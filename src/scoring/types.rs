//! Score objects produced by the engine.
//!
//! All of these are created fresh for one scoring request and never mutated
//! once handed back to the caller.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::model::{AmountBand, Profile};

/// Global scale every final score is expressed on.
pub const GLOBAL_MAX_POINTS: f64 = 1350.0;

/// One of the nine evaluation dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AxisId {
    Compliance,
    Price,
    Quality,
    Feasibility,
    Coherence,
    Transparency,
    Guarantees,
    Schedule,
    Innovation,
}

impl AxisId {
    /// All axes, in evaluation and report order.
    pub const ALL: [Self; 9] = [
        Self::Compliance,
        Self::Price,
        Self::Quality,
        Self::Feasibility,
        Self::Coherence,
        Self::Transparency,
        Self::Guarantees,
        Self::Schedule,
        Self::Innovation,
    ];

    /// Stable machine identifier
    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Self::Compliance => "compliance",
            Self::Price => "price",
            Self::Quality => "quality",
            Self::Feasibility => "feasibility",
            Self::Coherence => "coherence",
            Self::Transparency => "transparency",
            Self::Guarantees => "guarantees",
            Self::Schedule => "schedule",
            Self::Innovation => "innovation",
        }
    }

    /// Human-readable name
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Compliance => "Compliance",
            Self::Price => "Price",
            Self::Quality => "Quality & Reputation",
            Self::Feasibility => "Feasibility",
            Self::Coherence => "Request-Quote Coherence",
            Self::Transparency => "Transparency",
            Self::Guarantees => "Guarantees",
            Self::Schedule => "Schedule",
            Self::Innovation => "Innovation",
        }
    }
}

impl std::fmt::Display for AxisId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Score of a single control point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlPointScore {
    pub id: String,
    /// Awarded points, always within `0..=max_points`
    pub score: f64,
    pub max_points: f64,
    /// Which signals were found and which were assumed absent
    pub justification: String,
    /// Confidence in this evaluation (0-100)
    pub confidence: u8,
}

impl ControlPointScore {
    /// Build a control-point score, clamping the score into its budget.
    pub fn new(
        id: impl Into<String>,
        score: f64,
        max_points: f64,
        justification: impl Into<String>,
        confidence: u8,
    ) -> Self {
        let score = if score.is_finite() {
            score.clamp(0.0, max_points)
        } else {
            0.0
        };
        Self {
            id: id.into(),
            score,
            max_points,
            justification: justification.into(),
            confidence: confidence.min(100),
        }
    }

    /// Share of the budget awarded (0.0-1.0)
    #[must_use]
    pub fn ratio(&self) -> f64 {
        if self.max_points > 0.0 {
            self.score / self.max_points
        } else {
            0.0
        }
    }
}

/// A named group of control points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubCriteriaScore {
    pub id: String,
    pub score: f64,
    /// Declared budget of the sub-criterion
    pub max_points: f64,
    pub control_points: Vec<ControlPointScore>,
}

impl SubCriteriaScore {
    /// Sum control points into a sub-criterion with a declared budget.
    pub fn new(
        id: impl Into<String>,
        max_points: f64,
        control_points: Vec<ControlPointScore>,
    ) -> Self {
        let score = control_points.iter().map(|cp| cp.score).sum();
        Self {
            id: id.into(),
            score,
            max_points,
            control_points,
        }
    }

    #[must_use]
    pub fn ratio(&self) -> f64 {
        if self.max_points > 0.0 {
            self.score / self.max_points
        } else {
            0.0
        }
    }

    /// Look up a control point by id.
    #[must_use]
    pub fn control_point(&self, id: &str) -> Option<&ControlPointScore> {
        self.control_points.iter().find(|cp| cp.id == id)
    }
}

/// Profile re-weighting applied by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisWeighting {
    pub weight: f64,
    pub adjusted_score: f64,
    pub adjusted_max: f64,
}

/// Result of one axis strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisScore {
    pub axis_id: AxisId,
    pub score: f64,
    pub max_points: f64,
    /// `score / max_points * 100`
    pub percentage: f64,
    pub sub_criteria: Vec<SubCriteriaScore>,
    pub alerts: Vec<Alert>,
    pub recommendations: Vec<Recommendation>,
    /// Filled in by the orchestrator once the profile weight is applied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weighting: Option<AxisWeighting>,
}

impl AxisScore {
    /// Assemble an axis result from its sub-criteria.
    pub fn new(
        axis_id: AxisId,
        max_points: f64,
        sub_criteria: Vec<SubCriteriaScore>,
        alerts: Vec<Alert>,
        recommendations: Vec<Recommendation>,
    ) -> Self {
        let score: f64 = sub_criteria.iter().map(|sc| sc.score).sum();
        let percentage = if max_points > 0.0 {
            score / max_points * 100.0
        } else {
            0.0
        };
        Self {
            axis_id,
            score,
            max_points,
            percentage,
            sub_criteria,
            alerts,
            recommendations,
            weighting: None,
        }
    }

    /// Look up a sub-criterion by id.
    #[must_use]
    pub fn sub_criterion(&self, id: &str) -> Option<&SubCriteriaScore> {
        self.sub_criteria.iter().find(|sc| sc.id == id)
    }

    /// Look up a control point anywhere in the axis.
    #[must_use]
    pub fn control_point(&self, id: &str) -> Option<&ControlPointScore> {
        self.sub_criteria.iter().find_map(|sc| sc.control_point(id))
    }
}

/// Alert severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Blocks trust in the quote
    Critical,
    /// Needs to be checked before signing
    Major,
    /// Informational
    Minor,
}

impl Severity {
    /// Whether the alert surfaces in the global report.
    #[must_use]
    pub const fn is_reportable(&self) -> bool {
        matches!(self, Self::Critical | Self::Major)
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Major => "major",
            Self::Minor => "minor",
        }
    }
}

/// A risk flagged by an axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub severity: Severity,
    pub axis_id: AxisId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_criteria_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_point_id: Option<String>,
    pub message: String,
    /// What the issue means for the customer
    pub impact: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
}

impl Alert {
    /// Axis-level alert.
    pub fn new(
        severity: Severity,
        axis_id: AxisId,
        message: impl Into<String>,
        impact: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            axis_id,
            sub_criteria_id: None,
            control_point_id: None,
            message: message.into(),
            impact: impact.into(),
            recommendation: None,
        }
    }

    /// Attach the control point (and its sub-criterion) that raised the alert.
    #[must_use]
    pub fn at(mut self, sub_criteria_id: &str, control_point_id: &str) -> Self {
        self.sub_criteria_id = Some(sub_criteria_id.to_string());
        self.control_point_id = Some(control_point_id.to_string());
        self
    }

    #[must_use]
    pub fn recommending(mut self, recommendation: impl Into<String>) -> Self {
        self.recommendation = Some(recommendation.into());
        self
    }
}

/// Recommendation priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Sort rank, higher first
    #[must_use]
    pub const fn rank(&self) -> u8 {
        match self {
            Self::High => 3,
            Self::Medium => 2,
            Self::Low => 1,
        }
    }
}

/// Category a recommendation belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RecommendationCategory {
    Axis(AxisId),
    Global,
}

impl RecommendationCategory {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Axis(axis) => axis.name(),
            Self::Global => "Global",
        }
    }
}

impl From<AxisId> for RecommendationCategory {
    fn from(axis: AxisId) -> Self {
        Self::Axis(axis)
    }
}

/// Suggested action for the customer or the contractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub priority: Priority,
    pub category: RecommendationCategory,
    pub suggestion: String,
    /// Estimated points recoverable by acting on it
    pub potential_impact: f64,
    pub actionable: bool,
}

/// Letter grade on the 1350-point scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grade {
    /// 1215 and above
    #[serde(rename = "A+")]
    APlus,
    /// 1080-1214
    A,
    /// 945-1079
    B,
    /// 810-944
    C,
    /// 675-809
    D,
    /// Below 675
    E,
}

impl Grade {
    /// Lowest score of each grade, best grade first.
    pub const LADDER: [(f64, Self); 5] = [
        (1215.0, Self::APlus),
        (1080.0, Self::A),
        (945.0, Self::B),
        (810.0, Self::C),
        (675.0, Self::D),
    ];

    /// Create grade from a score on the 1350-point scale
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        Self::LADDER
            .iter()
            .find(|(threshold, _)| score >= *threshold)
            .map_or(Self::E, |(_, grade)| *grade)
    }

    /// Get grade letter
    #[must_use]
    pub const fn letter(&self) -> &'static str {
        match self {
            Self::APlus => "A+",
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::E => "E",
        }
    }

    /// Get grade description
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::APlus => "Excellent",
            Self::A => "Very good",
            Self::B => "Good",
            Self::C => "Fair",
            Self::D => "Weak",
            Self::E => "Risky",
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.letter())
    }
}

/// Trace of the machine-learned adjustment, present only when it was applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MlAdjustment {
    pub provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,
    pub base_score: f64,
    pub predicted_score: f64,
    /// Provider confidence, clamped to 0-1
    pub confidence: f64,
    /// Share of the prediction in the final score (at most 0.3)
    pub ml_weight: f64,
    pub adjusted_score: f64,
    pub adjustments: IndexMap<String, f64>,
    pub feature_importance: IndexMap<String, f64>,
}

/// Context of the evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreMetadata {
    pub profile: Profile,
    pub project_type: String,
    pub project_amount: f64,
    pub project_amount_band: AmountBand,
    pub region: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trade_type: Option<String>,
    pub scoring_version: String,
    pub enrichment_sources: Vec<String>,
    /// Σ weighted axis scores
    pub weighted_raw: f64,
    /// Σ weighted axis budgets
    pub weighted_max: f64,
    /// Score before any ML blend
    pub base_score: f64,
    /// xxh3 of the canonical inputs
    pub input_fingerprint: String,
    pub evaluated_at: DateTime<Utc>,
}

/// The complete report returned by `calculate_score`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[must_use]
pub struct FinalScore {
    /// 0-1350
    pub total_score: f64,
    pub grade: Grade,
    pub percentage: f64,
    pub axis_scores: Vec<AxisScore>,
    /// Critical and major alerts only
    pub overall_alerts: Vec<Alert>,
    /// Sorted high → low, ties in insertion order
    pub overall_recommendations: Vec<Recommendation>,
    /// 0-100
    pub confidence_level: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ml_adjustment: Option<MlAdjustment>,
    pub metadata: ScoreMetadata,
}

impl FinalScore {
    /// Axis result by id.
    #[must_use]
    pub fn axis(&self, axis_id: AxisId) -> Option<&AxisScore> {
        self.axis_scores.iter().find(|axis| axis.axis_id == axis_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_boundaries() {
        let cases = [
            (1350.0, Grade::APlus),
            (1215.0, Grade::APlus),
            (1214.0, Grade::A),
            (1080.0, Grade::A),
            (1079.0, Grade::B),
            (945.0, Grade::B),
            (944.0, Grade::C),
            (810.0, Grade::C),
            (809.0, Grade::D),
            (675.0, Grade::D),
            (674.0, Grade::E),
            (0.0, Grade::E),
        ];
        for (score, expected) in cases {
            assert_eq!(Grade::from_score(score), expected, "score {score}");
        }
    }

    #[test]
    fn test_grade_ladder_is_percent_of_scale() {
        let percents = [0.9, 0.8, 0.7, 0.6, 0.5];
        for ((threshold, _), pct) in Grade::LADDER.iter().zip(percents) {
            assert!((threshold - GLOBAL_MAX_POINTS * pct).abs() < 1e-9);
        }
    }

    #[test]
    fn test_control_point_clamps_score() {
        let over = ControlPointScore::new("cp", 12.0, 10.0, "", 80);
        assert!((over.score - 10.0).abs() < f64::EPSILON);
        let under = ControlPointScore::new("cp", -3.0, 10.0, "", 80);
        assert!(under.score.abs() < f64::EPSILON);
        let nan = ControlPointScore::new("cp", f64::NAN, 10.0, "", 120);
        assert!(nan.score.abs() < f64::EPSILON);
        assert_eq!(nan.confidence, 100);
    }

    #[test]
    fn test_sub_criteria_sums_control_points() {
        let sub = SubCriteriaScore::new(
            "insurance",
            90.0,
            vec![
                ControlPointScore::new("a", 30.0, 60.0, "", 90),
                ControlPointScore::new("b", 20.0, 30.0, "", 90),
            ],
        );
        assert!((sub.score - 50.0).abs() < f64::EPSILON);
        assert!((sub.max_points - 90.0).abs() < f64::EPSILON);
        assert!(sub.control_point("b").is_some());
    }

    #[test]
    fn test_severity_reportable() {
        assert!(Severity::Critical.is_reportable());
        assert!(Severity::Major.is_reportable());
        assert!(!Severity::Minor.is_reportable());
    }

    #[test]
    fn test_grade_serializes_as_letter() {
        let json = serde_json::to_string(&Grade::APlus).expect("serializable");
        assert_eq!(json, "\"A+\"");
    }
}
