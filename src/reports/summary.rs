//! Summary report generator for shell output.
//!
//! Provides a compact, human-readable summary for terminal usage.

use crate::config::ReportingConfig;
use crate::scoring::{FinalScore, Severity};

/// Apply ANSI color formatting if colored output is enabled.
fn ansi_color(text: &str, color: &str, colored: bool) -> String {
    if colored {
        match color {
            "red" => format!("\x1b[31m{text}\x1b[0m"),
            "green" => format!("\x1b[32m{text}\x1b[0m"),
            "yellow" => format!("\x1b[33m{text}\x1b[0m"),
            "cyan" => format!("\x1b[36m{text}\x1b[0m"),
            "bold" => format!("\x1b[1m{text}\x1b[0m"),
            "dim" => format!("\x1b[2m{text}\x1b[0m"),
            _ => text.to_string(),
        }
    } else {
        text.to_string()
    }
}

/// Summary reporter for shell output
#[derive(Debug, Clone)]
pub struct SummaryReporter {
    /// Use colored output
    colored: bool,
}

impl SummaryReporter {
    /// Create a new summary reporter
    #[must_use]
    pub const fn new() -> Self {
        Self { colored: true }
    }

    /// Disable colored output
    #[must_use]
    pub const fn no_color(mut self) -> Self {
        self.colored = false;
        self
    }

    fn color(&self, text: &str, color: &str) -> String {
        ansi_color(text, color, self.colored)
    }

    fn percentage_color(percentage: f64) -> &'static str {
        if percentage >= 70.0 {
            "green"
        } else if percentage >= 50.0 {
            "yellow"
        } else {
            "red"
        }
    }

    /// Render a score as plain text.
    #[must_use]
    pub fn render(&self, score: &FinalScore, config: &ReportingConfig) -> String {
        let mut lines = Vec::new();

        lines.push(self.color("Quote Score Summary", "bold"));
        lines.push(self.color("─".repeat(48).as_str(), "dim"));
        lines.push(format!(
            "{}  {} ({})",
            self.color("Grade:", "cyan"),
            self.color(score.grade.letter(), Self::percentage_color(score.percentage)),
            score.grade.description()
        ));
        lines.push(format!(
            "{}  {:.0} / 1350 ({:.1}%)",
            self.color("Score:", "cyan"),
            score.total_score,
            score.percentage
        ));
        lines.push(format!(
            "{}  {:.0}%",
            self.color("Confidence:", "cyan"),
            score.confidence_level
        ));
        lines.push(format!(
            "{}  {} / {} ({})",
            self.color("Context:", "cyan"),
            score.metadata.profile,
            score.metadata.project_type,
            score.metadata.project_amount_band.name()
        ));
        if let Some(ml) = &score.ml_adjustment {
            lines.push(format!(
                "{}  {} predicted {:.0}, weight {:.2} (base {:.0})",
                self.color("ML:", "cyan"),
                ml.provider,
                ml.predicted_score,
                ml.ml_weight,
                ml.base_score
            ));
        }

        lines.push(String::new());
        lines.push(self.color("Axes:", "bold"));
        for axis in &score.axis_scores {
            let percent = format!("{:>5.1}%", axis.percentage);
            lines.push(format!(
                "  {:<14} {:>6.1} / {:<5.0} {}",
                axis.axis_id.name(),
                axis.score,
                axis.max_points,
                self.color(&percent, Self::percentage_color(axis.percentage))
            ));
        }

        let minor: Vec<_> = if config.include_minor_alerts_in_summary {
            score
                .axis_scores
                .iter()
                .flat_map(|axis| axis.alerts.iter())
                .filter(|alert| alert.severity == Severity::Minor)
                .collect()
        } else {
            Vec::new()
        };
        if !score.overall_alerts.is_empty() || !minor.is_empty() {
            lines.push(String::new());
            lines.push(self.color("Alerts:", "bold"));
            for alert in score.overall_alerts.iter().chain(minor) {
                let color = match alert.severity {
                    Severity::Critical => "red",
                    Severity::Major => "yellow",
                    Severity::Minor => "dim",
                };
                lines.push(format!(
                    "  [{}] {}: {}",
                    self.color(alert.severity.name(), color),
                    alert.axis_id.name(),
                    alert.message
                ));
            }
        }

        let limit = config
            .max_recommendations
            .unwrap_or(score.overall_recommendations.len());
        if !score.overall_recommendations.is_empty() {
            lines.push(String::new());
            lines.push(self.color("Recommendations:", "bold"));
            for rec in score.overall_recommendations.iter().take(limit) {
                lines.push(format!(
                    "  - ({:?}) {}: {}",
                    rec.priority,
                    rec.category.name(),
                    rec.suggestion
                ));
            }
            let hidden = score.overall_recommendations.len().saturating_sub(limit);
            if hidden > 0 {
                lines.push(self.color(&format!("  … {hidden} more"), "dim"));
            }
        }

        lines.join("\n")
    }
}

impl Default for SummaryReporter {
    fn default() -> Self {
        Self::new()
    }
}
