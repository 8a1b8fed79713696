//! Axes command handler.
//!
//! Prints the static axis table: budgets and profile weights.

use crate::model::Profile;
use crate::scoring::{AXIS_CONFIGS, GLOBAL_MAX_POINTS, SCORING_SCHEME_VERSION};
use anyhow::Result;

/// Render the axis configuration as an aligned table.
#[must_use]
pub fn render_axis_table() -> String {
    let mut lines = vec![
        format!("Scoring scheme {SCORING_SCHEME_VERSION} ({GLOBAL_MAX_POINTS:.0} points)"),
        String::new(),
        format!(
            "{:<14} {:>6} {:>7} {:>6} {:>6}",
            "Axis", "Points", "Weight", "B2C", "B2B"
        ),
    ];
    for config in &AXIS_CONFIGS {
        lines.push(format!(
            "{:<14} {:>6.0} {:>7.3} {:>6.2} {:>6.2}",
            config.name,
            config.max_points,
            config.weight,
            config.weight_for(Profile::B2C),
            config.weight_for(Profile::B2B)
        ));
    }
    lines.join("\n")
}

/// Run the axes command.
pub fn run_axes() -> Result<i32> {
    println!("{}", render_axis_table());
    Ok(super::exit_codes::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_table_lists_every_axis() {
        let table = render_axis_table();
        assert_eq!(table.lines().count(), 3 + AXIS_CONFIGS.len());
        assert!(table.contains("Compliance"));
        assert!(table.contains("1350 points"));
    }
}
