//! Schedule axis: declared timeline and its realism.

use super::{AxisReport, AxisStrategy, EvaluationInput};
use crate::scoring::rules::{
    ControlPointBuilder, DURATION_KEYWORDS, START_DATE_KEYWORDS, WEATHER_PROVISION_KEYWORDS,
};
use crate::scoring::types::{Alert, AxisId, AxisScore, ControlPointScore, Severity};

/// Schedule commitments of the quote.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScheduleAxis;

impl AxisStrategy for ScheduleAxis {
    fn axis_id(&self) -> AxisId {
        AxisId::Schedule
    }

    fn evaluate_input(&self, input: &EvaluationInput<'_>) -> AxisScore {
        let mut report = AxisReport::new(AxisId::Schedule);

        report.criterion(
            "timeline_definition",
            "Ask for a start date and a committed duration in writing",
            vec![start_date(input), duration(input)],
        );
        let realism = vec![duration_realism(input, &mut report), weather_planning(input)];
        report.criterion(
            "timeline_realism",
            "Check that the announced duration is realistic for these works",
            realism,
        );

        report.finish()
    }
}

fn start_date(input: &EvaluationInput<'_>) -> ControlPointScore {
    let mut cp = ControlPointBuilder::new("start_date", 15.0);
    if let Some(start) = input.quote.extracted_data.dates.start_date {
        cp.award(1.0, format!("start date {start}"));
    } else if let Some(keyword) = input.text.first_match(START_DATE_KEYWORDS) {
        cp.award(0.45, format!("start mentioned (\"{keyword}\")"))
            .absent("start date")
            .confidence(60);
    } else {
        cp.absent("start date");
    }
    cp.build()
}

fn duration(input: &EvaluationInput<'_>) -> ControlPointScore {
    let mut cp = ControlPointBuilder::new("duration", 25.0);
    let dates = &input.quote.extracted_data.dates;
    if let Some(days) = dates.effective_duration_days() {
        cp.award(1.0, format!("duration {days} days"));
    } else if dates.end_date.is_some() {
        cp.award(0.5, "end date").absent("start date or duration");
    } else if let Some(keyword) = input.text.first_match(DURATION_KEYWORDS) {
        cp.award(0.3, format!("duration mentioned (\"{keyword}\")"))
            .confidence(60);
    } else {
        cp.absent("duration");
    }
    cp.build()
}

fn duration_realism(input: &EvaluationInput<'_>, report: &mut AxisReport) -> ControlPointScore {
    let mut cp = ControlPointBuilder::new("duration_realism", 20.0);
    let Some(days) = input.quote.extracted_data.dates.effective_duration_days() else {
        cp.credit(0.25).absent("duration").confidence(40);
        return cp.build();
    };

    let regional = input
        .enrichment
        .regional_data
        .as_ref()
        .and_then(|r| r.typical_duration_days)
        .filter(|d| *d > 0);
    let (typical, source) = match regional {
        Some(typical) => {
            cp.confidence(85);
            (typical, "regional typical duration")
        }
        None => {
            cp.confidence(50);
            (
                input.context.project_amount_band.typical_duration_days(),
                "typical duration for the amount band",
            )
        }
    };

    let ratio = f64::from(days) / f64::from(typical);
    let share = if (0.5..=2.0).contains(&ratio) {
        1.0
    } else if ratio > 2.0 && ratio <= 3.0 {
        0.6
    } else {
        0.3
    };
    cp.award(share, format!("{days} days vs {typical} ({source})"));

    if ratio < 0.5 {
        report.alert(
            Alert::new(
                Severity::Minor,
                AxisId::Schedule,
                format!("Announced duration of {days} days is under half the typical {typical} days"),
                "Works may be rushed or the schedule may slip",
            )
            .at("timeline_realism", "duration_realism")
            .recommending("Ask the contractor how the works fit in such a short time"),
        );
    }
    cp.build()
}

fn weather_planning(input: &EvaluationInput<'_>) -> ControlPointScore {
    let mut cp = ControlPointBuilder::new("weather_planning", 10.0);
    if !input.is_outdoor_work() {
        cp.award(1.0, "indoor works").confidence(80);
        return cp.build();
    }
    if let Some(keyword) = input.text.first_match(WEATHER_PROVISION_KEYWORDS) {
        cp.award(1.0, format!("weather provision (\"{keyword}\")"));
        return cp.build();
    }
    match (&input.enrichment.weather_data, input.start_month()) {
        (Some(weather), Some(month)) if !weather.high_risk_months.contains(&month) => {
            cp.award(0.7, format!("start month {month} outside weather-risk months"))
                .absent("weather provision");
        }
        _ => {
            cp.credit(0.3).absent("weather provision").confidence(60);
        }
    }
    cp.build()
}
