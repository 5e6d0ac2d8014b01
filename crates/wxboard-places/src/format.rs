//! Forecast card lines.

use std::fmt;

use wxboard_core::TemperatureUnit;
use wxboard_weather::{DailyForecast, WeatherCondition};

/// Labels for the first days of a forecast, in order.
pub const DAY_LABELS: [&str; 3] = ["Today", "Tomorrow", "Day after tomorrow"];

/// Shown in place of a condition whose code is not in the table.
pub const UNKNOWN_CONDITION: &str = "—";

const MINUS_SIGN: char = '\u{2212}';

/// One rendered day of a forecast card.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastLine {
    pub label: &'static str,
    pub min: i64,
    pub max: i64,
    pub condition: Option<WeatherCondition>,
    pub unit: TemperatureUnit,
}

impl ForecastLine {
    pub fn condition_text(&self) -> &'static str {
        self.condition
            .map(|c| c.description())
            .unwrap_or(UNKNOWN_CONDITION)
    }
}

impl fmt::Display for ForecastLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} — {}, {}",
            self.label,
            format_temperature(self.min, self.unit),
            format_temperature(self.max, self.unit),
            self.condition_text()
        )
    }
}

/// Map the first days of a forecast to labelled lines. Extra days are
/// ignored; a short forecast yields fewer lines.
pub fn forecast_lines(days: &[DailyForecast], unit: TemperatureUnit) -> Vec<ForecastLine> {
    DAY_LABELS
        .iter()
        .zip(days)
        .map(|(label, day)| ForecastLine {
            label: *label,
            min: round_half_up(day.min),
            max: round_half_up(day.max),
            condition: day.condition(),
            unit,
        })
        .collect()
}

/// Round to the nearest whole degree, halves towards positive infinity.
pub fn round_half_up(value: f64) -> i64 {
    // `round` sends halves away from zero; pull negative halves back up
    let rounded = value.round();
    if value - rounded == 0.5 {
        (rounded + 1.0) as i64
    } else {
        rounded as i64
    }
}

pub fn format_temperature(degrees: i64, unit: TemperatureUnit) -> String {
    if degrees < 0 {
        format!("{}{}{}", MINUS_SIGN, degrees.unsigned_abs(), unit.symbol())
    } else {
        format!("{}{}", degrees, unit.symbol())
    }
}
