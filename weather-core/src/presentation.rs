//! Text rendering of the dashboard state.

use std::fmt::Write as _;

use chrono::NaiveDate;
use serde::Serialize;

use crate::model::{RequestState, WeatherSnapshot};

/// How many forecast days are shown, whatever the API returned.
pub const FORECAST_DAYS_SHOWN: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IconCategory {
    Clear,
    Cloudy,
    Rain,
    Snow,
}

impl IconCategory {
    /// Total over `i32`; anything outside the known ranges is cloudy.
    pub fn from_weather_code(code: i32) -> Self {
        match code {
            0 => IconCategory::Clear,
            1..=3 => IconCategory::Cloudy,
            51..=67 => IconCategory::Rain,
            71..=86 => IconCategory::Snow,
            _ => IconCategory::Cloudy,
        }
    }

    /// A missing code gets the same icon as an unknown one.
    pub fn for_code(code: Option<i32>) -> Self {
        code.map_or(IconCategory::Cloudy, Self::from_weather_code)
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            IconCategory::Clear => "☀",
            IconCategory::Cloudy => "☁",
            IconCategory::Rain => "🌧",
            IconCategory::Snow => "❄",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            IconCategory::Clear => "clear",
            IconCategory::Cloudy => "cloudy",
            IconCategory::Rain => "rain",
            IconCategory::Snow => "snow",
        }
    }
}

/// Nearest whole degree, halves rounded up: -2.5 shows as -2°.
pub fn format_temperature(celsius: f64) -> String {
    // as i64 so -0.4 doesn't show up as -0
    format!("{}°", (celsius + 0.5).floor() as i64)
}

pub fn format_optional_temperature(celsius: Option<f64>) -> String {
    match celsius {
        Some(t) => format_temperature(t),
        None => "-".to_string(),
    }
}

/// Short weekday, e.g. `Mon`.
pub fn weekday_label(date: NaiveDate) -> String {
    date.format("%a").to_string()
}

pub fn render(state: &RequestState) -> String {
    match state {
        RequestState::Idle => String::new(),
        RequestState::Loading => "Loading...".to_string(),
        RequestState::Failed(failure) => failure.message.clone(),
        RequestState::Success(snapshot) => render_snapshot(snapshot),
    }
}

pub fn render_snapshot(snapshot: &WeatherSnapshot) -> String {
    let icon = IconCategory::from_weather_code(snapshot.current_weather_code);
    let mut out = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(out, "📍 {}", snapshot.display_name);
    let _ = writeln!(
        out,
        "{}  {} {} (code {})",
        format_temperature(snapshot.current_temperature_c),
        icon.glyph(),
        icon.label(),
        snapshot.current_weather_code
    );
    let _ = writeln!(out, "Wind: {} km/h", snapshot.wind_speed_kmh);
    let _ = writeln!(out, "Humidity: {}%", snapshot.humidity_pct);

    if !snapshot.daily_forecast.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "5-Day Forecast");
        for day in snapshot.daily_forecast.iter().take(FORECAST_DAYS_SHOWN) {
            let icon = IconCategory::for_code(day.weather_code);
            let _ = writeln!(
                out,
                "{:<4} {}  {:>5} {:>5}",
                weekday_label(day.date),
                icon.glyph(),
                format_optional_temperature(day.temp_max_c),
                format_optional_temperature(day.temp_min_c),
            );
        }
    }

    out
}
