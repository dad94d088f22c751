use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ErrorKind;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// Where a fetch cycle should point: coordinates plus the name to show, if known.
///
/// `display_name` is set when the location came from a city search and left
/// empty when it came from geolocation; the fetcher derives a label later.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLocation {
    pub coordinates: Coordinates,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub date: NaiveDate,
    /// `None` for days the forecast model doesn't cover.
    pub weather_code: Option<i32>,
    pub temp_max_c: Option<f64>,
    pub temp_min_c: Option<f64>,
}

/// Everything one successful fetch produced. Replaced wholesale by the next one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub display_name: String,
    pub current_temperature_c: f64,
    pub current_weather_code: i32,
    pub wind_speed_kmh: f64,
    pub humidity_pct: u8,
    pub daily_forecast: Vec<DailyForecast>,
}

/// A failed cycle as the dashboard keeps it: the kind plus the message to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub kind: ErrorKind,
    pub message: String,
}

/// The single authoritative thing to render.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestState {
    #[default]
    Idle,
    Loading,
    Success(WeatherSnapshot),
    Failed(Failure),
}

impl RequestState {
    pub fn snapshot(&self) -> Option<&WeatherSnapshot> {
        match self {
            RequestState::Success(snapshot) => Some(snapshot),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            RequestState::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}
