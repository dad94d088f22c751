use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::{config::Endpoints, model::Coordinates};

const CURRENT_HOURLY_FIELDS: &str = "temperature_2m,relativehumidity_2m,windspeed_10m";
const DAILY_FIELDS: &str = "weathercode,temperature_2m_max,temperature_2m_min";

/// Thin client over the Open-Meteo forecast and geocoding endpoints.
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    http: Client,
    forecast_url: String,
    geocoding_url: String,
}

impl OpenMeteoClient {
    pub fn new(endpoints: &Endpoints) -> Self {
        Self::with_client(Client::new(), endpoints)
    }

    pub fn with_client(http: Client, endpoints: &Endpoints) -> Self {
        Self {
            http,
            forecast_url: endpoints.forecast.clone(),
            geocoding_url: endpoints.geocoding.clone(),
        }
    }

    /// Search places by name. An empty vector means the service found nothing.
    pub async fn geocode(&self, name: &str) -> Result<Vec<GeoMatch>> {
        tracing::debug!(%name, "geocoding request");

        let parsed: GeocodingResponse = self
            .get_json(
                &self.geocoding_url,
                &[
                    ("name", name.to_string()),
                    ("count", "1".to_string()),
                    ("language", "en".to_string()),
                    ("format", "json".to_string()),
                ],
                "geocoding",
            )
            .await?;

        Ok(parsed.results)
    }

    /// Current conditions plus the hourly humidity series.
    pub async fn current(&self, at: Coordinates) -> Result<CurrentResponse> {
        tracing::debug!(%at, "current weather request");

        self.get_json(
            &self.forecast_url,
            &[
                ("latitude", at.latitude.to_string()),
                ("longitude", at.longitude.to_string()),
                ("current_weather", "true".to_string()),
                ("hourly", CURRENT_HOURLY_FIELDS.to_string()),
            ],
            "current weather",
        )
        .await
    }

    /// Daily aggregates, in the location's own timezone.
    pub async fn daily(&self, at: Coordinates) -> Result<DailyResponse> {
        tracing::debug!(%at, "daily forecast request");

        self.get_json(
            &self.forecast_url,
            &[
                ("latitude", at.latitude.to_string()),
                ("longitude", at.longitude.to_string()),
                ("daily", DAILY_FIELDS.to_string()),
                ("timezone", "auto".to_string()),
            ],
            "daily forecast",
        )
        .await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
        what: &str,
    ) -> Result<T> {
        let res = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .with_context(|| format!("Failed to send request to Open-Meteo ({what})"))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .with_context(|| format!("Failed to read Open-Meteo {what} response body"))?;

        if !status.is_success() {
            return Err(anyhow!(
                "Open-Meteo {} request failed with status {}: {}",
                what,
                status,
                truncate_body(&body),
            ));
        }

        serde_json::from_str(&body).with_context(|| format!("Failed to parse Open-Meteo {what} JSON"))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GeoMatch {
    pub latitude: f64,
    pub longitude: f64,
    pub name: String,
}

impl GeoMatch {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    // Absent entirely when nothing matched.
    #[serde(default)]
    results: Vec<GeoMatch>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CurrentWeather {
    pub temperature: f64,
    pub weathercode: i32,
    pub windspeed: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HourlySeries {
    #[serde(default)]
    pub relativehumidity_2m: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CurrentResponse {
    pub current_weather: CurrentWeather,
    pub hourly: HourlySeries,
}

impl CurrentResponse {
    /// First hourly humidity sample, taken as "now".
    pub fn current_humidity(&self) -> Option<u8> {
        self.hourly
            .relativehumidity_2m
            .first()
            .copied()
            .flatten()
            .map(|h| h.round().clamp(0.0, 100.0) as u8)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DailySeries {
    pub time: Vec<NaiveDate>,
    // Days outside a model's range come back as null.
    pub weathercode: Vec<Option<i32>>,
    pub temperature_2m_max: Vec<Option<f64>>,
    pub temperature_2m_min: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DailyResponse {
    pub daily: DailySeries,
    pub timezone: Option<String>,
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
