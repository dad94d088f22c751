use anyhow::anyhow;
use tracing::{debug, info};

use crate::{
    error::WeatherError,
    model::{Coordinates, DailyForecast, WeatherSnapshot},
    openmeteo::{CurrentResponse, DailyResponse, OpenMeteoClient},
};

/// Label shown when neither a city name nor a timezone is available.
pub const FALLBACK_LABEL: &str = "Weather";

#[derive(Debug, Clone)]
pub struct WeatherFetcher {
    client: OpenMeteoClient,
}

impl WeatherFetcher {
    pub fn new(client: OpenMeteoClient) -> Self {
        Self { client }
    }

    /// Fetch current conditions and the daily forecast concurrently.
    ///
    /// Both halves must succeed; a failure in either drops the whole result.
    pub async fn fetch_weather(
        &self,
        at: Coordinates,
        display_name_hint: Option<&str>,
    ) -> Result<WeatherSnapshot, WeatherError> {
        let (current, daily) = tokio::try_join!(self.client.current(at), self.client.daily(at))
            .map_err(WeatherError::FetchFailed)?;

        let snapshot = assemble(current, daily, display_name_hint)?;
        info!(
            name = %snapshot.display_name,
            days = snapshot.daily_forecast.len(),
            "weather snapshot ready"
        );
        Ok(snapshot)
    }
}

fn assemble(
    current: CurrentResponse,
    daily: DailyResponse,
    display_name_hint: Option<&str>,
) -> Result<WeatherSnapshot, WeatherError> {
    let humidity_pct = current.current_humidity().ok_or_else(|| {
        WeatherError::FetchFailed(anyhow!("current weather response has no humidity sample"))
    })?;

    let series = daily.daily;
    let days = series.time.len();
    if series.weathercode.len() != days
        || series.temperature_2m_max.len() != days
        || series.temperature_2m_min.len() != days
    {
        return Err(WeatherError::FetchFailed(anyhow!(
            "daily forecast arrays have mismatched lengths"
        )));
    }

    let daily_forecast = series
        .time
        .into_iter()
        .zip(series.weathercode)
        .zip(series.temperature_2m_max.into_iter().zip(series.temperature_2m_min))
        .map(|((date, weather_code), (temp_max_c, temp_min_c))| DailyForecast {
            date,
            weather_code,
            temp_max_c,
            temp_min_c,
        })
        .collect();

    let display_name = match display_name_hint.map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => name.to_string(),
        None => {
            let label = label_from_timezone(daily.timezone.as_deref());
            debug!(%label, "derived display name from timezone");
            label
        }
    };

    Ok(WeatherSnapshot {
        display_name,
        current_temperature_c: current.current_weather.temperature,
        current_weather_code: current.current_weather.weathercode,
        wind_speed_kmh: current.current_weather.windspeed,
        humidity_pct,
        daily_forecast,
    })
}

/// Human label from an IANA timezone id: `"Asia/Kolkata"` becomes `"Kolkata"`.
///
/// Uses the second `/` segment when there is one, otherwise the first, with
/// underscores turned into spaces.
pub fn label_from_timezone(timezone: Option<&str>) -> String {
    let Some(tz) = timezone.map(str::trim).filter(|tz| !tz.is_empty()) else {
        return FALLBACK_LABEL.to_string();
    };

    let mut segments = tz.split('/');
    let first = segments.next().unwrap_or(tz);
    let chosen = segments.next().unwrap_or(first);

    let label = chosen.replace('_', " ");
    if label.trim().is_empty() {
        FALLBACK_LABEL.to_string()
    } else {
        label
    }
}
