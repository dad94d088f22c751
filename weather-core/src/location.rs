//! Turning "where should we show weather for" into coordinates.
//!
//! Order of preference:
//! 1. an explicit city search (no fallback if it finds nothing),
//! 2. the platform position,
//! 3. the configured default city.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::{
    error::WeatherError,
    geolocation::Geolocator,
    model::ResolvedLocation,
    openmeteo::OpenMeteoClient,
};

#[derive(Debug, Clone)]
pub struct LocationResolver {
    client: OpenMeteoClient,
    geolocator: Arc<dyn Geolocator>,
    default_city: String,
}

impl LocationResolver {
    pub fn new(
        client: OpenMeteoClient,
        geolocator: Arc<dyn Geolocator>,
        default_city: impl Into<String>,
    ) -> Self {
        Self {
            client,
            geolocator,
            default_city: default_city.into(),
        }
    }

    /// Single attempt, no retries. A blank query counts as no query.
    pub async fn resolve(&self, query: Option<&str>) -> Result<ResolvedLocation, WeatherError> {
        if let Some(query) = query.map(str::trim).filter(|q| !q.is_empty()) {
            return self.search(query).await;
        }

        if !self.geolocator.is_available() {
            warn!(
                fallback = %self.default_city,
                "geolocation is not supported, using default city"
            );
            return self.resolve_default().await;
        }

        match self.geolocator.current_position().await {
            Ok(coordinates) => {
                info!(%coordinates, "resolved location from geolocation");
                Ok(ResolvedLocation {
                    coordinates,
                    display_name: None,
                })
            }
            Err(err) => {
                warn!(error = %err, fallback = %self.default_city, "geolocation failed, using default city");
                self.resolve_default().await
            }
        }
    }

    /// Geocode `query` and take the first match.
    pub async fn search(&self, query: &str) -> Result<ResolvedLocation, WeatherError> {
        let matches = self
            .client
            .geocode(query)
            .await
            .map_err(WeatherError::LookupFailed)?;

        let Some(first) = matches.into_iter().next() else {
            debug!(%query, "geocoding returned no matches");
            return Err(WeatherError::NotFound(query.to_string()));
        };

        info!(
            %query,
            name = %first.name,
            latitude = first.latitude,
            longitude = first.longitude,
            "resolved location from search"
        );

        Ok(ResolvedLocation {
            coordinates: first.coordinates(),
            display_name: Some(first.name),
        })
    }

    async fn resolve_default(&self) -> Result<ResolvedLocation, WeatherError> {
        self.search(&self.default_city).await.map_err(|err| match err {
            WeatherError::NotFound(city) => WeatherError::LookupFailed(anyhow::anyhow!(
                "default city \"{city}\" could not be geocoded"
            )),
            other => other,
        })
    }
}
