//! Owner of the request state and the fetch cycle that drives it.
//!
//! Each cycle takes a generation ticket when it starts. Only the most
//! recently started cycle may commit its outcome; anything older is dropped
//! when it completes, so a slow search can never overwrite a newer one.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::{
    config::Config,
    error::WeatherError,
    fetch::WeatherFetcher,
    geolocation::Geolocator,
    location::LocationResolver,
    model::{Failure, RequestState, WeatherSnapshot},
    openmeteo::OpenMeteoClient,
};

/// What started a cycle. Only affects the wording of failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    InitialLoad,
    Search,
}

#[derive(Debug, Default)]
struct Slot {
    generation: u64,
    state: RequestState,
}

#[derive(Debug)]
pub struct Dashboard {
    resolver: LocationResolver,
    fetcher: WeatherFetcher,
    slot: Mutex<Slot>,
}

impl Dashboard {
    pub fn new(resolver: LocationResolver, fetcher: WeatherFetcher) -> Self {
        Self {
            resolver,
            fetcher,
            slot: Mutex::new(Slot::default()),
        }
    }

    /// Wire up a dashboard from configuration and a positioning capability.
    pub fn from_config(config: &Config, geolocator: Arc<dyn Geolocator>) -> Self {
        let client = OpenMeteoClient::new(&config.endpoints);
        let resolver = LocationResolver::new(client.clone(), geolocator, &config.default_city);
        Self::new(resolver, WeatherFetcher::new(client))
    }

    pub async fn state(&self) -> RequestState {
        self.slot.lock().await.state.clone()
    }

    /// First load: position if possible, default city otherwise.
    pub async fn load_initial(&self) -> RequestState {
        self.run(None, Trigger::InitialLoad).await
    }

    /// Search by city name. Blank input does nothing and returns `None`.
    pub async fn search(&self, query: &str) -> Option<RequestState> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }
        Some(self.run(Some(query), Trigger::Search).await)
    }

    async fn run(&self, query: Option<&str>, trigger: Trigger) -> RequestState {
        let ticket = self.begin().await;

        let outcome = self.cycle(query).await;
        let next = match outcome {
            Ok(snapshot) => RequestState::Success(snapshot),
            Err(err) => {
                warn!(error = ?err, kind = %err.kind(), "fetch cycle failed");
                RequestState::Failed(Failure {
                    kind: err.kind(),
                    message: user_message(&err, trigger),
                })
            }
        };

        self.commit(ticket, next).await
    }

    async fn cycle(&self, query: Option<&str>) -> Result<WeatherSnapshot, WeatherError> {
        let location = self.resolver.resolve(query).await?;
        self.fetcher
            .fetch_weather(location.coordinates, location.display_name.as_deref())
            .await
    }

    async fn begin(&self) -> u64 {
        let mut slot = self.slot.lock().await;
        slot.generation += 1;
        slot.state = RequestState::Loading;
        slot.generation
    }

    /// Store `next` if `ticket` is still current; return whatever is current.
    async fn commit(&self, ticket: u64, next: RequestState) -> RequestState {
        let mut slot = self.slot.lock().await;
        if slot.generation == ticket {
            slot.state = next;
        } else {
            info!(
                ticket,
                latest = slot.generation,
                "discarding result of superseded request"
            );
        }
        slot.state.clone()
    }
}

/// The one line the user sees for a failed cycle.
pub fn user_message(err: &WeatherError, trigger: Trigger) -> String {
    match (err, trigger) {
        (WeatherError::NotFound(query), _) => format!("Could not find weather for \"{query}\"."),
        (WeatherError::LookupFailed(_), _) => "Failed to fetch location data.".to_string(),
        (WeatherError::FetchFailed(_), Trigger::InitialLoad) => {
            "Could not fetch weather. Please search for a city.".to_string()
        }
        (WeatherError::FetchFailed(_), Trigger::Search) => {
            "Failed to fetch weather data. Please try again.".to_string()
        }
    }
}
