//! Core library for the `weather` dashboard.
//!
//! This crate defines:
//! - Configuration (default city, geolocation mode, endpoints)
//! - Location resolution: search, platform position, default-city fallback
//! - Concurrent current + daily fetching from Open-Meteo
//! - The request state the dashboard renders, and its text rendering
//!
//! It is used by `weather-cli`, but can also be reused by other front ends.

pub mod config;
pub mod dashboard;
pub mod error;
pub mod fetch;
pub mod geolocation;
pub mod location;
pub mod model;
pub mod openmeteo;
pub mod presentation;

pub use config::{Config, Endpoints, GeolocationMode};
pub use dashboard::{Dashboard, Trigger};
pub use error::{ErrorKind, GeolocationError, WeatherError};
pub use fetch::WeatherFetcher;
pub use geolocation::{FixedPosition, Geolocator, IpGeolocator, NoGeolocation};
pub use location::LocationResolver;
pub use model::{
    Coordinates, DailyForecast, Failure, RequestState, ResolvedLocation, WeatherSnapshot,
};
pub use openmeteo::OpenMeteoClient;
pub use presentation::IconCategory;
