//! Positioning capabilities the resolver can ask for the user's coordinates.
//!
//! A [`Geolocator`] answers two questions: is positioning possible at all,
//! and where are we right now. The resolver treats every failure here as a
//! reason to fall back to the default city.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::fmt::Debug;

use crate::{error::GeolocationError, model::Coordinates};

#[async_trait]
pub trait Geolocator: Send + Sync + Debug {
    /// Whether the capability exists on this platform at all.
    fn is_available(&self) -> bool;

    /// Single position request.
    async fn current_position(&self) -> Result<Coordinates, GeolocationError>;
}

/// No positioning on this platform.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGeolocation;

#[async_trait]
impl Geolocator for NoGeolocation {
    fn is_available(&self) -> bool {
        false
    }

    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        Err(GeolocationError::Unavailable)
    }
}

/// Always reports the same position, e.g. one passed on the command line.
#[derive(Debug, Clone, Copy)]
pub struct FixedPosition(pub Coordinates);

#[async_trait]
impl Geolocator for FixedPosition {
    fn is_available(&self) -> bool {
        true
    }

    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        Ok(self.0)
    }
}

/// Approximate position from the public IP address.
///
/// `permitted` plays the role of the user's consent: without it every
/// request ends in [`GeolocationError::PermissionDenied`] and no traffic
/// is sent.
#[derive(Debug, Clone)]
pub struct IpGeolocator {
    http: Client,
    url: String,
    permitted: bool,
}

impl IpGeolocator {
    pub fn new(url: impl Into<String>, permitted: bool) -> Self {
        Self {
            http: Client::new(),
            url: url.into(),
            permitted,
        }
    }
}

#[derive(Debug, Deserialize)]
struct IpLookupResponse {
    status: String,
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

#[async_trait]
impl Geolocator for IpGeolocator {
    fn is_available(&self) -> bool {
        true
    }

    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        if !self.permitted {
            return Err(GeolocationError::PermissionDenied);
        }

        let res = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|e| GeolocationError::Failed(e.to_string()))?;

        if !res.status().is_success() {
            return Err(GeolocationError::Failed(format!(
                "lookup returned status {}",
                res.status()
            )));
        }

        let body: IpLookupResponse = res
            .json()
            .await
            .map_err(|e| GeolocationError::Failed(e.to_string()))?;

        match (body.status.as_str(), body.lat, body.lon) {
            ("success", Some(lat), Some(lon)) => Ok(Coordinates::new(lat, lon)),
            _ => Err(GeolocationError::Failed(
                body.message
                    .unwrap_or_else(|| format!("lookup status '{}'", body.status)),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn no_geolocation_is_unavailable() {
        let geo = NoGeolocation;
        assert!(!geo.is_available());
        assert_eq!(
            geo.current_position().await,
            Err(GeolocationError::Unavailable)
        );
    }

    #[tokio::test]
    async fn fixed_position_reports_its_coordinates() {
        let geo = FixedPosition(Coordinates::new(51.5, -0.12));
        assert_eq!(geo.current_position().await, Ok(Coordinates::new(51.5, -0.12)));
    }

    #[tokio::test]
    async fn ip_lookup_success() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "success",
                "city": "Lyon",
                "lat": 45.75,
                "lon": 4.85
            })))
            .mount(&server)
            .await;

        let geo = IpGeolocator::new(format!("{}/json", server.uri()), true);
        assert_eq!(geo.current_position().await, Ok(Coordinates::new(45.75, 4.85)));
    }

    #[tokio::test]
    async fn ip_lookup_failure_status_is_reported() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "fail",
                "message": "reserved range"
            })))
            .mount(&server)
            .await;

        let geo = IpGeolocator::new(format!("{}/json", server.uri()), true);
        assert_eq!(
            geo.current_position().await,
            Err(GeolocationError::Failed("reserved range".into()))
        );
    }

    #[tokio::test]
    async fn ip_lookup_without_permission_sends_nothing() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let geo = IpGeolocator::new(format!("{}/json", server.uri()), false);
        assert_eq!(
            geo.current_position().await,
            Err(GeolocationError::PermissionDenied)
        );
    }
}
