use async_trait::async_trait;
use inquire::Confirm;
use weather_core::{Coordinates, GeolocationError, Geolocator, IpGeolocator};

/// IP positioning that asks for permission the first time a position is needed.
///
/// Nothing is asked when the geolocator is built, so a city search never
/// prompts.
#[derive(Debug, Clone)]
pub struct AskingGeolocator {
    url: String,
    ask: fn() -> bool,
}

impl AskingGeolocator {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_prompt(url, confirm_on_terminal)
    }

    pub fn with_prompt(url: impl Into<String>, ask: fn() -> bool) -> Self {
        Self {
            url: url.into(),
            ask,
        }
    }
}

#[async_trait]
impl Geolocator for AskingGeolocator {
    fn is_available(&self) -> bool {
        true
    }

    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        let permitted = (self.ask)();
        IpGeolocator::new(self.url.clone(), permitted)
            .current_position()
            .await
    }
}

fn confirm_on_terminal() -> bool {
    Confirm::new("Allow weather to look up your approximate location?")
        .with_default(true)
        .prompt()
        .unwrap_or_else(|err| {
            tracing::debug!(error = %err, "permission prompt failed, treating as denied");
            false
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static ASKED: AtomicUsize = AtomicUsize::new(0);

    fn decline() -> bool {
        ASKED.fetch_add(1, Ordering::SeqCst);
        false
    }

    #[tokio::test]
    async fn asks_only_when_position_is_requested() {
        let geo = AskingGeolocator::with_prompt("http://127.0.0.1:9/json", decline);
        assert!(geo.is_available());
        assert_eq!(ASKED.load(Ordering::SeqCst), 0);

        let res = geo.current_position().await;

        assert_eq!(res, Err(GeolocationError::PermissionDenied));
        assert_eq!(ASKED.load(Ordering::SeqCst), 1);
    }
}
