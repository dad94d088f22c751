use std::fmt;

/// Errors a fetch cycle can end with. None of them are fatal; a new search retries.
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    /// The geocoder answered, but with no matches for the query.
    #[error("no location named \"{0}\"")]
    NotFound(String),

    #[error("location lookup failed")]
    LookupFailed(#[source] anyhow::Error),

    #[error("weather fetch failed")]
    FetchFailed(#[source] anyhow::Error),
}

impl WeatherError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WeatherError::NotFound(_) => ErrorKind::NotFound,
            WeatherError::LookupFailed(_) => ErrorKind::LookupFailed,
            WeatherError::FetchFailed(_) => ErrorKind::FetchFailed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    LookupFailed,
    FetchFailed,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::LookupFailed => "lookup_failed",
            ErrorKind::FetchFailed => "fetch_failed",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Platform positioning failures. The resolver recovers from all of these.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeolocationError {
    #[error("geolocation is not available")]
    Unavailable,
    #[error("geolocation permission denied")]
    PermissionDenied,
    #[error("geolocation failed: {0}")]
    Failed(String),
}
