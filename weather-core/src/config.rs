use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

/// City resolved when no position is available on the initial load.
pub const DEFAULT_CITY: &str = "Patna";

pub const DEFAULT_FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
pub const DEFAULT_GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
pub const DEFAULT_IP_LOOKUP_URL: &str = "http://ip-api.com/json";

/// How the initial load is allowed to find the user's position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GeolocationMode {
    /// Look the position up without asking.
    #[default]
    Auto,
    /// Ask for permission on every run.
    Ask,
    /// No positioning capability at all.
    Off,
}

impl GeolocationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeolocationMode::Auto => "auto",
            GeolocationMode::Ask => "ask",
            GeolocationMode::Off => "off",
        }
    }

    pub const fn all() -> &'static [GeolocationMode] {
        &[GeolocationMode::Auto, GeolocationMode::Ask, GeolocationMode::Off]
    }
}

impl std::fmt::Display for GeolocationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for GeolocationMode {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "auto" => Ok(GeolocationMode::Auto),
            "ask" => Ok(GeolocationMode::Ask),
            "off" => Ok(GeolocationMode::Off),
            _ => Err(anyhow!(
                "Unknown geolocation mode '{value}'. Supported modes: auto, ask, off."
            )),
        }
    }
}

/// Base URLs of the services the dashboard talks to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub forecast: String,
    pub geocoding: String,
    pub ip_lookup: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            forecast: DEFAULT_FORECAST_URL.to_string(),
            geocoding: DEFAULT_GEOCODING_URL.to_string(),
            ip_lookup: DEFAULT_IP_LOOKUP_URL.to_string(),
        }
    }
}

impl Endpoints {
    /// Point every endpoint at one base URL. Used against mock servers.
    pub fn all_at(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            forecast: format!("{base}/v1/forecast"),
            geocoding: format!("{base}/v1/search"),
            ip_lookup: format!("{base}/json"),
        }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// default_city = "Patna"
/// geolocation = "ask"
///
/// [endpoints]
/// forecast = "https://api.open-meteo.com/v1/forecast"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub default_city: String,
    pub geolocation: GeolocationMode,
    pub endpoints: Endpoints,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_city: DEFAULT_CITY.to_string(),
            geolocation: GeolocationMode::default(),
            endpoints: Endpoints::default(),
        }
    }
}

impl Config {
    /// Load config from disk, or return the defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let mut cfg: Config = toml::from_str(contents)?;
        cfg.normalize();
        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::debug!(path = %path.display(), "configuration saved");
        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-dash", "weather-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Replace the fallback city. Blank input restores the built-in default.
    pub fn set_default_city(&mut self, city: &str) {
        let city = city.trim();
        self.default_city = if city.is_empty() {
            DEFAULT_CITY.to_string()
        } else {
            city.to_string()
        };
    }

    fn normalize(&mut self) {
        let city = self.default_city.clone();
        self.set_default_city(&city);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fall_back_to_patna() {
        let cfg = Config::default();

        assert_eq!(cfg.default_city, "Patna");
        assert_eq!(cfg.geolocation, GeolocationMode::Auto);
        assert_eq!(cfg.endpoints.forecast, DEFAULT_FORECAST_URL);
    }

    #[test]
    fn partial_toml_keeps_remaining_defaults() {
        let cfg = Config::from_toml("geolocation = \"off\"\n").expect("valid toml");

        assert_eq!(cfg.geolocation, GeolocationMode::Off);
        assert_eq!(cfg.default_city, DEFAULT_CITY);
        assert_eq!(cfg.endpoints, Endpoints::default());
    }

    #[test]
    fn blank_default_city_is_restored() {
        let cfg = Config::from_toml("default_city = \"   \"\n").expect("valid toml");
        assert_eq!(cfg.default_city, DEFAULT_CITY);

        let mut cfg = Config::default();
        cfg.set_default_city("  Lisbon ");
        assert_eq!(cfg.default_city, "Lisbon");
    }

    #[test]
    fn endpoint_overrides_are_read() {
        let cfg = Config::from_toml(
            "[endpoints]\ngeocoding = \"http://localhost:9000/v1/search\"\n",
        )
        .expect("valid toml");

        assert_eq!(cfg.endpoints.geocoding, "http://localhost:9000/v1/search");
        assert_eq!(cfg.endpoints.forecast, DEFAULT_FORECAST_URL);
    }

    #[test]
    fn toml_roundtrip_preserves_fields() {
        let mut cfg = Config::default();
        cfg.set_default_city("Oslo");
        cfg.geolocation = GeolocationMode::Ask;

        let text = toml::to_string_pretty(&cfg).expect("serializable");
        let parsed = Config::from_toml(&text).expect("parseable");

        assert_eq!(parsed, cfg);
    }

    #[test]
    fn unknown_geolocation_mode_error() {
        let err = GeolocationMode::try_from("sometimes").unwrap_err();
        assert!(err.to_string().contains("Unknown geolocation mode"));

        for mode in GeolocationMode::all() {
            assert_eq!(GeolocationMode::try_from(mode.as_str()).ok(), Some(*mode));
        }
    }

    #[test]
    fn endpoints_all_at_trims_trailing_slash() {
        let endpoints = Endpoints::all_at("http://127.0.0.1:4000/");
        assert_eq!(endpoints.forecast, "http://127.0.0.1:4000/v1/forecast");
        assert_eq!(endpoints.geocoding, "http://127.0.0.1:4000/v1/search");
        assert_eq!(endpoints.ip_lookup, "http://127.0.0.1:4000/json");
    }
}
