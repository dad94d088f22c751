use std::sync::Arc;

use anyhow::{Context, anyhow};
use clap::{Args, Parser, Subcommand};
use inquire::{InquireError, Select, Text};
use weather_core::{
    Config, Coordinates, Dashboard, FixedPosition, GeolocationMode, Geolocator, IpGeolocator,
    NoGeolocation, RequestState, presentation,
};

use crate::permission::AskingGeolocator;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Weather dashboard for the terminal")]
pub struct Cli {
    /// Log debug output to stderr (RUST_LOG takes precedence).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the default city and how your position is found.
    Configure,

    /// Show weather once, for a city or for where you are.
    Show {
        /// City to search for; omit to use your position.
        city: Option<String>,

        #[command(flatten)]
        locate: LocateArgs,

        /// Print the snapshot as JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Show weather for where you are, then search interactively.
    Dashboard {
        #[command(flatten)]
        locate: LocateArgs,
    },
}

#[derive(Debug, Args)]
pub struct LocateArgs {
    /// Use this position instead of looking it up, e.g. `--at 48.85,2.35`.
    #[arg(long, value_name = "LAT,LON", value_parser = parse_coordinates)]
    at: Option<Coordinates>,

    /// Pretend no position is available; the default city is used.
    #[arg(long, conflicts_with = "at")]
    no_locate: bool,

    /// Override the configured geolocation mode for this run (auto, ask, off).
    #[arg(long, value_name = "MODE", value_parser = parse_mode)]
    geolocation: Option<GeolocationMode>,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { city, locate, json } => {
                let config = Config::load()?;
                let dashboard = Dashboard::from_config(&config, geolocator(&config, &locate));

                let state = match city {
                    Some(city) => match dashboard.search(&city).await {
                        Some(state) => state,
                        None => {
                            eprintln!("Nothing to search for.");
                            return Ok(());
                        }
                    },
                    None => dashboard.load_initial().await,
                };

                print_state(&state, json)
            }
            Command::Dashboard { locate } => {
                let config = Config::load()?;
                let dashboard = Dashboard::from_config(&config, geolocator(&config, &locate));
                interactive(&dashboard).await
            }
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let city = Text::new("Default city:")
        .with_default(&config.default_city)
        .with_help_message("Shown when your position is unavailable")
        .prompt()
        .context("Failed to read default city")?;
    config.set_default_city(&city);

    let modes = GeolocationMode::all().to_vec();
    let cursor = modes
        .iter()
        .position(|m| *m == config.geolocation)
        .unwrap_or_default();
    config.geolocation = Select::new("Find your position:", modes)
        .with_starting_cursor(cursor)
        .with_help_message("auto: look it up, ask: ask every time, off: never")
        .prompt()
        .context("Failed to read geolocation mode")?;

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn interactive(dashboard: &Dashboard) -> anyhow::Result<()> {
    eprintln!("{}", presentation::render(&RequestState::Loading));
    let state = dashboard.load_initial().await;
    println!("{}", presentation::render(&state));

    loop {
        let query = match Text::new("Search for a city...").prompt() {
            Ok(query) => query,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(err) => return Err(err).context("Failed to read search input"),
        };

        if query.trim().is_empty() {
            continue;
        }

        eprintln!("{}", presentation::render(&RequestState::Loading));
        if let Some(state) = dashboard.search(&query).await {
            println!("{}", presentation::render(&state));
        }
    }

    Ok(())
}

fn print_state(state: &RequestState, json: bool) -> anyhow::Result<()> {
    match state {
        RequestState::Success(snapshot) if json => {
            let text = serde_json::to_string_pretty(snapshot)
                .context("Failed to serialize weather snapshot")?;
            println!("{text}");
            Ok(())
        }
        RequestState::Success(_) => {
            print!("{}", presentation::render(state));
            Ok(())
        }
        RequestState::Failed(failure) => Err(anyhow!(failure.message.clone())),
        RequestState::Idle | RequestState::Loading => Ok(()),
    }
}

fn geolocator(config: &Config, args: &LocateArgs) -> Arc<dyn Geolocator> {
    if args.no_locate {
        return Arc::new(NoGeolocation);
    }
    if let Some(at) = args.at {
        return Arc::new(FixedPosition(at));
    }

    match args.geolocation.unwrap_or(config.geolocation) {
        GeolocationMode::Off => Arc::new(NoGeolocation),
        GeolocationMode::Auto => Arc::new(IpGeolocator::new(&config.endpoints.ip_lookup, true)),
        GeolocationMode::Ask => Arc::new(AskingGeolocator::new(&config.endpoints.ip_lookup)),
    }
}

fn parse_mode(value: &str) -> Result<GeolocationMode, String> {
    GeolocationMode::try_from(value).map_err(|err| err.to_string())
}

fn parse_coordinates(value: &str) -> Result<Coordinates, String> {
    let (lat, lon) = value
        .split_once(',')
        .ok_or_else(|| format!("expected LAT,LON but got '{value}'"))?;

    let lat: f64 = lat
        .trim()
        .parse()
        .map_err(|_| format!("invalid latitude '{}'", lat.trim()))?;
    let lon: f64 = lon
        .trim()
        .parse()
        .map_err(|_| format!("invalid longitude '{}'", lon.trim()))?;

    if !(-90.0..=90.0).contains(&lat) {
        return Err(format!("latitude {lat} is outside -90..=90"));
    }
    if !(-180.0..=180.0).contains(&lon) {
        return Err(format!("longitude {lon} is outside -180..=180"));
    }

    Ok(Coordinates::new(lat, lon))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_coordinates() {
        assert_eq!(
            parse_coordinates("48.85, 2.35"),
            Ok(Coordinates::new(48.85, 2.35))
        );
        assert!(parse_coordinates("48.85").is_err());
        assert!(parse_coordinates("north,2").is_err());
        assert!(parse_coordinates("91,0").is_err());
        assert!(parse_coordinates("0,-181").is_err());
    }

    #[test]
    fn show_accepts_city_and_flags() {
        let cli = Cli::try_parse_from(["weather", "show", "Paris", "--json"]).unwrap();
        match cli.command {
            Command::Show { city, json, locate } => {
                assert_eq!(city.as_deref(), Some("Paris"));
                assert!(json);
                assert!(!locate.no_locate);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn at_and_no_locate_conflict() {
        let res = Cli::try_parse_from(["weather", "dashboard", "--at", "1,2", "--no-locate"]);
        assert!(res.is_err());
    }

    #[test]
    fn flags_pick_the_geolocator() {
        let config = Config::default();

        let off = LocateArgs {
            at: None,
            no_locate: true,
            geolocation: None,
        };
        assert!(!geolocator(&config, &off).is_available());

        let fixed = LocateArgs {
            at: Some(Coordinates::new(1.0, 2.0)),
            no_locate: false,
            geolocation: None,
        };
        assert!(geolocator(&config, &fixed).is_available());

        let config = Config {
            geolocation: GeolocationMode::Off,
            ..Config::default()
        };
        let none = LocateArgs {
            at: None,
            no_locate: false,
            geolocation: None,
        };
        assert!(!geolocator(&config, &none).is_available());

        let overridden = LocateArgs {
            at: None,
            no_locate: false,
            geolocation: Some(GeolocationMode::Auto),
        };
        assert!(geolocator(&config, &overridden).is_available());
    }

    #[test]
    fn ask_mode_builds_without_prompting() {
        let config = Config {
            geolocation: GeolocationMode::Ask,
            ..Config::default()
        };
        let args = LocateArgs {
            at: None,
            no_locate: false,
            geolocation: None,
        };

        // Building must not block on a prompt; asking happens on first use.
        assert!(geolocator(&config, &args).is_available());
    }

    #[test]
    fn geolocation_override_is_parsed() {
        let cli = Cli::try_parse_from(["weather", "show", "Paris", "--geolocation", "OFF"]).unwrap();
        match cli.command {
            Command::Show { locate, .. } => {
                assert_eq!(locate.geolocation, Some(GeolocationMode::Off));
            }
            other => panic!("unexpected command: {other:?}"),
        }

        let err = Cli::try_parse_from(["weather", "show", "--geolocation", "maybe"]).unwrap_err();
        assert!(err.to_string().contains("Unknown geolocation mode"));
    }

    #[test]
    fn failed_state_becomes_an_error() {
        let state = RequestState::Failed(weather_core::Failure {
            kind: weather_core::ErrorKind::NotFound,
            message: "Could not find weather for \"Zzzxyq\".".into(),
        });
        let err = print_state(&state, false).unwrap_err();
        assert_eq!(err.to_string(), "Could not find weather for \"Zzzxyq\".");
    }
}
