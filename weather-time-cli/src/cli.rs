use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::warn;
use weather_time_core::{Config, ToolResponse, ToolSurface, Units, tools};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-time", version, about = "Weather, world clock and city lookup tools")]
pub struct Cli {
    /// Print the full JSON tool response instead of the report.
    #[arg(long, global = true)]
    pub json: bool,

    /// Debug logging (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and default units.
    Configure,

    /// Current weather for a city.
    Weather {
        city: String,

        /// metric, imperial or kelvin; defaults to the configured units.
        #[arg(long)]
        units: Option<String>,
    },

    /// Daily forecast for a city.
    Forecast {
        city: String,

        /// Number of days, 1 to 5.
        #[arg(long, default_value_t = tools::DEFAULT_FORECAST_DAYS, allow_negative_numbers = true)]
        days: i64,

        #[arg(long)]
        units: Option<String>,
    },

    /// Current local time in a city.
    Time {
        city: String,

        /// standard, detailed or utc.
        #[arg(long)]
        format: Option<String>,
    },

    /// Time difference between two cities (positive: first city is ahead).
    Diff { city1: String, city2: String },

    /// Current time in several cities.
    Clock {
        #[arg(required = true)]
        cities: Vec<String>,
    },

    /// Coordinates, timezone and address of a city.
    City { city: String },

    /// Print the tool definitions an agent host can register.
    Tools,

    /// Answer one JSON tool request per stdin line.
    Serve,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let response = match self.command {
            Command::Configure => return configure(),
            Command::Tools => {
                println!("{}", serde_json::to_string_pretty(&tools::definitions())?);
                return Ok(());
            }
            Command::Serve => return crate::serve::run(&build_surface()?).await,
            Command::Weather { city, units } => {
                build_surface()?.get_weather(&city, units.as_deref()).await
            }
            Command::Forecast { city, days, units } => {
                build_surface()?
                    .get_weather_forecast(&city, Some(days), units.as_deref())
                    .await
            }
            Command::Time { city, format } => {
                build_surface()?
                    .get_current_time(&city, format.as_deref())
                    .await
            }
            Command::Diff { city1, city2 } => {
                build_surface()?.get_time_difference(&city1, &city2).await
            }
            Command::Clock { cities } => build_surface()?.get_world_clock(&cities).await,
            Command::City { city } => build_surface()?.get_city_info(&city).await,
        };

        print_response(&response, self.json)
    }
}

fn build_surface() -> anyhow::Result<ToolSurface> {
    let config = Config::from_env()?;
    for warning in config.warnings() {
        warn!("{warning}");
    }
    ToolSurface::from_config(&config)
}

fn print_response(response: &ToolResponse, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(response)?);
        return Ok(());
    }

    if response.is_success() {
        println!("{}", response.report);
        Ok(())
    } else {
        Err(anyhow::anyhow!("{}", response.report))
    }
}

fn configure() -> anyhow::Result<()> {
    // File values only; env overrides must not be persisted.
    let mut cfg = Config::load()?;

    let key = inquire::Password::new("OpenWeather API key (leave empty to keep the current one):")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    if !key.trim().is_empty() {
        cfg.openweather_api_key = Some(key.trim().to_string());
    }

    let units = inquire::Select::new("Default units:", Units::all().to_vec())
        .with_starting_cursor(Units::all().iter().position(|u| *u == cfg.units).unwrap_or(0))
        .prompt()
        .context("Failed to read default units")?;
    cfg.units = units;

    cfg.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());

    if !cfg.has_weather_api_key() {
        println!("No API key stored: weather tools will keep serving demo data.");
    }

    Ok(())
}
