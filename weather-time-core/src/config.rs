use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf, time::Duration};
use tracing::warn;

use crate::{geo::GeocoderId, model::Units};

pub const DEFAULT_OPENWEATHER_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// Process-wide settings. Built once at startup and then only borrowed.
///
/// Example TOML:
/// ```toml
/// openweather_api_key = "..."
/// units = "imperial"
/// geocoder = "nominatim"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Presence switches the weather client from demo to live mode.
    pub openweather_api_key: Option<String>,
    pub openweather_base_url: String,
    pub units: Units,
    pub language: String,
    pub timeout_secs: u64,
    /// Geocoder short name, e.g. "open-meteo" or "nominatim".
    pub geocoder: String,
    pub world_clock_limit: usize,
    /// Upper bound on concurrent lookups in a world-clock request.
    /// Ignored for nominatim, whose usage policy allows one request at a time.
    pub concurrency: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openweather_api_key: None,
            openweather_base_url: DEFAULT_OPENWEATHER_BASE_URL.to_string(),
            units: Units::Metric,
            language: "en".to_string(),
            timeout_secs: 10,
            geocoder: GeocoderId::OpenMeteo.as_str().to_string(),
            world_clock_limit: 10,
            concurrency: 4,
        }
    }
}

impl Config {
    /// Full startup load: config file, then `.env`, then the process environment.
    pub fn from_env() -> Result<Self> {
        if let Err(e) = dotenvy::dotenv()
            && !e.not_found()
        {
            warn!(error = %e, "ignoring malformed .env file");
        }

        let mut cfg = Self::load()?;
        cfg.apply_env(|key| std::env::var(key).ok())?;
        Ok(cfg)
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        cfg.validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-time", "weather-time")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Overlay environment variables read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(key) = get("OPENWEATHER_API_KEY") {
            self.openweather_api_key = Some(key);
        }
        if let Some(url) = get("OPENWEATHER_BASE_URL") {
            self.openweather_base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(units) = get("WEATHER_UNITS") {
            self.units = Units::try_from(units.as_str())
                .map_err(|e| anyhow!("Invalid WEATHER_UNITS: {e}"))?;
        }
        if let Some(lang) = get("WEATHER_LANGUAGE") {
            self.language = lang;
        }
        if let Some(secs) = get("REQUEST_TIMEOUT_SECS") {
            self.timeout_secs = parse_positive("REQUEST_TIMEOUT_SECS", &secs)? as u64;
        }
        if let Some(geocoder) = get("GEOCODER") {
            GeocoderId::try_from(geocoder.as_str())
                .map_err(|e| anyhow!("Invalid GEOCODER: {e}"))?;
            self.geocoder = geocoder;
        }
        if let Some(limit) = get("WORLD_CLOCK_LIMIT") {
            self.world_clock_limit = parse_positive("WORLD_CLOCK_LIMIT", &limit)?;
        }
        if let Some(n) = get("LOOKUP_CONCURRENCY") {
            self.concurrency = parse_positive("LOOKUP_CONCURRENCY", &n)?;
        }

        Ok(())
    }

    /// Reject values that would otherwise have to be silently corrected.
    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            return Err(anyhow!("Invalid timeout_secs: expected a positive integer, got 0"));
        }
        if self.world_clock_limit == 0 {
            return Err(anyhow!("Invalid world_clock_limit: expected a positive integer, got 0"));
        }
        if self.concurrency == 0 {
            return Err(anyhow!("Invalid concurrency: expected a positive integer, got 0"));
        }
        self.geocoder_id().map_err(|e| anyhow!("Invalid geocoder: {e}"))?;
        Ok(())
    }

    pub fn has_weather_api_key(&self) -> bool {
        self.openweather_api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }

    pub fn geocoder_id(&self) -> Result<GeocoderId> {
        GeocoderId::try_from(self.geocoder.as_str())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Non-fatal problems worth reporting at startup.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if !self.has_weather_api_key() {
            warnings.push(
                "OPENWEATHER_API_KEY is not set; weather tools will serve demo data.\n\
                 Hint: get a free key at https://openweathermap.org/api and run \
                 `weather-time configure`, or export OPENWEATHER_API_KEY."
                    .to_string(),
            );
        }
        let nominatim = self.geocoder_id().is_ok_and(|id| id == GeocoderId::Nominatim);
        if nominatim && self.concurrency > 1 {
            warnings.push(
                "Nominatim allows one request per second; world-clock lookups run one at a time."
                    .to_string(),
            );
        }

        warnings
    }
}

fn parse_positive(name: &str, value: &str) -> Result<usize> {
    match value.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(anyhow!("Invalid {name}: expected a positive integer, got '{value}'")),
    }
}
