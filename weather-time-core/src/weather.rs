//! Weather lookups with an explicit live/demo outcome.

use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::{
    Config, demo,
    error::{Error, Result},
    model::{ForecastReport, Units, WeatherReport},
    provider::WeatherProvider,
};

pub const MAX_FORECAST_DAYS: u32 = 5;

/// Why demo data was served instead of live data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum FallbackReason {
    NoCredential,
    LiveFailed(String),
}

/// Where a result came from. The demo branch is only taken after the single
/// live attempt failed or was impossible.
#[derive(Debug, Clone, PartialEq)]
pub enum Sourced<T> {
    Live(T),
    Demo { data: T, reason: FallbackReason },
}

impl<T> Sourced<T> {
    pub fn into_inner(self) -> T {
        match self {
            Sourced::Live(data) | Sourced::Demo { data, .. } => data,
        }
    }

    pub fn is_demo(&self) -> bool {
        matches!(self, Sourced::Demo { .. })
    }

    pub fn fallback_reason(&self) -> Option<&FallbackReason> {
        match self {
            Sourced::Live(_) => None,
            Sourced::Demo { reason, .. } => Some(reason),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WeatherClient {
    provider: Option<Arc<dyn WeatherProvider>>,
    default_units: Units,
}

impl WeatherClient {
    /// `provider` is `None` when no credential is configured.
    pub fn new(config: &Config, provider: Option<Arc<dyn WeatherProvider>>) -> Self {
        Self {
            provider,
            default_units: config.units,
        }
    }

    pub fn default_units(&self) -> Units {
        self.default_units
    }

    pub fn is_live(&self) -> bool {
        self.provider.is_some()
    }

    pub async fn get_current(&self, city: &str, units: Units) -> Result<WeatherReport> {
        self.fetch_current(city, units).await.map(Sourced::into_inner)
    }

    pub async fn get_forecast(
        &self,
        city: &str,
        days: u32,
        units: Units,
    ) -> Result<ForecastReport> {
        self.fetch_forecast(city, days, units).await.map(Sourced::into_inner)
    }

    pub async fn fetch_current(&self, city: &str, units: Units) -> Result<Sourced<WeatherReport>> {
        let city = require_city(city)?;

        let reason = match &self.provider {
            None => FallbackReason::NoCredential,
            Some(provider) => match provider.current(city).await {
                Ok(report) => {
                    debug!(%city, "live weather");
                    return Ok(Sourced::Live(report.convert(units)));
                }
                Err(e) => live_failed(city, &e),
            },
        };

        let record = demo_record(city, &reason)?;
        Ok(Sourced::Demo {
            data: record.report().convert(units),
            reason,
        })
    }

    pub async fn fetch_forecast(
        &self,
        city: &str,
        days: u32,
        units: Units,
    ) -> Result<Sourced<ForecastReport>> {
        let city = require_city(city)?;
        let days = forecast_days(days)?;

        let reason = match &self.provider {
            None => FallbackReason::NoCredential,
            Some(provider) => match provider.forecast(city, days).await {
                Ok(report) if report.days.len() == usize::from(days) => {
                    debug!(%city, days, "live forecast");
                    return Ok(Sourced::Live(report.convert(units)));
                }
                Ok(report) => live_failed(
                    city,
                    &anyhow::anyhow!(
                        "provider returned {} day(s), expected {days}",
                        report.days.len()
                    ),
                ),
                Err(e) => live_failed(city, &e),
            },
        };

        let record = demo_record(city, &reason)?;
        let start = Utc::now().date_naive();
        Ok(Sourced::Demo {
            data: record.forecast(start, days).convert(units),
            reason,
        })
    }
}

fn require_city(city: &str) -> Result<&str> {
    let city = city.trim();
    if city.is_empty() {
        return Err(Error::invalid("City name cannot be empty. Please provide a valid city name."));
    }
    Ok(city)
}

fn forecast_days(days: u32) -> Result<u8> {
    if (1..=MAX_FORECAST_DAYS).contains(&days) {
        Ok(days as u8)
    } else {
        Err(Error::invalid(format!(
            "Forecast days must be between 1 and {MAX_FORECAST_DAYS}, got {days}."
        )))
    }
}

fn live_failed(city: &str, err: &anyhow::Error) -> FallbackReason {
    warn!(%city, error = %format!("{err:#}"), "live weather lookup failed, trying demo data");
    FallbackReason::LiveFailed(format!("{err:#}"))
}

fn demo_record(city: &str, reason: &FallbackReason) -> Result<&'static demo::DemoRecord> {
    demo::lookup(city).ok_or_else(|| {
        let why = match reason {
            FallbackReason::NoCredential => "No OPENWEATHER_API_KEY is configured".to_string(),
            FallbackReason::LiveFailed(e) => format!("The live lookup failed ({e})"),
        };
        Error::DataUnavailable(format!(
            "Weather data not available for '{city}'. {why} and demo data only covers: {}.",
            demo::supported_cities()
        ))
    })
}
