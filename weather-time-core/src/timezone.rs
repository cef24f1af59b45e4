//! Coordinates → IANA timezone.

use async_trait::async_trait;
use chrono_tz::Tz;
use reqwest::Client;
use serde::Deserialize;
use std::{fmt::Debug, sync::Arc};
use tracing::debug;

use crate::{
    error::{Error, Result},
    http,
};

/// A coordinate → timezone id backend.
///
/// `Ok(None)` means the point lies outside every known zone.
#[async_trait]
pub trait TimezoneLookup: Send + Sync + Debug {
    async fn timezone_at(&self, latitude: f64, longitude: f64) -> anyhow::Result<Option<String>>;
}

const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Uses Open-Meteo's `timezone=auto` resolution, which echoes back the zone
/// containing the requested point.
#[derive(Debug, Clone)]
pub struct OpenMeteoTimezone {
    http: Client,
}

impl OpenMeteoTimezone {
    pub fn new(http: Client) -> Self {
        Self { http }
    }
}

#[derive(Debug, Deserialize)]
struct OmTimezoneResponse {
    timezone: Option<String>,
}

#[async_trait]
impl TimezoneLookup for OpenMeteoTimezone {
    async fn timezone_at(&self, latitude: f64, longitude: f64) -> anyhow::Result<Option<String>> {
        let lat = latitude.to_string();
        let lon = longitude.to_string();

        let parsed: OmTimezoneResponse = http::get_json(
            &self.http,
            FORECAST_URL,
            &[
                ("latitude", lat.as_str()),
                ("longitude", lon.as_str()),
                ("timezone", "auto"),
                ("forecast_days", "1"),
            ],
            "Open-Meteo timezone",
        )
        .await?;

        Ok(parsed.timezone.filter(|tz| !tz.is_empty()))
    }
}

#[derive(Debug, Clone)]
pub struct TimezoneResolver {
    lookup: Arc<dyn TimezoneLookup>,
}

impl TimezoneResolver {
    pub fn new(lookup: Arc<dyn TimezoneLookup>) -> Self {
        Self { lookup }
    }

    /// `place` only labels errors.
    pub async fn resolve(&self, latitude: f64, longitude: f64, place: &str) -> Result<Tz> {
        debug!(latitude, longitude, "looking up timezone");

        let id = self
            .lookup
            .timezone_at(latitude, longitude)
            .await
            .map_err(|e| Error::unavailable("Timezone service", &e))?
            .ok_or_else(|| Error::TimezoneNotFound(place.to_string()))?;

        parse_timezone(&id).ok_or_else(|| Error::TimezoneNotFound(place.to_string()))
    }
}

/// Parse an IANA id against the bundled tz database.
pub fn parse_timezone(id: &str) -> Option<Tz> {
    id.trim().parse::<Tz>().ok()
}
