//! City name → coordinates.

use async_trait::async_trait;
use reqwest::Client;
use std::{convert::TryFrom, fmt::Debug, sync::Arc};
use tracing::debug;

use crate::{
    Config,
    error::{Error, Result},
    geo::{nominatim::NominatimGeocoder, open_meteo::OpenMeteoGeocoder},
    model::GeoLocation,
};

pub mod nominatim;
pub mod open_meteo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeocoderId {
    OpenMeteo,
    Nominatim,
}

impl GeocoderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeocoderId::OpenMeteo => "open-meteo",
            GeocoderId::Nominatim => "nominatim",
        }
    }

    pub const fn all() -> &'static [GeocoderId] {
        &[GeocoderId::OpenMeteo, GeocoderId::Nominatim]
    }
}

impl std::fmt::Display for GeocoderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for GeocoderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.trim().to_lowercase();

        match lower.as_str() {
            "open-meteo" | "openmeteo" => Ok(GeocoderId::OpenMeteo),
            "nominatim" => Ok(GeocoderId::Nominatim),
            _ => Err(anyhow::anyhow!(
                "Unknown geocoder '{value}'. Supported geocoders: open-meteo, nominatim."
            )),
        }
    }
}

/// A free-text place search backend.
///
/// `Ok(None)` means the provider answered but had no match.
#[async_trait]
pub trait Geocoder: Send + Sync + Debug {
    async fn geocode(&self, query: &str) -> anyhow::Result<Option<GeoLocation>>;
}

pub fn geocoder_from_config(id: GeocoderId, config: &Config, http: Client) -> Arc<dyn Geocoder> {
    match id {
        GeocoderId::OpenMeteo => Arc::new(OpenMeteoGeocoder::new(http, config.language.clone())),
        GeocoderId::Nominatim => Arc::new(NominatimGeocoder::new(http, config.language.clone())),
    }
}

/// Trim, lowercase and collapse internal whitespace.
pub fn normalize_query(city: &str) -> String {
    city.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

#[derive(Debug, Clone)]
pub struct GeoResolver {
    geocoder: Arc<dyn Geocoder>,
}

impl GeoResolver {
    pub fn new(geocoder: Arc<dyn Geocoder>) -> Self {
        Self { geocoder }
    }

    /// Single attempt, no retries. Callers choose how to degrade.
    pub async fn resolve(&self, city: &str) -> Result<GeoLocation> {
        let query = normalize_query(city);
        if query.is_empty() {
            return Err(Error::invalid(
                "City name cannot be empty. Please provide a valid city name.",
            ));
        }

        debug!(%query, "geocoding");
        let found = self
            .geocoder
            .geocode(&query)
            .await
            .map_err(|e| Error::unavailable("Geocoding service", &e))?;

        let location = found.ok_or_else(|| Error::NotFound(city.trim().to_string()))?;
        if !location.has_valid_coordinates() {
            return Err(Error::ServiceUnavailable(format!(
                "Geocoding service returned out-of-range coordinates ({}, {}) for '{}'",
                location.latitude,
                location.longitude,
                city.trim()
            )));
        }

        debug!(
            name = %location.display_name,
            lat = location.latitude,
            lon = location.longitude,
            "geocoded"
        );
        Ok(location)
    }
}
