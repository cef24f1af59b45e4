use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{http, model::GeoLocation};

use super::Geocoder;

const SEARCH_URL: &str = "https://nominatim.openstreetmap.org/search";

/// OpenStreetMap Nominatim search. Requires a User-Agent, which the shared
/// client always sends.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    http: Client,
    language: String,
}

impl NominatimGeocoder {
    pub fn new(http: Client, language: String) -> Self {
        Self { http, language }
    }
}

#[derive(Debug, Deserialize)]
struct NmPlace {
    // Nominatim returns coordinates as strings.
    lat: String,
    lon: String,
    display_name: String,
    name: Option<String>,
    address: Option<NmAddress>,
}

#[derive(Debug, Deserialize)]
struct NmAddress {
    country: Option<String>,
}

fn into_location(places: Vec<NmPlace>) -> Result<Option<GeoLocation>> {
    let Some(place) = places.into_iter().next() else {
        return Ok(None);
    };

    let latitude: f64 = place
        .lat
        .parse()
        .with_context(|| format!("Nominatim returned invalid latitude '{}'", place.lat))?;
    let longitude: f64 = place
        .lon
        .parse()
        .with_context(|| format!("Nominatim returned invalid longitude '{}'", place.lon))?;

    let name = place
        .name
        .filter(|n| !n.is_empty())
        .or_else(|| place.display_name.split(", ").next().map(str::to_string))
        .unwrap_or_else(|| place.display_name.clone());

    // Fall back to the last address component, as Nominatim lists the country last.
    let country = place
        .address
        .and_then(|a| a.country)
        .or_else(|| place.display_name.rsplit(", ").next().map(str::to_string));

    Ok(Some(GeoLocation {
        name,
        display_name: place.display_name,
        latitude,
        longitude,
        country,
    }))
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, query: &str) -> Result<Option<GeoLocation>> {
        let places: Vec<NmPlace> = http::get_json(
            &self.http,
            SEARCH_URL,
            &[
                ("q", query),
                ("format", "jsonv2"),
                ("limit", "1"),
                ("addressdetails", "1"),
                ("accept-language", self.language.as_str()),
            ],
            "Nominatim",
        )
        .await?;

        into_location(places)
    }
}
