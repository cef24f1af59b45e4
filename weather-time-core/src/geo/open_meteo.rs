use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{http, model::GeoLocation};

use super::Geocoder;

const SEARCH_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";

#[derive(Debug, Clone)]
pub struct OpenMeteoGeocoder {
    http: Client,
    language: String,
}

impl OpenMeteoGeocoder {
    pub fn new(http: Client, language: String) -> Self {
        Self { http, language }
    }
}

#[derive(Debug, Deserialize)]
struct OmSearchResponse {
    #[serde(default)]
    results: Vec<OmPlace>,
}

#[derive(Debug, Deserialize)]
struct OmPlace {
    name: String,
    latitude: f64,
    longitude: f64,
    country: Option<String>,
    country_code: Option<String>,
    admin1: Option<String>,
}

impl OmPlace {
    /// Whether any qualifier names this place's country, country code or region.
    fn matches(&self, qualifiers: &[&str]) -> bool {
        let fields = [&self.country, &self.country_code, &self.admin1];
        qualifiers.iter().any(|q| {
            let q = q.to_lowercase();
            fields
                .iter()
                .filter_map(|f| f.as_deref())
                .any(|f| f.to_lowercase() == q)
        })
    }
}

/// The search endpoint matches place names only, so "paris, texas" is sent
/// as "paris" and "texas" is used to pick among the results.
fn split_query(query: &str) -> (&str, Vec<&str>) {
    let mut parts = query.split(',').map(str::trim).filter(|p| !p.is_empty());
    let name = parts.next().unwrap_or_default();
    (name, parts.collect())
}

fn into_location(parsed: OmSearchResponse, qualifiers: &[&str]) -> Option<GeoLocation> {
    let place = if qualifiers.is_empty() {
        parsed.results.into_iter().next()?
    } else {
        parsed.results.into_iter().find(|p| p.matches(qualifiers))?
    };

    let display_name = [
        Some(place.name.as_str()),
        place.admin1.as_deref(),
        place.country.as_deref(),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(", ");

    Some(GeoLocation {
        name: place.name,
        display_name,
        latitude: place.latitude,
        longitude: place.longitude,
        country: place.country,
    })
}

#[async_trait]
impl Geocoder for OpenMeteoGeocoder {
    async fn geocode(&self, query: &str) -> Result<Option<GeoLocation>> {
        let (name, qualifiers) = split_query(query);
        let count = if qualifiers.is_empty() { "1" } else { "10" };

        let parsed: OmSearchResponse = http::get_json(
            &self.http,
            SEARCH_URL,
            &[
                ("name", name),
                ("count", count),
                ("language", self.language.as_str()),
                ("format", "json"),
            ],
            "Open-Meteo geocoding",
        )
        .await?;

        Ok(into_location(parsed, &qualifiers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_first_result() {
        let body = r#"{
            "results": [
                {"id": 2643743, "name": "London", "latitude": 51.50853, "longitude": -0.12574,
                 "country": "United Kingdom", "admin1": "England", "timezone": "Europe/London"},
                {"id": 6058560, "name": "London", "latitude": 42.98339, "longitude": -81.23304,
                 "country": "Canada", "admin1": "Ontario"}
            ],
            "generationtime_ms": 0.9
        }"#;
        let parsed: OmSearchResponse = serde_json::from_str(body).unwrap();
        let loc = into_location(parsed, &[]).unwrap();

        assert_eq!(loc.name, "London");
        assert_eq!(loc.display_name, "London, England, United Kingdom");
        assert_eq!(loc.country.as_deref(), Some("United Kingdom"));
        assert!((loc.latitude - 51.50853).abs() < 1e-9);
    }

    #[test]
    fn missing_results_is_no_match() {
        let parsed: OmSearchResponse =
            serde_json::from_str(r#"{"generationtime_ms": 0.2}"#).unwrap();
        assert!(into_location(parsed, &[]).is_none());
    }

    const PARIS_RESULTS: &str = r#"{
        "results": [
            {"name": "Paris", "latitude": 48.85341, "longitude": 2.3488,
             "country": "France", "country_code": "FR", "admin1": "Île-de-France"},
            {"name": "Paris", "latitude": 33.66094, "longitude": -95.55551,
             "country": "United States", "country_code": "US", "admin1": "Texas"}
        ]
    }"#;

    #[test]
    fn qualified_query_sends_place_name_only() {
        assert_eq!(split_query("paris, france"), ("paris", vec!["france"]));
        assert_eq!(split_query("paris, texas, us"), ("paris", vec!["texas", "us"]));
        assert_eq!(split_query("london"), ("london", vec![]));
        assert_eq!(split_query("london, "), ("london", vec![]));
    }

    #[test]
    fn qualifier_picks_matching_result() {
        let pick = |query: &str| {
            let parsed: OmSearchResponse = serde_json::from_str(PARIS_RESULTS).unwrap();
            let (_, qualifiers) = split_query(query);
            into_location(parsed, &qualifiers)
        };

        let france = pick("paris, france").unwrap();
        assert_eq!(france.country.as_deref(), Some("France"));

        let texas = pick("paris, texas").unwrap();
        assert_eq!(texas.display_name, "Paris, Texas, United States");

        let by_region = pick("paris, île-de-france").unwrap();
        assert_eq!(by_region.country.as_deref(), Some("France"));

        let by_code = pick("paris, us").unwrap();
        assert!((by_code.latitude - 33.66094).abs() < 1e-9);

        assert!(pick("paris, japan").is_none());
    }
}
