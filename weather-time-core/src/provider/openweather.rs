use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::{
    http,
    model::{ForecastDay, ForecastReport, Units, WeatherReport},
};

use super::WeatherProvider;

/// The 5-day forecast endpoint returns one slot every three hours.
const SLOTS_PER_DAY: usize = 8;

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    language: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String, base_url: String, language: String, http: Client) -> Self {
        Self {
            api_key,
            base_url,
            language,
            http,
        }
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{endpoint}", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: Option<f64>,
    humidity: u8,
    #[serde(default)]
    pressure: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

#[derive(Debug, Default, Deserialize)]
struct OwWind {
    #[serde(default)]
    speed: f64,
}

#[derive(Debug, Default, Deserialize)]
struct OwSys {
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    main: OwMain,
    weather: Vec<OwWeather>,
    #[serde(default)]
    wind: OwWind,
    #[serde(default)]
    sys: OwSys,
    /// Metres.
    visibility: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwCity {
    name: String,
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
    #[serde(default)]
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    city: OwCity,
    list: Vec<OwForecastEntry>,
}

fn location_label(name: &str, country: Option<&str>) -> String {
    match country {
        Some(c) if !c.is_empty() => format!("{name}, {c}"),
        _ => name.to_string(),
    }
}

fn first_condition(weather: &[OwWeather]) -> String {
    weather
        .first()
        .map(|w| w.description.clone())
        .unwrap_or_else(|| "unknown".to_string())
}

fn unix_to_date(ts: i64) -> Option<NaiveDate> {
    DateTime::<Utc>::from_timestamp(ts, 0).map(|dt| dt.date_naive())
}

fn current_report(parsed: OwCurrentResponse) -> WeatherReport {
    WeatherReport {
        location: location_label(&parsed.name, parsed.sys.country.as_deref()),
        temperature: parsed.main.temp,
        feels_like: parsed.main.feels_like,
        humidity: parsed.main.humidity,
        wind_speed: parsed.wind.speed,
        pressure: parsed.main.pressure,
        visibility_km: parsed.visibility.map(|m| m / 1000.0),
        conditions: first_condition(&parsed.weather),
        units: Units::Metric,
        is_demo_data: false,
    }
}

fn forecast_report(parsed: OwForecastResponse, days: u8) -> Result<ForecastReport> {
    let days = usize::from(days);

    let entries = parsed
        .list
        .iter()
        .step_by(SLOTS_PER_DAY)
        .take(days)
        .map(|entry| {
            let date = unix_to_date(entry.dt).ok_or_else(|| {
                anyhow!("OpenWeather forecast slot has invalid timestamp {}", entry.dt)
            })?;
            Ok(ForecastDay {
                date,
                temperature: entry.main.temp,
                humidity: entry.main.humidity,
                wind_speed: entry.wind.speed,
                pressure: entry.main.pressure,
                conditions: first_condition(&entry.weather),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    if entries.len() != days {
        return Err(anyhow!(
            "OpenWeather forecast covered {} day(s), expected {days}",
            entries.len()
        ));
    }

    Ok(ForecastReport {
        location: location_label(&parsed.city.name, parsed.city.country.as_deref()),
        units: Units::Metric,
        is_demo_data: false,
        days: entries,
    })
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current(&self, city: &str) -> Result<WeatherReport> {
        let parsed: OwCurrentResponse = http::get_json(
            &self.http,
            &self.url("weather"),
            &[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", Units::Metric.as_str()),
                ("lang", self.language.as_str()),
            ],
            "OpenWeather current",
        )
        .await?;

        Ok(current_report(parsed))
    }

    async fn forecast(&self, city: &str, days: u8) -> Result<ForecastReport> {
        let cnt = (usize::from(days) * SLOTS_PER_DAY).min(40).to_string();

        let parsed: OwForecastResponse = http::get_json(
            &self.http,
            &self.url("forecast"),
            &[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", Units::Metric.as_str()),
                ("lang", self.language.as_str()),
                ("cnt", cnt.as_str()),
            ],
            "OpenWeather forecast",
        )
        .await?;

        forecast_report(parsed, days)
    }
}
