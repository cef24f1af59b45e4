//! In-memory fakes for the provider seams.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use std::sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
};

use crate::{
    geo::Geocoder,
    model::{ForecastDay, ForecastReport, GeoLocation, Units, WeatherReport},
    provider::WeatherProvider,
    timezone::TimezoneLookup,
};

const PLACES: &[(&str, &str, f64, f64, &str, &str)] = &[
    ("london", "London", 51.5074, -0.1278, "United Kingdom", "Europe/London"),
    ("tokyo", "Tokyo", 35.6895, 139.6917, "Japan", "Asia/Tokyo"),
    ("new york", "New York", 40.7128, -74.0060, "United States", "America/New_York"),
    ("paris", "Paris", 48.8566, 2.3522, "France", "Europe/Paris"),
    ("sydney", "Sydney", -33.8688, 151.2093, "Australia", "Australia/Sydney"),
    ("kathmandu", "Kathmandu", 27.7172, 85.3240, "Nepal", "Asia/Kathmandu"),
    ("point nemo", "Point Nemo", 0.0, -140.0, "", ""),
];

#[derive(Debug, Default)]
pub struct FakeGeocoder {
    places: Vec<GeoLocation>,
    fail: bool,
    queries: Mutex<Vec<String>>,
}

impl FakeGeocoder {
    pub fn with_defaults() -> Self {
        let places = PLACES
            .iter()
            .map(|(_, name, lat, lon, country, _)| GeoLocation {
                name: name.to_string(),
                display_name: if country.is_empty() {
                    name.to_string()
                } else {
                    format!("{name}, {country}")
                },
                latitude: *lat,
                longitude: *lon,
                country: (!country.is_empty()).then(|| country.to_string()),
            })
            .collect();
        Self {
            places,
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl Geocoder for FakeGeocoder {
    async fn geocode(&self, query: &str) -> Result<Option<GeoLocation>> {
        self.queries.lock().unwrap().push(query.to_string());
        if self.fail {
            return Err(anyhow!("connection timed out"));
        }
        Ok(self.places.iter().find(|p| p.name.to_lowercase() == query).cloned())
    }
}

#[derive(Debug, Default)]
pub struct FakeTimezones {
    zones: Vec<(f64, f64, String)>,
    fail: bool,
}

impl FakeTimezones {
    pub fn with_defaults() -> Self {
        PLACES
            .iter()
            .filter(|(.., tz)| !tz.is_empty())
            .fold(Self::default(), |fake, (_, _, lat, lon, _, tz)| fake.with_zone(*lat, *lon, tz))
    }

    pub fn with_zone(mut self, latitude: f64, longitude: f64, id: &str) -> Self {
        self.zones.push((latitude, longitude, id.to_string()));
        self
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl TimezoneLookup for FakeTimezones {
    async fn timezone_at(&self, latitude: f64, longitude: f64) -> Result<Option<String>> {
        if self.fail {
            return Err(anyhow!("503 Service Unavailable"));
        }
        Ok(self
            .zones
            .iter()
            .find(|(lat, lon, _)| *lat == latitude && *lon == longitude)
            .map(|(.., id)| id.clone()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WeatherMode {
    Succeed,
    Fail,
    ShortForecast,
}

/// Always answers 20 °C / 5 m/s for any city.
#[derive(Debug)]
pub struct FakeWeather {
    mode: WeatherMode,
    calls: AtomicUsize,
}

impl FakeWeather {
    fn new(mode: WeatherMode) -> Self {
        Self {
            mode,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn succeeding() -> Self {
        Self::new(WeatherMode::Succeed)
    }

    pub fn failing() -> Self {
        Self::new(WeatherMode::Fail)
    }

    pub fn short_forecast() -> Self {
        Self::new(WeatherMode::ShortForecast)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WeatherProvider for FakeWeather {
    async fn current(&self, city: &str) -> Result<WeatherReport> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.mode == WeatherMode::Fail {
            return Err(anyhow!("OpenWeather current request failed with status 401 Unauthorized"));
        }
        Ok(WeatherReport {
            location: city.to_string(),
            temperature: 20.0,
            feels_like: Some(19.0),
            humidity: 50,
            wind_speed: 5.0,
            pressure: 1013.0,
            visibility_km: Some(10.0),
            conditions: "clear sky".to_string(),
            units: Units::Metric,
            is_demo_data: false,
        })
    }

    async fn forecast(&self, city: &str, days: u8) -> Result<ForecastReport> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let count = match self.mode {
            WeatherMode::Fail => return Err(anyhow!("OpenWeather forecast request timed out")),
            WeatherMode::Succeed => days,
            WeatherMode::ShortForecast => days.saturating_sub(1),
        };
        let start = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let days = (0..count)
            .map(|i| ForecastDay {
                date: start.checked_add_days(Days::new(u64::from(i))).unwrap(),
                temperature: 20.0,
                humidity: 50,
                wind_speed: 5.0,
                pressure: 1013.0,
                conditions: "clear sky".to_string(),
            })
            .collect();
        Ok(ForecastReport {
            location: city.to_string(),
            units: Units::Metric,
            is_demo_data: false,
            days,
        })
    }
}
