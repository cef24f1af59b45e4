use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{Error, ErrorKind};

const MPS_TO_MPH: f64 = 2.236_936_292_054_402;
const KELVIN_OFFSET: f64 = 273.15;

/// Unit system for weather figures.
///
/// Providers are always queried in [`Units::Metric`]; every other system is
/// produced locally by [`WeatherReport::convert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
    Kelvin,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
            Units::Kelvin => "kelvin",
        }
    }

    pub const fn all() -> &'static [Units] {
        &[Units::Metric, Units::Imperial, Units::Kelvin]
    }

    pub fn temperature_symbol(&self) -> &'static str {
        match self {
            Units::Metric => "°C",
            Units::Imperial => "°F",
            Units::Kelvin => "K",
        }
    }

    pub fn speed_symbol(&self) -> &'static str {
        match self {
            Units::Imperial => "mph",
            Units::Metric | Units::Kelvin => "m/s",
        }
    }

    /// Convert a temperature expressed in `self` into `to`.
    pub fn convert_temperature(&self, value: f64, to: Units) -> f64 {
        let celsius = match self {
            Units::Metric => value,
            Units::Imperial => (value - 32.0) * 5.0 / 9.0,
            Units::Kelvin => value - KELVIN_OFFSET,
        };
        match to {
            Units::Metric => celsius,
            Units::Imperial => celsius * 9.0 / 5.0 + 32.0,
            Units::Kelvin => celsius + KELVIN_OFFSET,
        }
    }

    /// Convert a wind speed expressed in `self` into `to`.
    pub fn convert_speed(&self, value: f64, to: Units) -> f64 {
        let mps = match self {
            Units::Imperial => value / MPS_TO_MPH,
            Units::Metric | Units::Kelvin => value,
        };
        match to {
            Units::Imperial => mps * MPS_TO_MPH,
            Units::Metric | Units::Kelvin => mps,
        }
    }
}

impl std::fmt::Display for Units {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Units {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "metric" => Ok(Units::Metric),
            "imperial" => Ok(Units::Imperial),
            "kelvin" => Ok(Units::Kelvin),
            _ => Err(Error::invalid(format!(
                "Unknown units '{value}'. Supported units: metric, imperial, kelvin."
            ))),
        }
    }
}

/// Presentation style for a single city's time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeFormat {
    #[default]
    Standard,
    Detailed,
    Utc,
}

impl TimeFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeFormat::Standard => "standard",
            TimeFormat::Detailed => "detailed",
            TimeFormat::Utc => "utc",
        }
    }
}

impl TryFrom<&str> for TimeFormat {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "standard" => Ok(TimeFormat::Standard),
            "detailed" => Ok(TimeFormat::Detailed),
            "utc" => Ok(TimeFormat::Utc),
            _ => Err(Error::invalid(format!(
                "Unknown format '{value}'. Supported formats: standard, detailed, utc."
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    /// Short place name, e.g. "London".
    pub name: String,
    /// Full provider label, e.g. "London, England, United Kingdom".
    pub display_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub country: Option<String>,
}

impl GeoLocation {
    pub fn has_valid_coordinates(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub location: String,
    pub temperature: f64,
    pub feels_like: Option<f64>,
    pub humidity: u8,
    pub wind_speed: f64,
    /// Always hPa.
    pub pressure: f64,
    pub visibility_km: Option<f64>,
    pub conditions: String,
    pub units: Units,
    pub is_demo_data: bool,
}

impl WeatherReport {
    pub fn convert(mut self, to: Units) -> Self {
        let from = self.units;
        self.temperature = from.convert_temperature(self.temperature, to);
        self.feels_like = self.feels_like.map(|t| from.convert_temperature(t, to));
        self.wind_speed = from.convert_speed(self.wind_speed, to);
        self.units = to;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub temperature: f64,
    pub humidity: u8,
    pub wind_speed: f64,
    pub pressure: f64,
    pub conditions: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastReport {
    pub location: String,
    pub units: Units,
    pub is_demo_data: bool,
    pub days: Vec<ForecastDay>,
}

impl ForecastReport {
    pub fn convert(mut self, to: Units) -> Self {
        let from = self.units;
        for day in &mut self.days {
            day.temperature = from.convert_temperature(day.temperature, to);
            day.wind_speed = from.convert_speed(day.wind_speed, to);
        }
        self.units = to;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeInfo {
    pub location: String,
    pub timezone_id: String,
    /// Offset in effect at `local_timestamp`, DST included.
    pub utc_offset_minutes: i32,
    pub local_timestamp: DateTime<FixedOffset>,
    pub formatted: String,
    pub day_of_week: String,
    pub abbreviation: String,
}

impl TimeInfo {
    /// "UTC+05:30" style label for the offset.
    pub fn utc_offset_label(&self) -> String {
        let sign = if self.utc_offset_minutes < 0 { '-' } else { '+' };
        let abs = self.utc_offset_minutes.abs();
        format!("UTC{sign}{:02}:{:02}", abs / 60, abs % 60)
    }
}

/// `difference_minutes` is `city_a` offset minus `city_b` offset, so a
/// positive value means `city_a` is ahead.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeDifference {
    pub city_a: TimeInfo,
    pub city_b: TimeInfo,
    pub difference_minutes: i32,
}

impl TimeDifference {
    pub fn between(city_a: TimeInfo, city_b: TimeInfo) -> Self {
        let difference_minutes = city_a.utc_offset_minutes - city_b.utc_offset_minutes;
        Self {
            city_a,
            city_b,
            difference_minutes,
        }
    }
}

/// One world-clock row: either the resolved time or why the city failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ClockEntry {
    Resolved { city: String, time: TimeInfo },
    Failed { city: String, error: ErrorKind, message: String },
}

impl ClockEntry {
    pub fn failed(city: impl Into<String>, err: &Error) -> Self {
        ClockEntry::Failed {
            city: city.into(),
            error: err.kind(),
            message: err.to_string(),
        }
    }

    pub fn city(&self) -> &str {
        match self {
            ClockEntry::Resolved { city, .. } | ClockEntry::Failed { city, .. } => city,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, ClockEntry::Resolved { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorldClock {
    /// One entry per resolved input city, in input order.
    pub entries: Vec<ClockEntry>,
    /// Number of cities asked for, before truncation to the configured limit.
    pub requested: usize,
}

impl WorldClock {
    pub fn truncated(&self) -> bool {
        self.requested > self.entries.len()
    }

    pub fn resolved_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_resolved()).count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityInfo {
    pub location: GeoLocation,
    /// `None` when the coordinates fall outside every known zone.
    pub timezone_id: Option<String>,
}
