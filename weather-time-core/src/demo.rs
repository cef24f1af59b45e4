//! Fixed illustrative weather for a handful of well-known cities.

use chrono::{Days, NaiveDate};

use crate::{
    geo::normalize_query,
    model::{ForecastDay, ForecastReport, Units, WeatherReport},
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DemoRecord {
    pub key: &'static str,
    pub display: &'static str,
    pub temperature_c: f64,
    pub humidity: u8,
    pub wind_speed_mps: f64,
    pub pressure_hpa: f64,
    pub conditions: &'static str,
}

pub const DEMO_CITIES: &[DemoRecord] = &[
    DemoRecord {
        key: "new york",
        display: "New York",
        temperature_c: 22.5,
        humidity: 65,
        wind_speed_mps: 3.2,
        pressure_hpa: 1015.0,
        conditions: "partly cloudy",
    },
    DemoRecord {
        key: "london",
        display: "London",
        temperature_c: 15.8,
        humidity: 78,
        wind_speed_mps: 2.1,
        pressure_hpa: 1012.0,
        conditions: "overcast",
    },
    DemoRecord {
        key: "tokyo",
        display: "Tokyo",
        temperature_c: 26.4,
        humidity: 70,
        wind_speed_mps: 3.6,
        pressure_hpa: 1009.0,
        conditions: "scattered clouds",
    },
    DemoRecord {
        key: "paris",
        display: "Paris",
        temperature_c: 18.7,
        humidity: 82,
        wind_speed_mps: 2.5,
        pressure_hpa: 1011.0,
        conditions: "light rain",
    },
    DemoRecord {
        key: "sydney",
        display: "Sydney",
        temperature_c: 24.1,
        humidity: 60,
        wind_speed_mps: 4.1,
        pressure_hpa: 1018.0,
        conditions: "clear sky",
    },
    DemoRecord {
        key: "lagos",
        display: "Lagos",
        temperature_c: 31.3,
        humidity: 55,
        wind_speed_mps: 1.8,
        pressure_hpa: 1010.0,
        conditions: "sunny",
    },
];

/// Day-over-day temperature drift applied to demo forecasts.
const FORECAST_DRIFT_C: [f64; 5] = [0.0, 0.8, -0.5, 1.2, -1.0];

/// Find the closest demo entry: exact normalized name first, then the part
/// before the first comma ("London, UK" → "london").
pub fn lookup(city: &str) -> Option<&'static DemoRecord> {
    let key = normalize_query(city);
    find(&key).or_else(|| {
        let head = key.split(',').next()?.trim();
        find(head)
    })
}

fn find(key: &str) -> Option<&'static DemoRecord> {
    DEMO_CITIES.iter().find(|r| r.key == key)
}

pub fn supported_cities() -> String {
    DEMO_CITIES.iter().map(|r| r.display).collect::<Vec<_>>().join(", ")
}

impl DemoRecord {
    /// Current conditions in metric units.
    pub fn report(&self) -> WeatherReport {
        WeatherReport {
            location: self.display.to_string(),
            temperature: self.temperature_c,
            feels_like: None,
            humidity: self.humidity,
            wind_speed: self.wind_speed_mps,
            pressure: self.pressure_hpa,
            visibility_km: None,
            conditions: self.conditions.to_string(),
            units: Units::Metric,
            is_demo_data: true,
        }
    }

    /// `days` consecutive entries starting at `start`, in metric units.
    pub fn forecast(&self, start: NaiveDate, days: u8) -> ForecastReport {
        let days = (0..usize::from(days))
            .map(|i| ForecastDay {
                date: start.checked_add_days(Days::new(i as u64)).unwrap_or(start),
                temperature: self.temperature_c + FORECAST_DRIFT_C[i % FORECAST_DRIFT_C.len()],
                humidity: self.humidity,
                wind_speed: self.wind_speed_mps,
                pressure: self.pressure_hpa,
                conditions: self.conditions.to_string(),
            })
            .collect();

        ForecastReport {
            location: self.display.to_string(),
            units: Units::Metric,
            is_demo_data: true,
            days,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_cities_are_present() {
        for city in ["New York", "London", "Tokyo", "Paris", "Sydney"] {
            assert!(lookup(city).is_some(), "{city} missing from demo table");
        }
    }

    #[test]
    fn lookup_is_forgiving_about_case_spacing_and_suffix() {
        assert_eq!(lookup("  new   YORK ").unwrap().key, "new york");
        assert_eq!(lookup("London, UK").unwrap().key, "london");
        assert!(lookup("Nowhereville").is_none());
        assert!(lookup("").is_none());
    }

    #[test]
    fn demo_report_is_flagged() {
        let report = lookup("London").unwrap().report();
        assert!(report.is_demo_data);
        assert_eq!(report.temperature, 15.8);
        assert_eq!(report.units, Units::Metric);
    }

    #[test]
    fn demo_forecast_has_consecutive_dates() {
        let start = NaiveDate::from_ymd_opt(2024, 12, 30).unwrap();
        let forecast = lookup("Sydney").unwrap().forecast(start, 5);

        assert_eq!(forecast.days.len(), 5);
        assert_eq!(forecast.days[2].date, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert!(forecast.is_demo_data);
    }
}
