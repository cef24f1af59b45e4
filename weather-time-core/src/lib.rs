//! Core library for the `weather-time` agent tools.
//!
//! This crate defines:
//! - Configuration loading (file, `.env`, environment)
//! - Geocoding and timezone resolution behind swappable providers
//! - A weather client that falls back to labelled demo data
//! - Time, time-difference and world-clock computation
//! - Report formatting and the tool surface an agent host calls
//!
//! It is used by `weather-time-cli`, but can also be embedded in any agent host.

pub mod config;
pub mod demo;
pub mod error;
pub mod geo;
pub mod http;
pub mod model;
pub mod provider;
pub mod report;
pub mod time;
pub mod timezone;
pub mod tools;
pub mod weather;

#[cfg(test)]
mod testing;

pub use config::Config;
pub use error::{Error, ErrorKind};
pub use geo::{GeoResolver, Geocoder, GeocoderId};
pub use model::{
    CityInfo, ClockEntry, ForecastDay, ForecastReport, GeoLocation, TimeDifference, TimeFormat,
    TimeInfo, Units, WeatherReport, WorldClock,
};
pub use provider::WeatherProvider;
pub use time::TimeResolver;
pub use timezone::{TimezoneLookup, TimezoneResolver};
pub use tools::{ToolDefinition, ToolResponse, ToolStatus, ToolSurface};
pub use weather::{FallbackReason, Sourced, WeatherClient};
