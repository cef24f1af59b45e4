//! The six operations an agent host can call.
//!
//! Every call returns a [`ToolResponse`]; typed errors from below are turned
//! into `{ "status": "error", "error": kind, "report": message }` here and
//! nowhere else.

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, info};

use crate::{
    Config,
    error::{Error, ErrorKind, Result},
    geo::{GeoResolver, geocoder_from_config},
    http,
    model::{TimeFormat, Units},
    provider::provider_from_config,
    report,
    time::TimeResolver,
    timezone::{OpenMeteoTimezone, TimezoneResolver},
    weather::WeatherClient,
};

pub const DEFAULT_FORECAST_DAYS: i64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolStatus {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolResponse {
    pub status: ToolStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorKind>,
    /// Always present and fit for direct display.
    pub report: String,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub data: Value,
}

impl ToolResponse {
    pub fn success(report: String, data: Value) -> Self {
        Self {
            status: ToolStatus::Success,
            error: None,
            report,
            data,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ToolStatus::Success
    }
}

impl From<Error> for ToolResponse {
    fn from(err: Error) -> Self {
        Self {
            status: ToolStatus::Error,
            error: Some(err.kind()),
            report: err.to_string(),
            data: Value::Null,
        }
    }
}

fn respond(result: Result<ToolResponse>) -> ToolResponse {
    result.unwrap_or_else(|e| {
        debug!(error = %e, kind = %e.kind(), "tool call failed");
        ToolResponse::from(e)
    })
}

fn to_data<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Value,
}

pub fn definitions() -> Vec<ToolDefinition> {
    let city = json!({
        "type": "string",
        "description": "City name, optionally with country, e.g. \"Paris, France\"."
    });
    let units = json!({
        "type": "string",
        "enum": ["metric", "imperial", "kelvin"],
        "description": "Unit system. Defaults to the configured units."
    });

    vec![
        ToolDefinition {
            name: "get_weather",
            description: "Get the current weather for a city. Falls back to clearly labelled demo data when live data is unavailable.",
            parameters: json!({
                "type": "object",
                "properties": { "city": city, "units": units },
                "required": ["city"]
            }),
        },
        ToolDefinition {
            name: "get_weather_forecast",
            description: "Get a daily weather forecast (1-5 days) for a city.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "city": city,
                    "days": {
                        "type": "integer",
                        "minimum": 1,
                        "maximum": 5,
                        "description": "Number of days, default 3."
                    },
                    "units": units
                },
                "required": ["city"]
            }),
        },
        ToolDefinition {
            name: "get_current_time",
            description: "Get the current local time, timezone and UTC offset for any city.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "city": city,
                    "format_type": {
                        "type": "string",
                        "enum": ["standard", "detailed", "utc"],
                        "description": "Output style, default standard."
                    }
                },
                "required": ["city"]
            }),
        },
        ToolDefinition {
            name: "get_time_difference",
            description: "Get the time difference between two cities. Positive means city1 is ahead.",
            parameters: json!({
                "type": "object",
                "properties": { "city1": city, "city2": city },
                "required": ["city1", "city2"]
            }),
        },
        ToolDefinition {
            name: "get_world_clock",
            description: "Get the current time in several cities at once.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "cities": { "type": "array", "items": { "type": "string" }, "minItems": 1 }
                },
                "required": ["cities"]
            }),
        },
        ToolDefinition {
            name: "get_city_info",
            description: "Get coordinates, timezone, full address and country for a city.",
            parameters: json!({
                "type": "object",
                "properties": { "city": city },
                "required": ["city"]
            }),
        },
    ]
}

#[derive(Debug, Deserialize)]
struct WeatherArgs {
    city: String,
    units: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ForecastArgs {
    city: String,
    days: Option<i64>,
    units: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TimeArgs {
    city: String,
    format_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DifferenceArgs {
    city1: String,
    city2: String,
}

#[derive(Debug, Deserialize)]
struct ClockArgs {
    cities: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct CityArgs {
    city: String,
}

fn parse_args<T: DeserializeOwned>(tool: &str, arguments: &Value) -> Result<T> {
    let arguments = if arguments.is_null() { json!({}) } else { arguments.clone() };
    serde_json::from_value(arguments)
        .map_err(|e| Error::invalid(format!("Invalid arguments for {tool}: {e}")))
}

fn require_city<'a>(city: &'a str, which: &str) -> Result<&'a str> {
    let city = city.trim();
    if city.is_empty() {
        return Err(Error::invalid(format!(
            "{which} cannot be empty. Please provide a valid city name."
        )));
    }
    Ok(city)
}

#[derive(Debug, Clone)]
pub struct ToolSurface {
    weather: WeatherClient,
    time: TimeResolver,
}

impl ToolSurface {
    pub fn new(weather: WeatherClient, time: TimeResolver) -> Self {
        Self { weather, time }
    }

    /// Wire up the live providers described by `config`.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        config.validate()?;
        let http = http::client(config)?;

        let geocoder_id = config.geocoder_id()?;
        let geocoder = geocoder_from_config(geocoder_id, config, http.clone());
        let timezones = Arc::new(OpenMeteoTimezone::new(http.clone()));
        let provider = provider_from_config(config, http).ok();

        info!(
            weather = if provider.is_some() { "live" } else { "demo" },
            geocoder = %geocoder_id,
            units = %config.units,
            "tools ready"
        );

        Ok(Self::new(
            WeatherClient::new(config, provider),
            TimeResolver::new(config, GeoResolver::new(geocoder), TimezoneResolver::new(timezones)),
        ))
    }

    /// Dispatch by tool name with JSON arguments, as an agent host would.
    pub async fn call(&self, name: &str, arguments: &Value) -> ToolResponse {
        debug!(tool = name, %arguments, "tool call");

        match name {
            "get_weather" => match parse_args::<WeatherArgs>(name, arguments) {
                Ok(a) => self.get_weather(&a.city, a.units.as_deref()).await,
                Err(e) => e.into(),
            },
            "get_weather_forecast" => match parse_args::<ForecastArgs>(name, arguments) {
                Ok(a) => self.get_weather_forecast(&a.city, a.days, a.units.as_deref()).await,
                Err(e) => e.into(),
            },
            "get_current_time" => match parse_args::<TimeArgs>(name, arguments) {
                Ok(a) => self.get_current_time(&a.city, a.format_type.as_deref()).await,
                Err(e) => e.into(),
            },
            "get_time_difference" => match parse_args::<DifferenceArgs>(name, arguments) {
                Ok(a) => self.get_time_difference(&a.city1, &a.city2).await,
                Err(e) => e.into(),
            },
            "get_world_clock" => match parse_args::<ClockArgs>(name, arguments) {
                Ok(a) => self.get_world_clock(&a.cities).await,
                Err(e) => e.into(),
            },
            "get_city_info" => match parse_args::<CityArgs>(name, arguments) {
                Ok(a) => self.get_city_info(&a.city).await,
                Err(e) => e.into(),
            },
            other => {
                let known: Vec<&str> = definitions().iter().map(|d| d.name).collect();
                Error::invalid(format!(
                    "Unknown tool '{other}'. Available tools: {}.",
                    known.join(", ")
                ))
                .into()
            }
        }
    }

    fn units(&self, units: Option<&str>) -> Result<Units> {
        units.map(Units::try_from).transpose().map(|u| u.unwrap_or(self.weather.default_units()))
    }

    pub async fn get_weather(&self, city: &str, units: Option<&str>) -> ToolResponse {
        respond(self.try_weather(city, units).await)
    }

    pub async fn get_weather_forecast(
        &self,
        city: &str,
        days: Option<i64>,
        units: Option<&str>,
    ) -> ToolResponse {
        respond(self.try_forecast(city, days, units).await)
    }

    pub async fn get_current_time(&self, city: &str, format_type: Option<&str>) -> ToolResponse {
        respond(self.try_current_time(city, format_type).await)
    }

    pub async fn get_time_difference(&self, city1: &str, city2: &str) -> ToolResponse {
        respond(self.try_time_difference(city1, city2).await)
    }

    pub async fn get_world_clock(&self, cities: &[String]) -> ToolResponse {
        respond(self.try_world_clock(cities).await)
    }

    pub async fn get_city_info(&self, city: &str) -> ToolResponse {
        respond(self.try_city_info(city).await)
    }

    async fn try_weather(&self, city: &str, units: Option<&str>) -> Result<ToolResponse> {
        let city = require_city(city, "City name")?;
        let units = self.units(units)?;

        let sourced = self.weather.fetch_current(city, units).await?;
        let mut data = json!({ "fallback": sourced.fallback_reason() });
        let report = sourced.into_inner();
        data["weather"] = to_data(&report);

        Ok(ToolResponse::success(report::weather(&report), data))
    }

    async fn try_forecast(
        &self,
        city: &str,
        days: Option<i64>,
        units: Option<&str>,
    ) -> Result<ToolResponse> {
        let city = require_city(city, "City name")?;
        let days = days.unwrap_or(DEFAULT_FORECAST_DAYS);
        let days = u32::try_from(days).map_err(|_| {
            Error::invalid(format!("Forecast days must be between 1 and 5, got {days}."))
        })?;
        let units = self.units(units)?;

        let sourced = self.weather.fetch_forecast(city, days, units).await?;
        let mut data = json!({ "fallback": sourced.fallback_reason() });
        let report = sourced.into_inner();
        data["forecast"] = to_data(&report);

        Ok(ToolResponse::success(report::forecast(&report), data))
    }

    async fn try_current_time(
        &self,
        city: &str,
        format_type: Option<&str>,
    ) -> Result<ToolResponse> {
        let city = require_city(city, "City name")?;
        let format = format_type.map(TimeFormat::try_from).transpose()?.unwrap_or_default();

        let info = self.time.current_time(city, format).await?;
        Ok(ToolResponse::success(report::current_time(&info, format), to_data(&info)))
    }

    async fn try_time_difference(&self, city1: &str, city2: &str) -> Result<ToolResponse> {
        let city1 = require_city(city1, "First city name")?;
        let city2 = require_city(city2, "Second city name")?;

        let diff = self.time.time_difference(city1, city2).await?;
        Ok(ToolResponse::success(report::time_difference(&diff), to_data(&diff)))
    }

    async fn try_world_clock(&self, cities: &[String]) -> Result<ToolResponse> {
        let clock = self.time.world_clock(cities).await?;
        Ok(ToolResponse::success(report::world_clock(&clock), to_data(&clock)))
    }

    async fn try_city_info(&self, city: &str) -> Result<ToolResponse> {
        let city = require_city(city, "City name")?;

        let info = self.time.city_info(city).await?;
        Ok(ToolResponse::success(report::city_info(&info), to_data(&info)))
    }
}
