use crate::{
    Config,
    model::{ForecastReport, WeatherReport},
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use reqwest::Client;
use std::{fmt::Debug, sync::Arc};

pub mod openweather;

/// A live weather backend.
///
/// Implementations always answer in [`crate::Units::Metric`]; the weather
/// client converts locally so live and demo data share one conversion path.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current(&self, city: &str) -> anyhow::Result<WeatherReport>;

    /// Exactly `days` daily entries, starting today.
    async fn forecast(&self, city: &str, days: u8) -> anyhow::Result<ForecastReport>;
}

/// Construct the live provider from config.
pub fn provider_from_config(
    config: &Config,
    http: Client,
) -> anyhow::Result<Arc<dyn WeatherProvider>> {
    let api_key = config
        .openweather_api_key
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .ok_or_else(|| {
            anyhow::anyhow!(
                "No API key configured for OpenWeather.\n\
                 Hint: run `weather-time configure` or set OPENWEATHER_API_KEY."
            )
        })?;

    Ok(Arc::new(OpenWeatherProvider::new(
        api_key.to_owned(),
        config.openweather_base_url.clone(),
        config.language.clone(),
        http,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_from_config_errors_when_missing_api_key() {
        let cfg = Config::default();
        let err = provider_from_config(&cfg, Client::new()).unwrap_err();
        assert!(err.to_string().contains("No API key configured"));
    }

    #[test]
    fn provider_from_config_works_when_configured() {
        let cfg = Config {
            openweather_api_key: Some("KEY".into()),
            ..Config::default()
        };
        assert!(provider_from_config(&cfg, Client::new()).is_ok());
    }
}
