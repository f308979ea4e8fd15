use crate::{Config, UmbrellaReport, error::ReportError, provider::openweather::OpenWeatherProvider};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// Anything able to produce an umbrella report for a place name.
#[async_trait]
pub trait ReportProvider: Send + Sync + Debug {
    async fn get_report(&self, place: &str) -> Result<UmbrellaReport, ReportError>;
}

/// Construct the OpenWeather backend from config and an already resolved API key.
pub fn provider_from_config(
    config: &Config,
    api_key: String,
) -> anyhow::Result<Box<dyn ReportProvider>> {
    let provider = OpenWeatherProvider::with_settings(
        api_key,
        config.openweather.host.clone(),
        config.request_timeout(),
    )?;

    Ok(Box::new(provider))
}
