use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{fmt, time::Duration};
use tracing::{error, info};

use crate::{
    classify::weather_state_from_code,
    config::DEFAULT_OPENWEATHER_HOST,
    error::ReportError,
    model::{Location, UmbrellaReport},
};

use super::ReportProvider;

const GEOCODING_ENDPOINT: &str = "geo/1.0/direct";
const CURRENT_WEATHER_ENDPOINT: &str = "data/2.5/weather";

#[derive(Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    host: String,
    http: Client,
}

impl fmt::Debug for OpenWeatherProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenWeatherProvider")
            .field("host", &self.host)
            .finish_non_exhaustive()
    }
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            host: DEFAULT_OPENWEATHER_HOST.to_string(),
            http: Client::new(),
        }
    }

    /// Target another host (e.g. a mock server) with a client-wide timeout.
    pub fn with_settings(api_key: String, host: String, timeout: Duration) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client for OpenWeather")?;

        Ok(Self {
            api_key,
            host: host.trim_end_matches('/').to_string(),
            http,
        })
    }

    async fn call<Q>(&self, endpoint: &str, params: &Q) -> Result<(StatusCode, String), ReportError>
    where
        Q: Serialize + ?Sized,
    {
        let url = format!("{}/{}", self.host, endpoint);

        let res = self
            .http
            .get(&url)
            .query(params)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| ReportError::from_transport(e, endpoint))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| ReportError::from_transport(e, endpoint))?;

        Ok((status, body))
    }

    async fn fetch_location(&self, place: &str) -> Result<Location, ReportError> {
        info!("Calling OpenWeather geocoding API for '{place}'");

        let (_, body) = self.call(GEOCODING_ENDPOINT, &[("q", place)]).await?;

        // Failures (bad key, bad query) come back as an object instead of a list.
        let candidates: Value = serde_json::from_str(&body).map_err(|e| {
            ReportError::BadResponse(format!(
                "geocoding body is not JSON ({e}): {}",
                truncate_body(&body)
            ))
        })?;

        let first = match candidates {
            Value::Array(entries) => entries.into_iter().next(),
            _ => None,
        };

        let Some(first) = first else {
            let err = ReportError::LocationNotFound(place.to_string());
            error!("{err}");
            return Err(err);
        };

        let entry: OwGeoEntry = serde_json::from_value(first)
            .map_err(|e| ReportError::BadResponse(format!("geocoding entry: {e}")))?;
        let location = entry.into_location();

        info!(
            "Returned by OpenWeather: City={}, State={}, Country={}, Lat={:.3}, Lon={:.3}",
            location.city, location.state, location.country, location.latitude, location.longitude,
        );

        Ok(location)
    }

    async fn fetch_weather_code(&self, location: &Location) -> Result<i64, ReportError> {
        info!(
            "Calling OpenWeather weather API for latitude={:.3} and longitude={:.3}",
            location.latitude, location.longitude,
        );

        let (status, body) = self
            .call(
                CURRENT_WEATHER_ENDPOINT,
                &[("lat", location.latitude), ("lon", location.longitude)],
            )
            .await?;

        if !status.is_success() {
            return Err(ReportError::BadResponse(format!(
                "current weather request failed with status {}: {}",
                status,
                truncate_body(&body),
            )));
        }

        let parsed: OwCurrentResponse = serde_json::from_str(&body)
            .map_err(|e| ReportError::BadResponse(format!("current weather JSON: {e}")))?;

        let condition = parsed.weather.into_iter().next().ok_or_else(|| {
            ReportError::BadResponse("current weather contained no condition".to_string())
        })?;

        info!(
            "Returned weather: {} (code: {})",
            condition.description.as_deref().unwrap_or("no description"),
            condition.id,
        );

        Ok(condition.id)
    }
}

/// One candidate of the geocoding answer. Every field is optional upstream.
#[derive(Debug, Deserialize)]
struct OwGeoEntry {
    name: Option<String>,
    state: Option<String>,
    country: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

impl OwGeoEntry {
    fn into_location(self) -> Location {
        Location {
            city: self.name.unwrap_or_else(|| "city".to_string()),
            state: self.state.unwrap_or_else(|| "state".to_string()),
            country: self.country.unwrap_or_else(|| "country".to_string()),
            latitude: self.lat.unwrap_or(0.0),
            longitude: self.lon.unwrap_or(0.0),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwCondition {
    id: i64,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    #[serde(default)]
    weather: Vec<OwCondition>,
}

#[async_trait]
impl ReportProvider for OpenWeatherProvider {
    async fn get_report(&self, place: &str) -> Result<UmbrellaReport, ReportError> {
        let location = self.fetch_location(place).await?;
        let code = self.fetch_weather_code(&location).await?;

        Ok(UmbrellaReport::new(location, weather_state_from_code(code)))
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}
