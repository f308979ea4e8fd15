use std::path::PathBuf;

use thiserror::Error;

use crate::model::WeatherState;

/// Failures while building an umbrella report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Geocoding returned no candidate, or an error object instead of a list.
    #[error("Location '{0}' is unknown to OpenWeather Geocoding API!")]
    LocationNotFound(String),

    #[error("OpenWeather API timed out: {0}")]
    Timeout(String),

    #[error("OpenWeather API is unreachable: {0}")]
    Unreachable(String),

    #[error("Unexpected OpenWeather response: {0}")]
    BadResponse(String),
}

impl ReportError {
    pub(crate) fn from_transport(err: reqwest::Error, what: &str) -> Self {
        if err.is_timeout() {
            ReportError::Timeout(format!("{what}: {}", err.without_url()))
        } else {
            ReportError::Unreachable(format!("{what}: {}", err.without_url()))
        }
    }
}

/// The umbrella rule was asked about a weather it cannot judge.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("Cannot assess the need for an umbrella from condition '{0}'")]
pub struct UnassessableWeatherState(pub WeatherState);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Impossible to load API key: '{var}' env variable is not set")]
    MissingCredential { var: String },

    #[error("Impossible to load API key from file '{}': {source}", .path.display())]
    CredentialFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file '{}': {message}", .path.display())]
    ConfigFile { path: PathBuf, message: String },
}
