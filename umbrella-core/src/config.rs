use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::info;

use crate::error::ConfigError;

pub const DEFAULT_API_KEY_ENV: &str = "OPENWEATHER_API_KEY";
pub const DEFAULT_OPENWEATHER_HOST: &str = "https://api.openweathermap.org";
pub const DEFAULT_BIND: &str = "0.0.0.0:5000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address the HTTP service listens on.
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: DEFAULT_BIND.to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenWeatherConfig {
    pub host: String,
    pub timeout_secs: u64,
    /// Name of the env variable holding the API key (or a path to it).
    pub api_key_env: String,
}

impl Default for OpenWeatherConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_OPENWEATHER_HOST.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
        }
    }
}

/// Service settings, optionally stored on disk as TOML.
///
/// Example TOML:
/// ```toml
/// [server]
/// bind = "127.0.0.1:8080"
///
/// [openweather]
/// timeout_secs = 5
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub openweather: OpenWeatherConfig,
}

impl Config {
    /// Load config from the platform config directory, or return defaults if
    /// there is no file there.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::config_file_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load config from an explicit file, which must exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        info!("Loading configuration from '{}'", path.display());

        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ConfigFile {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ConfigFile {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Path to the default config file.
    pub fn config_file_path() -> Option<PathBuf> {
        ProjectDirs::from("dev", "myumbrella", "myumbrella")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.openweather.timeout_secs)
    }

    /// Resolve the OpenWeather API key from the configured env variable.
    pub fn api_key(&self) -> Result<String, ConfigError> {
        load_api_key(&self.openweather.api_key_env)
    }
}

/// Load the API key from an environment variable.
///
/// The variable holds either the key itself or the path of a file containing
/// it.
pub fn load_api_key(var: &str) -> Result<String, ConfigError> {
    info!("Loading OpenWeather API key using environment variable '{var}'");
    resolve_api_key(var, std::env::var(var).ok().as_deref())
}

fn resolve_api_key(var: &str, value: Option<&str>) -> Result<String, ConfigError> {
    let missing = || ConfigError::MissingCredential { var: var.to_string() };

    let value = value.map(str::trim).filter(|v| !v.is_empty()).ok_or_else(missing)?;

    let as_path = Path::new(value);
    if !as_path.is_file() {
        return Ok(value.to_string());
    }

    info!("Loading OpenWeather API key from file '{}'", as_path.display());
    let contents = fs::read_to_string(as_path).map_err(|source| ConfigError::CredentialFile {
        path: as_path.to_path_buf(),
        source,
    })?;

    let key = contents.trim();
    if key.is_empty() {
        return Err(ConfigError::CredentialFile {
            path: as_path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::InvalidData, "file is empty"),
        });
    }

    Ok(key.to_string())
}
