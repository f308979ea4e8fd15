//! Core library for the `myumbrella` service.
//!
//! This crate defines:
//! - Shared domain models (locations, weather states, umbrella reports)
//! - Classification of upstream condition codes
//! - Abstraction over report providers and the OpenWeather backend
//! - Configuration & credentials handling
//!
//! It is used by `umbrella-server`, but can also be reused by other binaries.

pub mod classify;
pub mod config;
pub mod error;
pub mod model;
pub mod provider;

pub use classify::weather_state_from_code;
pub use config::{Config, OpenWeatherConfig, ServerConfig, load_api_key};
pub use error::{ConfigError, ReportError, UnassessableWeatherState};
pub use model::{Location, UmbrellaReport, WeatherState};
pub use provider::{ReportProvider, openweather::OpenWeatherProvider, provider_from_config};
