use std::fmt;

use crate::error::UnassessableWeatherState;

/// A place resolved by geocoding.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub city: String,
    pub state: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Default for Location {
    fn default() -> Self {
        Self {
            city: "City".to_string(),
            state: "State".to_string(),
            country: "Country".to_string(),
            latitude: 0.0,
            longitude: 0.0,
        }
    }
}

/// Coarse-grained classification of an upstream condition code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WeatherState {
    /// Classification not resolved. Never a valid input to the umbrella rule.
    #[default]
    Unknown,
    Thunderstorm,
    Drizzle,
    Rain,
    Snow,
    Fog,
    Clear,
    Clouds,
}

impl WeatherState {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeatherState::Unknown => "Unknown",
            WeatherState::Thunderstorm => "Thunderstorm",
            WeatherState::Drizzle => "Drizzle",
            WeatherState::Rain => "Rain",
            WeatherState::Snow => "Snow",
            WeatherState::Fog => "Fog",
            WeatherState::Clear => "Clear",
            WeatherState::Clouds => "Clouds",
        }
    }

    /// Whether this weather calls for an umbrella.
    ///
    /// `Unknown` has no sensible answer and is reported as an error, so the
    /// caller has to pick its own fallback.
    pub fn umbrella_needed(&self) -> Result<bool, UnassessableWeatherState> {
        match self {
            WeatherState::Unknown => Err(UnassessableWeatherState(*self)),
            WeatherState::Clear | WeatherState::Clouds | WeatherState::Fog => Ok(false),
            WeatherState::Thunderstorm
            | WeatherState::Drizzle
            | WeatherState::Rain
            | WeatherState::Snow => Ok(true),
        }
    }
}

impl fmt::Display for WeatherState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A location paired with the weather currently observed there.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UmbrellaReport {
    pub location: Location,
    pub weather: WeatherState,
}

impl UmbrellaReport {
    pub fn new(location: Location, weather: WeatherState) -> Self {
        Self { location, weather }
    }

    /// Derived on demand; fails only when the weather is `Unknown`.
    pub fn umbrella_needed(&self) -> Result<bool, UnassessableWeatherState> {
        self.weather.umbrella_needed()
    }
}
