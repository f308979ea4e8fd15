//! Mapping of OpenWeather condition codes onto [`WeatherState`].
//!
//! See <https://openweathermap.org/weather-conditions#Weather-Condition-Codes-2>.

use crate::model::WeatherState;

/// Codes whose state differs from the one of their category.
const EXACT_CODES: &[(i64, WeatherState)] =
    &[(800, WeatherState::Clear), (741, WeatherState::Fog)];

/// Category (leading digit of the code) to state. Category 7 (atmosphere) is
/// intentionally absent: only 741 is known.
const CATEGORIES: &[(char, WeatherState)] = &[
    ('2', WeatherState::Thunderstorm),
    ('3', WeatherState::Drizzle),
    ('5', WeatherState::Rain),
    ('6', WeatherState::Snow),
    ('8', WeatherState::Clouds),
];

/// Classify a condition code. Never fails: unmapped codes yield `Unknown`.
pub fn weather_state_from_code(code: i64) -> WeatherState {
    if let Some((_, state)) = EXACT_CODES.iter().find(|(c, _)| *c == code) {
        return *state;
    }

    let category = code.to_string().chars().next();

    CATEGORIES
        .iter()
        .find(|(c, _)| Some(*c) == category)
        .map(|(_, state)| *state)
        .unwrap_or(WeatherState::Unknown)
}
