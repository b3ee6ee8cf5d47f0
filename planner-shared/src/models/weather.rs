use serde::{Deserialize, Serialize};

use crate::form::ValidationErrors;

/// Forecast length used when the caller does not ask for one.
pub const DEFAULT_FORECAST_DAYS: u8 = 5;

/// A checked weather lookup: a non-blank city and a forecast length of at
/// least one day. Only [`WeatherQuery::new`] builds one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WeatherQuery {
    city: String,
    days: u8,
}

impl WeatherQuery {
    /// Trims the city and applies [`DEFAULT_FORECAST_DAYS`] when `days` is unset.
    ///
    /// # Errors
    /// Returns the per-field messages for a blank city or zero days.
    pub fn new(city: &str, days: Option<u8>) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let city = city.trim();
        if city.is_empty() {
            errors.add("city", "is required");
        }
        let days = days.unwrap_or(DEFAULT_FORECAST_DAYS);
        if days == 0 {
            errors.add("days", "must be at least 1");
        }
        errors.into_result(|| Self {
            city: city.to_string(),
            days,
        })
    }

    /// City as entered, trimmed.
    #[must_use]
    pub fn city(&self) -> &str {
        &self.city
    }

    /// Forecast length in days. Ignored by current-conditions lookups.
    #[must_use]
    pub fn days(&self) -> u8 {
        self.days
    }
}

/// Current conditions for a city (`GET /weather/current/{city}`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CurrentWeather {
    /// City name as resolved by the weather provider.
    pub city_name: String,
    /// ISO country code.
    #[serde(default)]
    pub country: String,
    /// Degrees Celsius.
    pub temperature: f64,
    /// Short condition text, e.g. `light rain`.
    pub description: String,
    /// Relative humidity in percent.
    pub humidity: f64,
    /// Metres per second.
    pub wind_speed: f64,
    /// Apparent temperature in degrees Celsius.
    pub feels_like: f64,
    /// Provider icon code.
    #[serde(default)]
    pub icon: String,
    /// Unix seconds of the observation.
    #[serde(default)]
    pub timestamp: i64,
}

/// One day of a forecast.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailyForecast {
    /// Unix seconds at the start of the day.
    pub timestamp: i64,
    /// Degrees Celsius.
    pub temperature: f64,
    /// Short condition text.
    pub description: String,
    /// Relative humidity in percent.
    pub humidity: f64,
    /// Metres per second.
    pub wind_speed: f64,
    /// Apparent temperature in degrees Celsius.
    pub feels_like: f64,
    /// Provider icon code.
    #[serde(default)]
    pub icon: String,
    /// Server-formatted date label.
    #[serde(default)]
    pub date_text: String,
}

/// Multi-day forecast (`GET /weather/forecast/{city}?days=N`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Forecast {
    /// City name as resolved by the weather provider.
    pub city_name: String,
    /// ISO country code.
    #[serde(default)]
    pub country: String,
    /// IANA timezone of the city.
    #[serde(default)]
    pub timezone: String,
    /// One entry per day, earliest first.
    #[serde(default)]
    pub daily_forecasts: Vec<DailyForecast>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weather_query_checks_input() {
        let query = WeatherQuery::new("  New York ", None).unwrap();
        assert_eq!(query.city(), "New York");
        assert_eq!(query.days(), DEFAULT_FORECAST_DAYS);

        let errors = WeatherQuery::new(" ", Some(0)).unwrap_err();
        assert_eq!(errors.get("city"), Some("is required"));
        assert_eq!(errors.get("days"), Some("must be at least 1"));
    }

    #[test]
    fn test_current_weather_wire_format() {
        let json = r#"{"cityName":"Vlorë","temperature":27.4,"description":"clear sky","humidity":40,"windSpeed":3.1,"feelsLike":28.0,"icon":"01d","country":"AL","timestamp":1719830400}"#;
        let weather: CurrentWeather = serde_json::from_str(json).unwrap();
        assert_eq!(weather.city_name, "Vlorë");
        assert!((weather.humidity - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_forecast_defaults_missing_days() {
        let json = r#"{"cityName":"Tirana","country":"AL"}"#;
        let forecast: Forecast = serde_json::from_str(json).unwrap();
        assert!(forecast.daily_forecasts.is_empty());
        assert_eq!(forecast.timezone, "");
    }
}
