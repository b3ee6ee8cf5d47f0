use shared::models::{CurrentWeather, Forecast, WeatherQuery};

use super::encode_segment;
use crate::{error::ClientResult, http::ApiClient};

/// `/weather` lookups. Not tied to any trip.
#[derive(Debug, Clone)]
pub struct WeatherApi {
    api: ApiClient,
}

impl WeatherApi {
    /// A client over `api`.
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// # Errors
    /// As [`ApiClient::get_json`].
    pub async fn current(&self, query: &WeatherQuery) -> ClientResult<CurrentWeather> {
        let city = encode_segment(query.city());
        self.api.get_json(&format!("weather/current/{city}")).await
    }

    /// Forecast for [`WeatherQuery::days`] days.
    ///
    /// # Errors
    /// As [`ApiClient::get_json`].
    pub async fn forecast(&self, query: &WeatherQuery) -> ClientResult<Forecast> {
        let city = encode_segment(query.city());
        let days = query.days();
        self.api
            .get_json(&format!("weather/forecast/{city}?days={days}"))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        navigation::MemoryHistory, session::SessionStore, storage::MemoryStorage,
        test_support::ScriptedTransport,
    };
    use http::StatusCode;
    use std::sync::Arc;

    fn weather() -> (WeatherApi, Arc<ScriptedTransport>) {
        let transport = Arc::new(ScriptedTransport::new());
        let api = ApiClient::new(
            "http://localhost:8080/api",
            transport.clone(),
            Arc::new(SessionStore::new(Arc::new(MemoryStorage::new()))),
            Arc::new(MemoryHistory::new()),
        );
        (WeatherApi::new(api), transport)
    }

    #[tokio::test]
    async fn test_current_encodes_city() {
        let (weather, transport) = weather();
        transport.respond(
            StatusCode::OK,
            r#"{"cityName":"New York","temperature":20,"description":"mist","humidity":80,"windSpeed":2,"feelsLike":19}"#,
        );
        let query = WeatherQuery::new(" New York ", None).unwrap();
        let current = weather.current(&query).await.unwrap();
        assert_eq!(current.city_name, "New York");
        let request = transport.last_request().unwrap();
        assert_eq!(request.url.path(), "/api/weather/current/New%20York");
    }

    #[tokio::test]
    async fn test_forecast_defaults_to_five_days() {
        let (weather, transport) = weather();
        transport.respond(StatusCode::OK, r#"{"cityName":"Tirana"}"#);
        weather
            .forecast(&WeatherQuery::new("Tirana", None).unwrap())
            .await
            .unwrap();
        let request = transport.last_request().unwrap();
        assert_eq!(request.url.path(), "/api/weather/forecast/Tirana");
        assert_eq!(request.url.query(), Some("days=5"));

        weather
            .forecast(&WeatherQuery::new("Tirana", Some(3)).unwrap())
            .await
            .unwrap();
        assert_eq!(transport.last_request().unwrap().url.query(), Some("days=3"));
    }
}
