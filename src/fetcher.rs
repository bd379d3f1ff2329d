//! Outbound provider client.
//!
//! One request per city per call; no retry here. A failed fetch surfaces as
//! a typed error and the city is retried naturally on the next scheduler
//! cycle. The whole request is bounded by the configured timeout so one
//! unresponsive city cannot stall an ingestion cycle.

use reqwest::Client;
use serde_json::Value;

use crate::config::Config;
use crate::error::WeatherError;
use crate::models::NewReading;

// ---

#[derive(Debug, Clone)]
pub struct Fetcher {
    // ---
    client: Client,
    api_url: String,
    api_key: String,
}

impl Fetcher {
    pub fn new(cfg: &Config) -> Result<Self, WeatherError> {
        // ---
        let client = Client::builder().timeout(cfg.fetch_timeout).build()?;

        Ok(Fetcher {
            client,
            api_url: cfg.api_url.clone(),
            api_key: cfg.api_key.clone(),
        })
    }

    /// Fetch and normalize the current conditions for one city.
    ///
    /// Transport failures, timeouts, and non-2xx statuses are
    /// [`WeatherError::Fetch`]; an unreadable or incomplete body is
    /// [`WeatherError::Parse`].
    pub async fn fetch_current(&self, city: &str) -> Result<NewReading, WeatherError> {
        // ---
        let response = self
            .client
            .get(&self.api_url)
            .query(&[("q", city), ("appid", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(WeatherError::Fetch(format!(
                "provider returned {status} for {city}"
            )));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| WeatherError::Parse(format!("unreadable provider body: {e}")))?;

        NewReading::from_provider(city, &payload)
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher_for(server: &MockServer) -> Fetcher {
        // ---
        Fetcher {
            client: Client::builder()
                .timeout(Duration::from_secs(2))
                .build()
                .unwrap(),
            api_url: server.uri(),
            api_key: "test-key".into(),
        }
    }

    #[tokio::test]
    async fn test_successful_fetch_normalizes_units() {
        // ---
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("q", "Mumbai"))
            .and(query_param("appid", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "dt": 1_700_000_000,
                "main": { "temp": 295.0, "feels_like": 296.0 },
                "weather": [ { "main": "Haze" } ]
            })))
            .mount(&server)
            .await;

        let reading = fetcher_for(&server).fetch_current("Mumbai").await.unwrap();

        assert_eq!(reading.city, "Mumbai");
        assert_eq!(reading.temperature_c, 295.0 - 273.15);
        assert_eq!(reading.condition, "Haze");
    }

    #[tokio::test]
    async fn test_non_2xx_is_fetch_error() {
        // ---
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = fetcher_for(&server).fetch_current("Delhi").await.unwrap_err();
        assert!(matches!(err, WeatherError::Fetch(_)), "got: {err}");
    }

    #[tokio::test]
    async fn test_incomplete_payload_is_parse_error() {
        // ---
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "dt": 1_700_000_000,
                "weather": [ { "main": "Clear" } ]
            })))
            .mount(&server)
            .await;

        let err = fetcher_for(&server).fetch_current("Delhi").await.unwrap_err();
        assert!(matches!(err, WeatherError::Parse(_)), "got: {err}");
    }
}
