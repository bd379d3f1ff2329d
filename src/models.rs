//! Data models for the weather pipeline.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::error::WeatherError;

// ---

/// Kelvin offset used by the provider for both temperature fields.
const KELVIN_OFFSET: f64 = 273.15;

/// Converted temperatures outside this band are treated as provider garbage
/// and rejected rather than stored.
const PLAUSIBLE_C: std::ops::RangeInclusive<f64> = -95.0..=65.0;

/// A normalized weather sample, ready to be appended to the store.
/// Serialized directly on the live current-weather path, before it has
/// a stored id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewReading {
    // ---
    pub city: String,
    pub observed_at: DateTime<Utc>,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub condition: String,
}

/// A stored reading, identified by its surrogate id.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Reading {
    // ---
    pub id: i32,
    pub city: String,
    pub observed_at: DateTime<Utc>,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub condition: String,
}

// ---

fn missing(field: &str) -> WeatherError {
    WeatherError::Parse(format!("missing or malformed field: {field}"))
}

impl NewReading {
    /// Normalize a raw provider payload into a reading for `city`.
    ///
    /// Required fields: `dt` (unix seconds), `main.temp` and
    /// `main.feels_like` (Kelvin), `weather[0].main` (condition label).
    /// Both temperatures are converted with `c = k - 273.15`, no rounding.
    /// Every extraction is checked; a missing or mistyped field yields
    /// [`WeatherError::Parse`] naming the field.
    pub fn from_provider(city: &str, payload: &Value) -> Result<Self, WeatherError> {
        // ---
        let dt = payload
            .get("dt")
            .and_then(Value::as_f64)
            .ok_or_else(|| missing("dt"))?;
        let observed_at = DateTime::from_timestamp(dt as i64, 0)
            .ok_or_else(|| WeatherError::Parse(format!("dt out of range: {dt}")))?;

        let main = payload.get("main").ok_or_else(|| missing("main"))?;
        let temp_k = main
            .get("temp")
            .and_then(Value::as_f64)
            .ok_or_else(|| missing("main.temp"))?;
        let feels_k = main
            .get("feels_like")
            .and_then(Value::as_f64)
            .ok_or_else(|| missing("main.feels_like"))?;

        let condition = payload
            .get("weather")
            .and_then(Value::as_array)
            .and_then(|w| w.first())
            .and_then(|w| w.get("main"))
            .and_then(Value::as_str)
            .ok_or_else(|| missing("weather[0].main"))?;

        let temperature_c = temp_k - KELVIN_OFFSET;
        let feels_like_c = feels_k - KELVIN_OFFSET;

        if !PLAUSIBLE_C.contains(&temperature_c) {
            return Err(WeatherError::Parse(format!(
                "implausible temperature {temperature_c:.2}C for {city}"
            )));
        }

        Ok(NewReading {
            city: city.to_string(),
            observed_at,
            temperature_c,
            feels_like_c,
            condition: condition.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use serde_json::json;

    fn provider_payload(temp_k: f64, feels_k: f64, condition: &str) -> Value {
        // ---
        json!({
            "dt": 1_700_000_000,
            "main": { "temp": temp_k, "feels_like": feels_k },
            "weather": [ { "main": condition } ]
        })
    }

    #[test]
    fn test_kelvin_conversion_is_exact() {
        // ---
        let payload = provider_payload(300.0, 302.5, "Clear");
        let reading = NewReading::from_provider("Delhi", &payload).unwrap();

        // 300.0K is 26.85C, no rounding applied
        assert_eq!(reading.temperature_c, 300.0 - 273.15);
        assert_eq!(reading.feels_like_c, 302.5 - 273.15);
        assert_eq!(reading.city, "Delhi");
        assert_eq!(reading.condition, "Clear");
    }

    #[test]
    fn test_timestamp_is_unix_seconds_utc() {
        // ---
        let payload = provider_payload(295.0, 295.0, "Haze");
        let reading = NewReading::from_provider("Mumbai", &payload).unwrap();

        assert_eq!(reading.observed_at.timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_missing_fields_are_parse_errors() {
        // ---
        let cases = [
            json!({ "main": { "temp": 295.0, "feels_like": 295.0 },
                    "weather": [ { "main": "Clear" } ] }),
            json!({ "dt": 1_700_000_000,
                    "weather": [ { "main": "Clear" } ] }),
            json!({ "dt": 1_700_000_000,
                    "main": { "feels_like": 295.0 },
                    "weather": [ { "main": "Clear" } ] }),
            json!({ "dt": 1_700_000_000,
                    "main": { "temp": 295.0, "feels_like": 295.0 } }),
            json!({ "dt": 1_700_000_000,
                    "main": { "temp": 295.0, "feels_like": 295.0 },
                    "weather": [] }),
        ];

        for payload in cases {
            let err = NewReading::from_provider("Delhi", &payload).unwrap_err();
            assert!(matches!(err, WeatherError::Parse(_)), "payload: {payload}");
        }
    }

    #[test]
    fn test_mistyped_field_is_parse_error_not_panic() {
        // ---
        let payload = json!({
            "dt": 1_700_000_000,
            "main": { "temp": "not-a-number", "feels_like": 295.0 },
            "weather": [ { "main": "Clear" } ]
        });

        let err = NewReading::from_provider("Chennai", &payload).unwrap_err();
        assert!(matches!(err, WeatherError::Parse(_)));
    }

    #[test]
    fn test_implausible_temperature_is_rejected() {
        // ---
        // 0K would convert to -273.15C, far outside the plausible band
        let payload = provider_payload(0.0, 0.0, "Clear");
        let err = NewReading::from_provider("Kolkata", &payload).unwrap_err();
        assert!(matches!(err, WeatherError::Parse(_)));

        // 400K (126.85C) is equally impossible for surface weather
        let payload = provider_payload(400.0, 400.0, "Clear");
        let err = NewReading::from_provider("Kolkata", &payload).unwrap_err();
        assert!(matches!(err, WeatherError::Parse(_)));
    }
}
