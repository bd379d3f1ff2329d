//! Live-server contract tests.
//!
//! These hit a running weatherflow instance and are skipped unless
//! `WEATHERFLOW_BASE_URL` is set (e.g. `http://localhost:8080`).

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Client;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Reading {
    id: i32,
    city: String,
    observed_at: DateTime<Utc>,
    temperature_c: f64,
    feels_like_c: f64,
    condition: String,
}

#[derive(Debug, Deserialize)]
struct DailySummary {
    city: String,
    date: NaiveDate,
    sample_count: i64,
    min_temp_c: Option<f64>,
    max_temp_c: Option<f64>,
    avg_temp_c: Option<f64>,
    dominant_condition: Option<String>,
}

fn base_url() -> Option<String> {
    std::env::var("WEATHERFLOW_BASE_URL").ok()
}

#[tokio::test]
async fn health_endpoint_responds_ok() -> Result<()> {
    // ---
    let Some(base) = base_url() else { return Ok(()) };

    let status = Client::new()
        .get(format!("{base}/health"))
        .send()
        .await?
        .status();
    assert!(status.is_success(), "health check failed: {status}");

    Ok(())
}

#[tokio::test]
async fn latest_weather_returns_one_reading_per_city() -> Result<()> {
    // ---
    let Some(base) = base_url() else { return Ok(()) };

    let response = Client::new()
        .get(format!("{base}/api/v1/weather"))
        .send()
        .await?;

    // 404 is the contract for an empty store; anything else must be a
    // well-formed reading list with at most one entry per city.
    if response.status() == reqwest::StatusCode::NOT_FOUND {
        return Ok(());
    }
    assert!(response.status().is_success());

    let readings: Vec<Reading> = response.json().await?;
    assert!(!readings.is_empty());

    for r in &readings {
        assert!(r.id > 0);
        assert!(!r.city.is_empty());
        assert!(!r.condition.is_empty());
        assert!(
            r.observed_at > DateTime::from_timestamp(0, 0).unwrap(),
            "observed_at should be a real timestamp"
        );
        // Normalized Celsius values are physically plausible
        assert!((-95.0..=65.0).contains(&r.temperature_c));
        assert!(r.feels_like_c.is_finite());
    }

    let mut cities: Vec<&str> = readings.iter().map(|r| r.city.as_str()).collect();
    cities.sort_unstable();
    cities.dedup();
    assert_eq!(cities.len(), readings.len(), "duplicate city in latest set");

    Ok(())
}

#[tokio::test]
async fn summary_requires_city_parameter() -> Result<()> {
    // ---
    let Some(base) = base_url() else { return Ok(()) };

    let status = Client::new()
        .get(format!("{base}/api/v1/weather/summary"))
        .send()
        .await?
        .status();
    assert_eq!(status, reqwest::StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn summary_covers_trailing_five_days() -> Result<()> {
    // ---
    let Some(base) = base_url() else { return Ok(()) };

    let summaries: Vec<DailySummary> = Client::new()
        .get(format!("{base}/api/v1/weather/summary?city=Delhi"))
        .send()
        .await?
        .json()
        .await?;

    assert_eq!(summaries.len(), 5);

    for pair in summaries.windows(2) {
        assert!(pair[0].date > pair[1].date, "summaries must be most recent first");
    }

    for s in &summaries {
        assert_eq!(s.city, "Delhi");
        if s.sample_count == 0 {
            // Explicit no-data variant instead of an error
            assert!(s.min_temp_c.is_none());
            assert!(s.max_temp_c.is_none());
            assert!(s.avg_temp_c.is_none());
            assert!(s.dominant_condition.is_none());
        } else {
            let (min, avg, max) = (
                s.min_temp_c.expect("min"),
                s.avg_temp_c.expect("avg"),
                s.max_temp_c.expect("max"),
            );
            assert!(min <= avg && avg <= max, "summary stats out of order: {s:?}");
            assert!(s.dominant_condition.is_some());
        }
    }

    Ok(())
}
