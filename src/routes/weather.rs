//! Weather query endpoints.
//!
//! Thin consumers of the core: latest-per-city and daily summaries read
//! through the store, the current endpoint goes straight to the provider.
//! Error mapping lives on [`WeatherError`]'s `IntoResponse` impl.

use axum::{
    extract::Query, extract::State, http::StatusCode, response::IntoResponse,
    response::Response, routing::get, Json, Router,
};
use chrono::{Days, Utc};
use serde::Deserialize;
use tracing::info;

use super::AppState;
use crate::error::WeatherError;
use crate::models::{NewReading, Reading};
use crate::summary::{self, DailySummary};
use crate::store;

// ---

/// Number of calendar days in the trailing summary report (today inclusive).
const SUMMARY_DAYS: u64 = 5;

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route("/api/v1/weather", get(latest_weather))
        .route("/api/v1/weather/summary", get(daily_summaries))
        .route("/api/v1/weather/current", get(current_weather))
}

/// Handle `GET /api/v1/weather`.
///
/// Latest stored reading per configured city. Cities with no readings are
/// omitted; an entirely empty result is a 404.
async fn latest_weather(
    State((pool, config, _)): State<AppState>,
) -> Result<Json<Vec<Reading>>, WeatherError> {
    // ---
    let mut latest = Vec::new();
    for city in &config.cities {
        match store::latest(&pool, city).await {
            Ok(reading) => latest.push(reading),
            Err(WeatherError::NotFound(_)) => continue,
            Err(e) => return Err(e),
        }
    }

    if latest.is_empty() {
        return Err(WeatherError::NotFound(
            "no weather data stored for any configured city".to_string(),
        ));
    }

    Ok(Json(latest))
}

#[derive(Debug, Deserialize)]
struct SummaryQuery {
    city: Option<String>,
}

/// Handle `GET /api/v1/weather/summary?city=<name>`.
///
/// Returns one summary per UTC day for today and the preceding four days,
/// most recent first. Days without readings are explicit no-data summaries.
async fn daily_summaries(
    Query(params): Query<SummaryQuery>,
    State((pool, _, _)): State<AppState>,
) -> Response {
    // ---
    let Some(city) = params.city.filter(|c| !c.is_empty()) else {
        return (StatusCode::BAD_REQUEST, "city parameter is required").into_response();
    };

    let today = Utc::now().date_naive();
    let mut summaries: Vec<DailySummary> = Vec::with_capacity(SUMMARY_DAYS as usize);
    for offset in 0..SUMMARY_DAYS {
        let Some(date) = today.checked_sub_days(Days::new(offset)) else {
            continue;
        };
        match summary::summarize(&pool, &city, date).await {
            Ok(s) => summaries.push(s),
            Err(e) => return e.into_response(),
        }
    }

    info!("returning {} daily summaries for {city}", summaries.len());
    Json(summaries).into_response()
}

/// Handle `GET /api/v1/weather/current`.
///
/// Live provider fetch for every configured city, bypassing the store.
async fn current_weather(
    State((_, config, fetcher)): State<AppState>,
) -> Result<Json<Vec<NewReading>>, WeatherError> {
    // ---
    let mut readings = Vec::with_capacity(config.cities.len());
    for city in &config.cities {
        readings.push(fetcher.fetch_current(city).await?);
    }
    Ok(Json(readings))
}
