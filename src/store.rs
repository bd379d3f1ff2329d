//! Append-only persistence for weather readings.
//!
//! Readings are never updated or deleted; every write is a single INSERT so
//! it commits or fails atomically. Reads see only committed rows (Postgres
//! read-committed), which is what keeps `latest` consistent with writers
//! running in the scheduler task.
//!
//! Calendar-day queries use the UTC day boundary: a reading belongs to day
//! `d` when `d 00:00:00Z <= observed_at < d+1 00:00:00Z`.

use chrono::{NaiveDate, NaiveTime};
use sqlx::PgPool;

use crate::error::WeatherError;
use crate::models::{NewReading, Reading};

// ---

/// Insert one reading and return the stored row with its assigned id.
pub async fn append(pool: &PgPool, reading: &NewReading) -> Result<Reading, WeatherError> {
    // ---
    let stored = sqlx::query_as::<_, Reading>(
        r#"
        INSERT INTO weather_readings (city, observed_at, temperature_c, feels_like_c, condition)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, city, observed_at, temperature_c, feels_like_c, condition
        "#,
    )
    .bind(&reading.city)
    .bind(reading.observed_at)
    .bind(reading.temperature_c)
    .bind(reading.feels_like_c)
    .bind(&reading.condition)
    .fetch_one(pool)
    .await?;

    Ok(stored)
}

/// The reading with the maximum `observed_at` for `city`.
///
/// Duplicate timestamps are permitted, so ties are broken by the larger id
/// (the later append). Returns [`WeatherError::NotFound`] when the city has
/// no readings at all.
pub async fn latest(pool: &PgPool, city: &str) -> Result<Reading, WeatherError> {
    // ---
    sqlx::query_as::<_, Reading>(
        r#"
        SELECT id, city, observed_at, temperature_c, feels_like_c, condition
        FROM weather_readings
        WHERE city = $1
        ORDER BY observed_at DESC, id DESC
        LIMIT 1
        "#,
    )
    .bind(city)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| WeatherError::NotFound(format!("no readings for city {city}")))
}

/// All readings for `city` within the given UTC calendar day, in
/// chronological order. An empty day is an empty vec, not an error.
pub async fn range_for_day(
    pool: &PgPool,
    city: &str,
    date: NaiveDate,
) -> Result<Vec<Reading>, WeatherError> {
    // ---
    let start = date.and_time(NaiveTime::MIN).and_utc();
    let end = start + chrono::Duration::days(1);

    let readings = sqlx::query_as::<_, Reading>(
        r#"
        SELECT id, city, observed_at, temperature_c, feels_like_c, condition
        FROM weather_readings
        WHERE city = $1 AND observed_at >= $2 AND observed_at < $3
        ORDER BY observed_at ASC, id ASC
        "#,
    )
    .bind(city)
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;

    Ok(readings)
}

/// The trailing window of at most `limit` readings for `city`, returned in
/// chronological order. Used by the alert engine.
pub async fn recent(pool: &PgPool, city: &str, limit: u32) -> Result<Vec<Reading>, WeatherError> {
    // ---
    let mut readings = sqlx::query_as::<_, Reading>(
        r#"
        SELECT id, city, observed_at, temperature_c, feels_like_c, condition
        FROM weather_readings
        WHERE city = $1
        ORDER BY observed_at DESC, id DESC
        LIMIT $2
        "#,
    )
    .bind(city)
    .bind(i64::from(limit))
    .fetch_all(pool)
    .await?;

    readings.reverse();
    Ok(readings)
}
