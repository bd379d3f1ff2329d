//! Database schema management for `weatherflow`.
//!
//! Ensures required tables and indexes exist before serving requests.
//! Applied once on startup from `main.rs`.

use anyhow::Result;
use sqlx::PgPool;

// ---

/// Create or update the database schema (idempotent).
///
/// Creates the append-only `weather_readings` table. Safe to call on every
/// startup; no-op if objects already exist.
///
/// Errors are propagated if any SQL execution fails.
pub async fn create_schema(pool: &PgPool) -> Result<()> {
    // ---
    let mut tx = pool.begin().await?;

    // One row per sampled observation; never updated or deleted.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS weather_readings (
            id            SERIAL PRIMARY KEY,
            city          TEXT             NOT NULL,
            observed_at   TIMESTAMPTZ      NOT NULL,
            temperature_c DOUBLE PRECISION NOT NULL,
            feels_like_c  DOUBLE PRECISION NOT NULL,
            condition     TEXT             NOT NULL
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    // Serves latest-per-city, day-range, and trailing-window queries.
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_weather_readings_city_observed_at
            ON weather_readings (city, observed_at DESC);
        "#,
    )
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}
