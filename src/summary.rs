//! Per-day summary aggregation.
//!
//! Summaries are derived on request from the reading set and never
//! persisted. A day with no readings is a valid summary with
//! `sample_count == 0`, not an error.

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::PgPool;

use crate::error::WeatherError;
use crate::models::Reading;
use crate::store;

// ---

/// Aggregated statistics for one city on one UTC calendar day.
///
/// The optional fields are `None` exactly when `sample_count == 0`.
#[derive(Debug, Clone, Serialize)]
pub struct DailySummary {
    // ---
    pub city: String,
    pub date: NaiveDate,
    pub sample_count: i64,
    pub min_temp_c: Option<f64>,
    pub max_temp_c: Option<f64>,
    pub avg_temp_c: Option<f64>,
    pub dominant_condition: Option<String>,
}

impl DailySummary {
    /// Aggregate a chronologically ordered reading set for one day.
    ///
    /// The dominant condition is the most frequent label; ties go to the
    /// label that occurred first in chronological order.
    pub fn from_readings(city: &str, date: NaiveDate, readings: &[Reading]) -> Self {
        // ---
        if readings.is_empty() {
            return DailySummary {
                city: city.to_string(),
                date,
                sample_count: 0,
                min_temp_c: None,
                max_temp_c: None,
                avg_temp_c: None,
                dominant_condition: None,
            };
        }

        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        for r in readings {
            min = min.min(r.temperature_c);
            max = max.max(r.temperature_c);
            sum += r.temperature_c;
        }

        // Counts in first-occurrence order so a strictly-greater comparison
        // resolves frequency ties toward the earliest label.
        let mut counts: Vec<(&str, usize)> = Vec::new();
        for r in readings {
            match counts.iter_mut().find(|(label, _)| *label == r.condition) {
                Some(entry) => entry.1 += 1,
                None => counts.push((&r.condition, 1)),
            }
        }
        let mut dominant: Option<(&str, usize)> = None;
        for &(label, n) in &counts {
            if dominant.map_or(true, |(_, best)| n > best) {
                dominant = Some((label, n));
            }
        }

        DailySummary {
            city: city.to_string(),
            date,
            sample_count: readings.len() as i64,
            min_temp_c: Some(min),
            max_temp_c: Some(max),
            avg_temp_c: Some(sum / readings.len() as f64),
            dominant_condition: dominant.map(|(label, _)| label.to_string()),
        }
    }
}

/// Summarize one city's readings for one UTC calendar day.
pub async fn summarize(
    pool: &PgPool,
    city: &str,
    date: NaiveDate,
) -> Result<DailySummary, WeatherError> {
    // ---
    let readings = store::range_for_day(pool, city, date).await?;
    Ok(DailySummary::from_readings(city, date, &readings))
}
