//! Alert evaluation over each city's trailing window of readings.
//!
//! The engine owns all per-city alert state for the lifetime of the
//! process. A breach holds when the window contains a severe condition
//! label or when the temperature spread across the window exceeds the
//! configured delta. Raising and clearing are edge-triggered: one event
//! per episode, and clearing requires the entire window to be free of
//! breach, so a single calm sample cannot end an episode (hysteresis).

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

use crate::config::Config;
use crate::error::WeatherError;
use crate::models::Reading;
use crate::store;

// ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AlertPhase {
    Normal,
    Alerting,
}

/// Per-city alert state, created lazily on first evaluation and kept for
/// the lifetime of the process.
#[derive(Debug, Clone)]
pub struct AlertState {
    // ---
    pub phase: AlertPhase,
    /// When the current phase began (observation time of the transition).
    pub since: DateTime<Utc>,
    pub last_condition: String,
}

/// Edge event produced by a phase transition.
#[derive(Debug, Clone, PartialEq)]
pub enum AlertEvent {
    Raised {
        city: String,
        reason: String,
        at: DateTime<Utc>,
    },
    Cleared {
        city: String,
        at: DateTime<Utc>,
    },
}

// ---

pub struct AlertEngine {
    // ---
    window: u32,
    temp_delta_c: f64,
    severe_conditions: Vec<String>,
    states: Mutex<HashMap<String, AlertState>>,
}

impl AlertEngine {
    pub fn new(cfg: &Config) -> Self {
        // ---
        AlertEngine {
            window: cfg.alert_window,
            temp_delta_c: cfg.alert_temp_delta_c,
            severe_conditions: cfg.alert_severe_conditions.clone(),
            states: Mutex::new(HashMap::new()),
        }
    }

    /// Evaluate the trailing window for `city` and apply any transition.
    ///
    /// Returns the emitted event, if the evaluation crossed an edge.
    /// Callers treat this as best-effort: a store failure here is reported
    /// but must never undo the append that preceded it.
    pub async fn evaluate(
        &self,
        pool: &PgPool,
        city: &str,
    ) -> Result<Option<AlertEvent>, WeatherError> {
        // ---
        let readings = store::recent(pool, city, self.window).await?;
        let Some(newest) = readings.last() else {
            return Ok(None);
        };

        let breach = self.breach_reason(&readings);
        let event = self.apply(city, newest.observed_at, &newest.condition, breach);

        match &event {
            Some(AlertEvent::Raised { city, reason, at }) => {
                tracing::warn!("ALERT raised for {city} at {at}: {reason}");
            }
            Some(AlertEvent::Cleared { city, at }) => {
                tracing::info!("alert cleared for {city} at {at}");
            }
            None => {}
        }

        Ok(event)
    }

    /// Snapshot of one city's state, if it has ever been evaluated.
    pub fn state(&self, city: &str) -> Option<AlertState> {
        self.lock_states().get(city).cloned()
    }

    /// Whether the window constitutes a breach, and why.
    fn breach_reason(&self, window: &[Reading]) -> Option<String> {
        // ---
        if let Some(severe) = window
            .iter()
            .find(|r| self.severe_conditions.iter().any(|s| s == &r.condition))
        {
            return Some(format!("severe condition {}", severe.condition));
        }

        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for r in window {
            min = min.min(r.temperature_c);
            max = max.max(r.temperature_c);
        }
        if !window.is_empty() && max - min > self.temp_delta_c {
            return Some(format!(
                "temperature swing {:.2}C exceeds {:.2}C across window",
                max - min,
                self.temp_delta_c
            ));
        }

        None
    }

    /// Apply one evaluation outcome to the city's state under the lock.
    ///
    /// Holding the lock across the whole read-decide-write keeps two
    /// concurrent evaluations for one city from both observing Normal and
    /// double-raising.
    fn apply(
        &self,
        city: &str,
        at: DateTime<Utc>,
        condition: &str,
        breach: Option<String>,
    ) -> Option<AlertEvent> {
        // ---
        let mut states = self.lock_states();
        let state = states.entry(city.to_string()).or_insert_with(|| AlertState {
            phase: AlertPhase::Normal,
            since: at,
            last_condition: condition.to_string(),
        });
        state.last_condition = condition.to_string();

        match (state.phase, breach) {
            (AlertPhase::Normal, Some(reason)) => {
                state.phase = AlertPhase::Alerting;
                state.since = at;
                Some(AlertEvent::Raised {
                    city: city.to_string(),
                    reason,
                    at,
                })
            }
            (AlertPhase::Alerting, None) => {
                state.phase = AlertPhase::Normal;
                state.since = at;
                Some(AlertEvent::Cleared {
                    city: city.to_string(),
                    at,
                })
            }
            // Ongoing episode or ongoing calm: no edge, no event.
            (AlertPhase::Alerting, Some(_)) | (AlertPhase::Normal, None) => None,
        }
    }

    fn lock_states(&self) -> std::sync::MutexGuard<'_, HashMap<String, AlertState>> {
        self.states.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
