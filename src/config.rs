//! Configuration loader for the `weatherflow` backend service.
//!
//! This module centralizes all runtime configuration values and their defaults,
//! loading from environment variables (with optional `.env` file support
//! provided by the caller). By consolidating configuration logic here, we
//! avoid scattering `env::var` calls throughout the codebase.

use std::env;
use std::time::Duration;

use anyhow::{anyhow, Result};

/// Parse an optional integer environment variable with a default value.
macro_rules! parse_env_u32 {
    ($var_name:expr, $default:expr) => {
        env::var($var_name)
            .ok()
            .map(|v| v.parse::<u32>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Parse an optional float environment variable with a default value.
macro_rules! parse_env_f64 {
    ($var_name:expr, $default:expr) => {
        env::var($var_name)
            .ok()
            .map(|v| v.parse::<f64>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Parse a required string environment variable.
macro_rules! require_env {
    ($var_name:expr) => {
        env::var($var_name)
            .map_err(|_| anyhow!("{} must be set in .env or environment", $var_name))?
    };
}

/// Strongly typed application configuration.
///
/// All fields are immutable after loading, ensuring a consistent configuration
/// snapshot for the lifetime of the application.
#[derive(Debug, Clone)]
pub struct Config {
    // ---
    /// PostgreSQL connection string.
    pub db_url: String,

    /// Maximum number of database connections in the pool.
    pub db_pool_max: u32,

    /// Weather provider endpoint (current-conditions query).
    pub api_url: String,

    /// Weather provider API credential, appended as `appid`.
    pub api_key: String,

    /// Cities sampled on every ingestion cycle, in cycle order.
    pub cities: Vec<String>,

    /// Pause between the end of one ingestion cycle and the start of the next.
    pub fetch_interval: Duration,

    /// Upper bound on one outbound provider request.
    pub fetch_timeout: Duration,

    /// Number of most-recent readings the alert engine inspects per city.
    pub alert_window: u32,

    /// Temperature spread across the alert window that counts as a breach.
    pub alert_temp_delta_c: f64,

    /// Condition labels that count as a breach on their own.
    pub alert_severe_conditions: Vec<String>,
}

const DEFAULT_API_URL: &str = "https://api.openweathermap.org/data/2.5/weather";
const DEFAULT_CITIES: &str = "Delhi,Mumbai,Chennai,Bangalore,Kolkata,Hyderabad";
const DEFAULT_SEVERE: &str = "Thunderstorm,Tornado,Squall";

/// Load configuration from environment variables with defaults.
///
/// Required:
/// - `DATABASE_URL` – PostgreSQL connection string
/// - `WEATHER_API_KEY` – provider API credential
///
/// Optional:
/// - `WEATHER_API_URL` – provider endpoint (default: OpenWeatherMap current)
/// - `WEATHER_CITIES` – comma-separated city list
/// - `FETCH_INTERVAL_SECS` – seconds between cycles (default: 300)
/// - `FETCH_TIMEOUT_SECS` – per-request timeout (default: 10)
/// - `DB_POOL_MAX` – max DB connections (default: 5)
/// - `ALERT_WINDOW` – trailing readings inspected per city (default: 6)
/// - `ALERT_TEMP_DELTA_C` – breach threshold in °C (default: 10.0)
/// - `ALERT_SEVERE_CONDITIONS` – comma-separated breach labels
///
/// Returns an error if any required variable is missing or invalid.
pub fn load_from_env() -> Result<Config> {
    // ---
    let db_url = require_env!("DATABASE_URL");
    let api_key = require_env!("WEATHER_API_KEY");
    let api_url = env::var("WEATHER_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

    let cities = parse_list(&env::var("WEATHER_CITIES").unwrap_or_else(|_| DEFAULT_CITIES.into()));
    if cities.is_empty() {
        return Err(anyhow!("WEATHER_CITIES must name at least one city"));
    }

    let severe = parse_list(
        &env::var("ALERT_SEVERE_CONDITIONS").unwrap_or_else(|_| DEFAULT_SEVERE.into()),
    );

    let db_pool_max = parse_env_u32!("DB_POOL_MAX", 5);
    let fetch_interval_secs = parse_env_u32!("FETCH_INTERVAL_SECS", 300);
    let fetch_timeout_secs = parse_env_u32!("FETCH_TIMEOUT_SECS", 10);
    let alert_window = parse_env_u32!("ALERT_WINDOW", 6);
    let alert_temp_delta_c = parse_env_f64!("ALERT_TEMP_DELTA_C", 10.0);

    Ok(Config {
        db_url,
        db_pool_max,
        api_url,
        api_key,
        cities,
        fetch_interval: Duration::from_secs(fetch_interval_secs.into()),
        fetch_timeout: Duration::from_secs(fetch_timeout_secs.into()),
        alert_window,
        alert_temp_delta_c,
        alert_severe_conditions: severe,
    })
}

/// Split a comma-separated list, trimming whitespace and dropping empties.
fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

impl Config {
    /// Log the loaded configuration for debugging purposes.
    ///
    /// Masks sensitive information (database password, API key) while
    /// showing all configuration values that were loaded.
    pub fn log_config(&self) {
        // ---
        // Mask the password in the database URL for security
        let masked_db_url = if let Some(at_pos) = self.db_url.rfind('@') {
            if let Some(colon_pos) = self.db_url[..at_pos].rfind(':') {
                format!(
                    "{}:****{}",
                    &self.db_url[..colon_pos],
                    &self.db_url[at_pos..]
                )
            } else {
                self.db_url.clone()
            }
        } else {
            self.db_url.clone()
        };

        tracing::info!("Configuration loaded:");
        tracing::info!("  DATABASE_URL            : {}", masked_db_url);
        tracing::info!("  WEATHER_API_URL         : {}", self.api_url);
        tracing::info!("  WEATHER_API_KEY         : ****");
        tracing::info!("  WEATHER_CITIES          : {}", self.cities.join(","));
        tracing::info!("  DB_POOL_MAX             : {}", self.db_pool_max);
        tracing::info!("  FETCH_INTERVAL_SECS     : {}", self.fetch_interval.as_secs());
        tracing::info!("  FETCH_TIMEOUT_SECS      : {}", self.fetch_timeout.as_secs());
        tracing::info!("  ALERT_WINDOW            : {}", self.alert_window);
        tracing::info!("  ALERT_TEMP_DELTA_C      : {}", self.alert_temp_delta_c);
        tracing::info!(
            "  ALERT_SEVERE_CONDITIONS : {}",
            self.alert_severe_conditions.join(",")
        );
    }
}
