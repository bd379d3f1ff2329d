//! Error taxonomy for the weather pipeline.
//!
//! Every fallible core operation returns [`WeatherError`] so the ingestion
//! loop can log and skip a city without unwinding, and the HTTP layer can
//! map each kind onto a status code in one place.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

// ---

#[derive(Debug, Error)]
pub enum WeatherError {
    /// Transport failure, timeout, or non-2xx response from the provider.
    #[error("fetch failed: {0}")]
    Fetch(String),

    /// Provider payload was missing a required field or carried a value
    /// that cannot be turned into a valid reading.
    #[error("parse failed: {0}")]
    Parse(String),

    /// Persistence failure on read or write.
    #[error("store failed: {0}")]
    Store(#[from] sqlx::Error),

    /// No reading or summary exists for the request.
    #[error("not found: {0}")]
    NotFound(String),
}

impl From<reqwest::Error> for WeatherError {
    fn from(e: reqwest::Error) -> Self {
        WeatherError::Fetch(e.to_string())
    }
}

/// Map core errors onto HTTP responses. Only the display message is
/// exposed; no internal detail beyond that leaves the process.
impl IntoResponse for WeatherError {
    fn into_response(self) -> Response {
        // ---
        let status = match &self {
            WeatherError::NotFound(_) => StatusCode::NOT_FOUND,
            WeatherError::Fetch(_) => StatusCode::BAD_GATEWAY,
            WeatherError::Parse(_) | WeatherError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}
