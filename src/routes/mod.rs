use axum::Router;
use sqlx::PgPool;

use crate::fetcher::Fetcher;
use crate::Config;

mod health;
mod weather;

// ---

/// Shared state for all request handlers.
pub type AppState = (PgPool, Config, Fetcher);

pub fn router(pool: PgPool, config: Config, fetcher: Fetcher) -> Router {
    // ---
    Router::new()
        .merge(weather::router())
        .merge(health::router())
        .with_state((pool, config, fetcher))
}
