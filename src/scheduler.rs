//! Ingestion scheduler.
//!
//! One long-lived task drives fetch -> append -> evaluate for every
//! configured city, then sleeps the fixed interval before the next cycle.
//! The interval is measured from the end of one cycle to the start of the
//! next, not wall-clock aligned. A failure for one city is logged and the
//! cycle moves on to the next city.

use std::future::Future;
use std::sync::Arc;

use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use crate::alert::AlertEngine;
use crate::config::Config;
use crate::error::WeatherError;
use crate::fetcher::Fetcher;
use crate::store;

// ---

/// Run ingestion cycles until the token is cancelled.
pub async fn run(
    pool: PgPool,
    cfg: Config,
    fetcher: Fetcher,
    alerts: Arc<AlertEngine>,
    shutdown: CancellationToken,
) {
    // ---
    loop {
        if shutdown.is_cancelled() {
            break;
        }

        let stored = run_cycle(&cfg.cities, |city| {
            let pool = pool.clone();
            let fetcher = fetcher.clone();
            let alerts = alerts.clone();
            async move { ingest_city(&pool, &fetcher, &alerts, &city).await }
        })
        .await;

        tracing::info!(
            "ingestion cycle complete: {stored}/{} cities stored",
            cfg.cities.len()
        );

        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = tokio::time::sleep(cfg.fetch_interval) => {}
        }
    }

    tracing::info!("ingestion scheduler stopped");
}

/// One pass over the city list, returning how many cities were stored.
///
/// Each city's outcome is independent: an error is logged for that city
/// and the pass continues.
async fn run_cycle<F, Fut>(cities: &[String], mut ingest: F) -> usize
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<(), WeatherError>>,
{
    // ---
    let mut stored = 0;
    for city in cities {
        match ingest(city.clone()).await {
            Ok(()) => stored += 1,
            Err(e) => tracing::error!("skipping {city} this cycle: {e}"),
        }
    }
    stored
}

/// Fetch, append, then evaluate alerts for one city.
///
/// Alert evaluation is best-effort: its failure is logged and never undoes
/// the append that just succeeded.
async fn ingest_city(
    pool: &PgPool,
    fetcher: &Fetcher,
    alerts: &AlertEngine,
    city: &str,
) -> Result<(), WeatherError> {
    // ---
    let reading = fetcher.fetch_current(city).await?;
    store::append(pool, &reading).await?;

    if let Err(e) = alerts.evaluate(pool, city).await {
        tracing::error!("alert evaluation failed for {city}: {e}");
    }

    Ok(())
}
