//! Indicatrix Worker
//!
//! Runs the polling sweeps: fetches indicators and market prices for the
//! configured symbols, evaluates them, and upserts one live signal row
//! per symbol. Can be run as a separate process from the API server.

use dotenvy::dotenv;
use indicatrix::config;
use indicatrix::core::scheduler::{PollingScheduler, SweepConfig, SweepContext};
use indicatrix::db::{SignalDatabase, SignalSink};
use indicatrix::logging;
use indicatrix::metrics::Metrics;
use indicatrix::services::fetcher::{FetcherConfig, IndicatorFetcher, SnapshotSource};
use indicatrix::services::price_feed::PriceFeedClient;
use indicatrix::services::rate_limit::KeyRateLimiter;
use indicatrix::services::taapi::TaapiClient;
use indicatrix::services::CredentialPool;
use std::env;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env if present
    dotenv().ok();

    // Initialize logging based on environment
    logging::init_logging();

    let env_name = config::get_environment();
    info!("Starting Indicatrix Worker");
    info!(environment = %env_name, "Environment");

    let symbols = config::get_symbols()?;
    let api_keys = config::get_api_keys()?;
    info!(
        symbol_count = symbols.len(),
        key_count = api_keys.len(),
        "Sweeping {} symbols across {} API keys",
        symbols.len(),
        api_keys.len()
    );

    // Optional cadence overrides, in seconds
    let fast_period = env::var("FAST_SWEEP_SECONDS")
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_secs);
    let slow_period = env::var("SLOW_SWEEP_SECONDS")
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_secs);

    let mut fast = SweepConfig::fast();
    if let Some(period) = fast_period {
        fast = fast.with_period(period);
    }
    let mut slow = SweepConfig::slow();
    if let Some(period) = slow_period {
        slow = slow.with_period(period);
    }
    info!(
        fast_secs = fast.period.as_secs(),
        slow_secs = slow.period.as_secs(),
        "Sweep cadences: buy/sell every {}s, hold/exit every {}s",
        fast.period.as_secs(),
        slow.period.as_secs()
    );

    // Initialize metrics
    let metrics = Arc::new(Metrics::new()?);

    // Initialize the signal database (required for the worker)
    info!("Initializing signal database connection...");
    let database = match SignalDatabase::connect(config::get_database_url()).await {
        Ok(db) => {
            info!("Signal database connected");
            metrics.database_connected.set(1.0);
            Arc::new(db)
        }
        Err(e) => {
            warn!(error = %e, "Failed to connect to signal database");
            warn!("Worker requires the signal database - exiting");
            return Err(format!("signal database connection required for worker: {}", e).into());
        }
    };

    // Shared rate limiter and provider clients
    let limiter = Arc::new(KeyRateLimiter::default());
    let http = reqwest::Client::new();
    let indicators = TaapiClient::with_client(config::get_taapi_base_url(), limiter, http.clone());
    let prices = PriceFeedClient::with_client(config::get_price_feed_url(), http);
    let fetcher = IndicatorFetcher::new(indicators, prices, FetcherConfig::default())
        .with_metrics(metrics.clone());

    let credentials = CredentialPool::new(api_keys)?;
    let source: Arc<dyn SnapshotSource> = Arc::new(fetcher);
    let sink: Arc<dyn SignalSink> = database.clone();

    let ctx = SweepContext {
        symbols,
        credentials,
        source,
        sink,
        metrics: Some(metrics.clone()),
    };

    // Start the polling loops
    let scheduler = PollingScheduler::new(ctx, vec![fast, slow]);
    scheduler.start().await;

    // Graceful shutdown
    info!("Worker started, waiting for shutdown signal...");
    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Shutting down worker...");
            scheduler.stop().await;
            info!("Worker stopped");
        }
    }

    Ok(())
}
