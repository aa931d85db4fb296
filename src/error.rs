//! Error types shared across the engine layers.

use thiserror::Error;

/// Reasons a per-symbol fetch is abandoned for the current sweep.
///
/// These are not retried at the sweep level; the scheduler logs the reason,
/// skips the symbol, and moves on to the next one.
#[derive(Debug, Error)]
pub enum FetchAbandoned {
    /// The market price feed answered but did not list the symbol.
    #[error("symbol not present in market price feed")]
    SymbolNotFound,

    /// The market price feed itself could not be reached or parsed.
    #[error("market price feed unavailable: {0}")]
    PriceUnavailable(#[source] reqwest::Error),

    /// Every indicator request failed; there is nothing to evaluate.
    #[error("no indicators could be retrieved")]
    EmptySnapshot,
}

/// Errors surfaced by the signal store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to connect to signal database: {0}")]
    Connect(#[source] tokio_postgres::Error),

    #[error("signal database connection lost before write")]
    Disconnected,

    #[error("signal database query failed: {0}")]
    Query(#[source] tokio_postgres::Error),
}

impl StoreError {
    /// Whether a retry has a chance of succeeding.
    ///
    /// Connection-level failures are transient; errors the server itself
    /// reported (constraint violations, bad SQL) are not.
    pub fn is_transient(&self) -> bool {
        match self {
            StoreError::Connect(_) | StoreError::Disconnected => true,
            StoreError::Query(e) => e.is_closed() || e.as_db_error().is_none(),
        }
    }
}

/// Errors raised while reading startup configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} is not set or empty")]
    MissingVar(&'static str),

    #[error("invalid trading pair {0:?}: expected BASE/QUOTE")]
    InvalidSymbol(String),
}
