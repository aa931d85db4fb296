//! Environment-backed configuration accessors.

use crate::error::ConfigError;
use crate::models::Symbol;
use backon::ExponentialBuilder;
use std::env;
use std::time::Duration;

pub fn get_environment() -> String {
    env::var("ENVIRONMENT").unwrap_or_else(|_| "sandbox".to_string())
}

pub fn get_database_url() -> String {
    env::var("DATABASE_URL").unwrap_or_else(|_| {
        "host=localhost port=5432 user=postgres password=postgres dbname=indicatrix".to_string()
    })
}

pub fn get_taapi_base_url() -> String {
    env::var("TAAPI_BASE_URL").unwrap_or_else(|_| "https://api.taapi.io".to_string())
}

pub fn get_price_feed_url() -> String {
    env::var("PRICE_FEED_URL").unwrap_or_else(|_| {
        "https://backend.mytradegenius.com/price/four-hour-prediction".to_string()
    })
}

/// Trading pairs to sweep, from `SYMBOLS` as a comma-separated list of
/// BASE/QUOTE pairs (e.g. `BTC/USDT,ETH/USDT`).
pub fn get_symbols() -> Result<Vec<Symbol>, ConfigError> {
    let raw = env::var("SYMBOLS").map_err(|_| ConfigError::MissingVar("SYMBOLS"))?;
    let symbols = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(Symbol::parse)
        .collect::<Result<Vec<_>, _>>()?;

    if symbols.is_empty() {
        return Err(ConfigError::MissingVar("SYMBOLS"));
    }
    Ok(symbols)
}

/// Indicator provider API keys, from `TAAPI_API_KEYS` as a comma-separated list.
pub fn get_api_keys() -> Result<Vec<String>, ConfigError> {
    let raw = env::var("TAAPI_API_KEYS").map_err(|_| ConfigError::MissingVar("TAAPI_API_KEYS"))?;
    let keys: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect();

    if keys.is_empty() {
        return Err(ConfigError::MissingVar("TAAPI_API_KEYS"));
    }
    Ok(keys)
}

/// Bounded exponential retry policy shared by provider and database calls.
#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    /// Total attempts, including the first one.
    pub max_attempts: usize,
    pub min_delay: Duration,
    pub factor: f32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            min_delay: Duration::from_secs(2),
            factor: 2.0,
        }
    }
}

impl RetryConfig {
    pub fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(self.min_delay)
            .with_factor(self.factor)
            .with_max_times(self.max_attempts.saturating_sub(1))
    }
}
