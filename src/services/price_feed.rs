//! Client for the whole-market price feed.

use crate::models::Symbol;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// Timeout for the market-wide price request. The payload covers every
/// listed asset, so this is generous compared to the indicator calls.
pub const PRICE_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct MarketEntry {
    #[serde(default)]
    symbol: String,
    #[serde(default)]
    current_price: Option<f64>,
}

/// Fetches the market-wide price list and filters it client-side; the
/// feed has no per-symbol endpoint.
pub struct PriceFeedClient {
    http: Client,
    url: String,
    timeout: Duration,
}

impl PriceFeedClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(url, Client::new())
    }

    pub fn with_client(url: impl Into<String>, http: Client) -> Self {
        Self {
            http,
            url: url.into(),
            timeout: PRICE_REQUEST_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Current price for `symbol`, or `None` when the feed does not list
    /// its base asset or lists it without a price. Matching is
    /// case-insensitive on the base leg.
    pub async fn current_price(&self, symbol: &Symbol) -> Result<Option<f64>, reqwest::Error> {
        let entries: Vec<MarketEntry> = self
            .http
            .get(&self.url)
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(entries
            .into_iter()
            .find(|entry| entry.symbol.eq_ignore_ascii_case(symbol.base()))
            .and_then(|entry| entry.current_price))
    }
}
