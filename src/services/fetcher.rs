//! Per-symbol snapshot assembly: price gate, indicator loop, retries.

use crate::config::RetryConfig;
use crate::error::FetchAbandoned;
use crate::metrics::Metrics;
use crate::models::{IndicatorSnapshot, Symbol};
use crate::services::price_feed::PriceFeedClient;
use crate::services::taapi::{IndicatorKind, IndicatorReading, TaapiClient};
use async_trait::async_trait;
use backon::Retryable;
use std::sync::Arc;
use std::time::Duration;
use tokio::time;
use tracing::{debug, warn};

/// Pause between consecutive indicator requests for one symbol, smoothing
/// bursts on top of the hard per-credential limiter.
pub const INTER_REQUEST_PACING: Duration = Duration::from_millis(200);

/// Tunables for snapshot assembly.
#[derive(Debug, Clone, Copy)]
pub struct FetcherConfig {
    pub pacing: Duration,
    pub retry: RetryConfig,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            pacing: INTER_REQUEST_PACING,
            retry: RetryConfig::default(),
        }
    }
}

/// Source of evaluation-ready snapshots, one symbol at a time.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn fetch(
        &self,
        symbol: &Symbol,
        credential: &str,
    ) -> Result<IndicatorSnapshot, FetchAbandoned>;
}

/// Default [`SnapshotSource`] backed by the indicator provider and the
/// market price feed.
pub struct IndicatorFetcher {
    indicators: TaapiClient,
    prices: PriceFeedClient,
    config: FetcherConfig,
    metrics: Option<Arc<Metrics>>,
}

impl IndicatorFetcher {
    pub fn new(indicators: TaapiClient, prices: PriceFeedClient, config: FetcherConfig) -> Self {
        Self {
            indicators,
            prices,
            config,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    fn count_request(&self) {
        if let Some(ref metrics) = self.metrics {
            metrics.provider_requests_total.inc();
        }
    }

    fn count_failure(&self) {
        if let Some(ref metrics) = self.metrics {
            metrics.provider_request_failures_total.inc();
        }
    }

    /// Market price gate. A feed outage or an unlisted symbol abandons
    /// the whole fetch for this sweep.
    async fn fetch_price(&self, symbol: &Symbol) -> Result<f64, FetchAbandoned> {
        let price = (|| async {
            self.count_request();
            let result = self.prices.current_price(symbol).await;
            if result.is_err() {
                self.count_failure();
            }
            result
        })
        .retry(self.config.retry.backoff())
        .notify(|err: &reqwest::Error, delay: Duration| {
            warn!(
                error = %err,
                delay_ms = delay.as_millis() as u64,
                "IndicatorFetcher: price feed request failed, retrying"
            );
        })
        .await
        .map_err(FetchAbandoned::PriceUnavailable)?;

        price.ok_or(FetchAbandoned::SymbolNotFound)
    }

    /// One indicator with retries. Exhausting them leaves the reading
    /// missing rather than failing the snapshot.
    async fn fetch_indicator(
        &self,
        kind: IndicatorKind,
        symbol: &Symbol,
        credential: &str,
    ) -> Option<IndicatorReading> {
        let attempt = || async {
            self.count_request();
            let result = self.indicators.indicator(kind, symbol, credential).await;
            if result.is_err() {
                self.count_failure();
            }
            result
        };

        match attempt
            .retry(self.config.retry.backoff())
            .notify(|err: &reqwest::Error, delay: Duration| {
                warn!(
                    indicator = kind.name(),
                    symbol = %symbol,
                    error = %err,
                    delay_ms = delay.as_millis() as u64,
                    "IndicatorFetcher: indicator request failed, retrying"
                );
            })
            .await
        {
            Ok(reading) => Some(reading),
            Err(err) => {
                warn!(
                    indicator = kind.name(),
                    symbol = %symbol,
                    error = %err,
                    "IndicatorFetcher: indicator dropped after retries"
                );
                None
            }
        }
    }
}

fn record_reading(snapshot: &mut IndicatorSnapshot, reading: IndicatorReading) {
    match reading {
        IndicatorReading::Rsi(value) => snapshot.rsi = Some(value),
        IndicatorReading::Macd(values) => snapshot.macd = Some(values),
        IndicatorReading::Ema9(value) => snapshot.ema9 = Some(value),
        IndicatorReading::Ema21(value) => snapshot.ema21 = Some(value),
        IndicatorReading::Adx(values) => snapshot.adx = Some(values),
        IndicatorReading::StochRsi(values) => snapshot.stoch_rsi = Some(values),
        IndicatorReading::Bbands(bands) => snapshot.bollinger = Some(bands),
        IndicatorReading::Volume(value) => snapshot.volume = Some(value),
    }
}

#[async_trait]
impl SnapshotSource for IndicatorFetcher {
    async fn fetch(
        &self,
        symbol: &Symbol,
        credential: &str,
    ) -> Result<IndicatorSnapshot, FetchAbandoned> {
        let price = self.fetch_price(symbol).await?;
        debug!(symbol = %symbol, price, "IndicatorFetcher: market price resolved");

        let mut snapshot = IndicatorSnapshot::new(symbol.pair(), price);
        for kind in IndicatorKind::ALL {
            if let Some(reading) = self.fetch_indicator(kind, symbol, credential).await {
                record_reading(&mut snapshot, reading);
            }
            if !self.config.pacing.is_zero() {
                time::sleep(self.config.pacing).await;
            }
        }

        if snapshot.retrieved_count() == 0 {
            return Err(FetchAbandoned::EmptySnapshot);
        }
        if snapshot.is_partial() {
            warn!(
                symbol = %symbol,
                missing = ?snapshot.missing(),
                "IndicatorFetcher: partial snapshot, evaluation falls back to neutral defaults"
            );
        }
        Ok(snapshot)
    }
}
