//! Client for the TAAPI.io technical indicator API.

use crate::models::snapshot::{AdxValues, BollingerBands, MacdValues, StochRsiValues};
use crate::models::Symbol;
use crate::services::rate_limit::KeyRateLimiter;
use reqwest::Client;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Timeout applied to each individual indicator request.
pub const INDICATOR_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Exchange and candle interval every indicator query runs against.
pub const EXCHANGE: &str = "binance";
pub const INTERVAL: &str = "1m";

/// The eight indicator queries issued per symbol per sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorKind {
    Rsi,
    Macd,
    Ema9,
    Ema21,
    Adx,
    StochRsi,
    Bbands,
    Vwma,
}

impl IndicatorKind {
    /// Fetch order within a sweep. The two EMA spans hit the same endpoint
    /// with different periods.
    pub const ALL: [IndicatorKind; 8] = [
        IndicatorKind::Rsi,
        IndicatorKind::Macd,
        IndicatorKind::Ema9,
        IndicatorKind::Ema21,
        IndicatorKind::Adx,
        IndicatorKind::StochRsi,
        IndicatorKind::Bbands,
        IndicatorKind::Vwma,
    ];

    /// Endpoint path segment under the provider base URL.
    pub fn endpoint(&self) -> &'static str {
        match self {
            IndicatorKind::Rsi => "rsi",
            IndicatorKind::Macd => "macd",
            IndicatorKind::Ema9 | IndicatorKind::Ema21 => "ema",
            IndicatorKind::Adx => "adx",
            IndicatorKind::StochRsi => "stochrsi",
            IndicatorKind::Bbands => "bbands",
            IndicatorKind::Vwma => "vwma",
        }
    }

    /// Indicator-specific query parameters, in provider naming.
    pub fn params(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            IndicatorKind::Rsi => &[("optInTimePeriod", "14")],
            IndicatorKind::Macd => &[
                ("optInFastPeriod", "12"),
                ("optInSlowPeriod", "26"),
                ("optInSignalPeriod", "9"),
            ],
            IndicatorKind::Ema9 => &[("optInTimePeriod", "9")],
            IndicatorKind::Ema21 => &[("optInTimePeriod", "21")],
            IndicatorKind::Adx => &[("optInTimePeriod", "14")],
            IndicatorKind::StochRsi => &[("optInFastKPeriod", "14"), ("optInFastDPeriod", "3")],
            IndicatorKind::Bbands => &[
                ("optInTimePeriod", "20"),
                ("optInNbDevUp", "2"),
                ("optInNbDevDn", "2"),
            ],
            IndicatorKind::Vwma => &[("period", "20")],
        }
    }

    /// Short name used in logs and skip lists.
    pub fn name(&self) -> &'static str {
        match self {
            IndicatorKind::Rsi => "rsi",
            IndicatorKind::Macd => "macd",
            IndicatorKind::Ema9 => "ema9",
            IndicatorKind::Ema21 => "ema21",
            IndicatorKind::Adx => "adx",
            IndicatorKind::StochRsi => "stochrsi",
            IndicatorKind::Bbands => "bbands",
            IndicatorKind::Vwma => "vwma",
        }
    }
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A successfully parsed indicator response.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IndicatorReading {
    Rsi(f64),
    Macd(MacdValues),
    Ema9(f64),
    Ema21(f64),
    Adx(AdxValues),
    StochRsi(StochRsiValues),
    Bbands(BollingerBands),
    Volume(f64),
}

// Provider payloads. Missing fields decode to zero rather than failing
// the whole response.

#[derive(Debug, Deserialize)]
struct ValuePayload {
    #[serde(default)]
    value: f64,
}

#[derive(Debug, Deserialize)]
struct MacdPayload {
    #[serde(rename = "valueMACD", default)]
    value: f64,
    #[serde(rename = "valueMACDSignal", default)]
    signal: f64,
    #[serde(rename = "valueMACDHist", default)]
    histogram: f64,
}

#[derive(Debug, Deserialize)]
struct AdxPayload {
    #[serde(default)]
    value: f64,
    #[serde(rename = "plusDI", default)]
    plus_di: f64,
    #[serde(rename = "minusDI", default)]
    minus_di: f64,
}

#[derive(Debug, Deserialize)]
struct StochPayload {
    #[serde(rename = "valueFastK", default)]
    k: f64,
    #[serde(rename = "valueFastD", default)]
    d: f64,
}

#[derive(Debug, Deserialize)]
struct BbandsPayload {
    #[serde(rename = "valueUpperBand", default)]
    upper: f64,
    #[serde(rename = "valueMiddleBand", default)]
    middle: f64,
    #[serde(rename = "valueLowerBand", default)]
    lower: f64,
}

/// Thin HTTP client over the indicator provider.
///
/// Every request passes through the shared per-credential rate limiter
/// before it is sent.
pub struct TaapiClient {
    http: Client,
    base_url: String,
    limiter: Arc<KeyRateLimiter>,
    timeout: Duration,
}

impl TaapiClient {
    pub fn new(base_url: impl Into<String>, limiter: Arc<KeyRateLimiter>) -> Self {
        Self::with_client(base_url, limiter, Client::new())
    }

    /// Build with an existing `reqwest` client (shared connection pool).
    pub fn with_client(
        base_url: impl Into<String>,
        limiter: Arc<KeyRateLimiter>,
        http: Client,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            limiter,
            timeout: INDICATOR_REQUEST_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Fetch one indicator reading for a symbol.
    pub async fn indicator(
        &self,
        kind: IndicatorKind,
        symbol: &Symbol,
        credential: &str,
    ) -> Result<IndicatorReading, reqwest::Error> {
        self.limiter.acquire(credential).await;

        let url = format!("{}/{}", self.base_url, kind.endpoint());
        let pair = symbol.pair();
        let response = self
            .http
            .get(&url)
            .timeout(self.timeout)
            .query(&[
                ("secret", credential),
                ("exchange", EXCHANGE),
                ("symbol", pair.as_str()),
                ("interval", INTERVAL),
            ])
            .query(kind.params())
            .send()
            .await?
            .error_for_status()?;

        Ok(match kind {
            IndicatorKind::Rsi => {
                IndicatorReading::Rsi(response.json::<ValuePayload>().await?.value)
            }
            IndicatorKind::Macd => {
                let payload = response.json::<MacdPayload>().await?;
                IndicatorReading::Macd(MacdValues {
                    value: payload.value,
                    signal: payload.signal,
                    histogram: payload.histogram,
                })
            }
            IndicatorKind::Ema9 => {
                IndicatorReading::Ema9(response.json::<ValuePayload>().await?.value)
            }
            IndicatorKind::Ema21 => {
                IndicatorReading::Ema21(response.json::<ValuePayload>().await?.value)
            }
            IndicatorKind::Adx => {
                let payload = response.json::<AdxPayload>().await?;
                IndicatorReading::Adx(AdxValues {
                    adx: payload.value,
                    plus_di: payload.plus_di,
                    minus_di: payload.minus_di,
                })
            }
            IndicatorKind::StochRsi => {
                let payload = response.json::<StochPayload>().await?;
                IndicatorReading::StochRsi(StochRsiValues {
                    k: payload.k,
                    d: payload.d,
                })
            }
            IndicatorKind::Bbands => {
                let payload = response.json::<BbandsPayload>().await?;
                IndicatorReading::Bbands(BollingerBands {
                    upper: payload.upper,
                    middle: payload.middle,
                    lower: payload.lower,
                })
            }
            IndicatorKind::Vwma => {
                IndicatorReading::Volume(response.json::<ValuePayload>().await?.value)
            }
        })
    }
}
