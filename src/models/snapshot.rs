//! Indicator snapshot collected for one symbol during a sweep.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of indicator groups fetched per symbol.
pub const INDICATOR_GROUPS: usize = 8;

/// Neutral fallbacks substituted for readings that could not be fetched.
/// Oscillators default to their midpoint; everything else defaults to zero.
pub const NEUTRAL_RSI: f64 = 50.0;
pub const NEUTRAL_STOCH: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdValues {
    pub value: f64,
    pub signal: f64,
    pub histogram: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdxValues {
    pub adx: f64,
    pub plus_di: f64,
    pub minus_di: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StochRsiValues {
    pub k: f64,
    pub d: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerBands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

/// One sweep's worth of indicator readings for a symbol.
///
/// Each group is `None` when its request exhausted its retries. Evaluation
/// never sees the `None`s directly; it works on the flattened view from
/// [`resolve`](Self::resolve).
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSnapshot {
    pub symbol: String,
    pub price: f64,
    pub rsi: Option<f64>,
    pub macd: Option<MacdValues>,
    pub ema9: Option<f64>,
    pub ema21: Option<f64>,
    pub adx: Option<AdxValues>,
    pub stoch_rsi: Option<StochRsiValues>,
    pub bollinger: Option<BollingerBands>,
    pub volume: Option<f64>,
    pub fetched_at: DateTime<Utc>,
}

impl IndicatorSnapshot {
    pub fn new(symbol: impl Into<String>, price: f64) -> Self {
        Self {
            symbol: symbol.into(),
            price,
            rsi: None,
            macd: None,
            ema9: None,
            ema21: None,
            adx: None,
            stoch_rsi: None,
            bollinger: None,
            volume: None,
            fetched_at: Utc::now(),
        }
    }

    /// Number of indicator groups actually retrieved.
    pub fn retrieved_count(&self) -> usize {
        self.rsi.is_some() as usize
            + self.macd.is_some() as usize
            + self.ema9.is_some() as usize
            + self.ema21.is_some() as usize
            + self.adx.is_some() as usize
            + self.stoch_rsi.is_some() as usize
            + self.bollinger.is_some() as usize
            + self.volume.is_some() as usize
    }

    pub fn is_partial(&self) -> bool {
        let retrieved = self.retrieved_count();
        retrieved > 0 && retrieved < INDICATOR_GROUPS
    }

    /// Names of the groups that are missing, for logging.
    pub fn missing(&self) -> Vec<&'static str> {
        let mut gone = Vec::new();
        if self.rsi.is_none() {
            gone.push("rsi");
        }
        if self.macd.is_none() {
            gone.push("macd");
        }
        if self.ema9.is_none() {
            gone.push("ema9");
        }
        if self.ema21.is_none() {
            gone.push("ema21");
        }
        if self.adx.is_none() {
            gone.push("adx");
        }
        if self.stoch_rsi.is_none() {
            gone.push("stochrsi");
        }
        if self.bollinger.is_none() {
            gone.push("bbands");
        }
        if self.volume.is_none() {
            gone.push("vwma");
        }
        gone
    }

    /// Flattened view with neutral defaults in place of missing readings.
    pub fn resolve(&self) -> ResolvedIndicators {
        ResolvedIndicators {
            price: self.price,
            rsi: self.rsi.unwrap_or(NEUTRAL_RSI),
            macd_value: self.macd.map_or(0.0, |m| m.value),
            macd_signal: self.macd.map_or(0.0, |m| m.signal),
            macd_hist: self.macd.map_or(0.0, |m| m.histogram),
            ema9: self.ema9.unwrap_or(0.0),
            ema21: self.ema21.unwrap_or(0.0),
            adx: self.adx.map_or(0.0, |a| a.adx),
            plus_di: self.adx.map_or(0.0, |a| a.plus_di),
            minus_di: self.adx.map_or(0.0, |a| a.minus_di),
            stoch_k: self.stoch_rsi.map_or(NEUTRAL_STOCH, |s| s.k),
            stoch_d: self.stoch_rsi.map_or(NEUTRAL_STOCH, |s| s.d),
            bb_upper: self.bollinger.map_or(0.0, |b| b.upper),
            bb_middle: self.bollinger.map_or(0.0, |b| b.middle),
            bb_lower: self.bollinger.map_or(0.0, |b| b.lower),
            volume: self.volume.unwrap_or(0.0),
        }
    }
}

/// Snapshot values after neutral-default substitution. Both evaluation
/// modes and the stored record see exactly these numbers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedIndicators {
    pub price: f64,
    pub rsi: f64,
    pub macd_value: f64,
    pub macd_signal: f64,
    pub macd_hist: f64,
    pub ema9: f64,
    pub ema21: f64,
    pub adx: f64,
    pub plus_di: f64,
    pub minus_di: f64,
    pub stoch_k: f64,
    pub stoch_d: f64,
    pub bb_upper: f64,
    pub bb_middle: f64,
    pub bb_lower: f64,
    pub volume: f64,
}
