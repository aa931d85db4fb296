//! Persisted trading signal rows.

use crate::models::snapshot::IndicatorSnapshot;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Signal classification written to the store and served over the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalKind {
    #[serde(rename = "Strong Buy")]
    StrongBuy,
    Buy,
    Sell,
    #[serde(rename = "Strong Sell")]
    StrongSell,
    Hold,
    Exit,
}

impl SignalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalKind::StrongBuy => "Strong Buy",
            SignalKind::Buy => "Buy",
            SignalKind::Sell => "Sell",
            SignalKind::StrongSell => "Strong Sell",
            SignalKind::Hold => "Hold",
            SignalKind::Exit => "Exit",
        }
    }

    /// Parse the stored label. Unknown labels fall back to `Hold`.
    pub fn from_label(label: &str) -> Self {
        match label {
            "Strong Buy" => SignalKind::StrongBuy,
            "Buy" => SignalKind::Buy,
            "Sell" => SignalKind::Sell,
            "Strong Sell" => SignalKind::StrongSell,
            "Exit" => SignalKind::Exit,
            _ => SignalKind::Hold,
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of evaluating one snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Verdict {
    pub kind: SignalKind,
    pub strength: f64,
}

/// One live row per symbol in the `trading_signals` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRecord {
    pub symbol: String,
    #[serde(rename = "signal_type")]
    pub kind: SignalKind,
    pub strength: f64,
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
    pub stochrsi_k: f64,
    pub stochrsi_d: f64,
    pub bb_upper: f64,
    pub bb_middle: f64,
    pub bb_lower: f64,
    pub volume: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SignalRecord {
    /// Flatten a snapshot and its verdict into a storable row. Timestamps
    /// carry the snapshot's fetch instant, so a row dates its market data
    /// rather than the write that stored it.
    pub fn from_evaluation(snapshot: &IndicatorSnapshot, verdict: Verdict) -> Self {
        let values = snapshot.resolve();
        Self {
            symbol: snapshot.symbol.clone(),
            kind: verdict.kind,
            strength: verdict.strength,
            price: values.price,
            rsi: values.rsi,
            macd_value: values.macd_value,
            macd_signal: values.macd_signal,
            macd_hist: values.macd_hist,
            ema9: values.ema9,
            ema21: values.ema21,
            adx: values.adx,
            plus_di: values.plus_di,
            minus_di: values.minus_di,
            stochrsi_k: values.stoch_k,
            stochrsi_d: values.stoch_d,
            bb_upper: values.bb_upper,
            bb_middle: values.bb_middle,
            bb_lower: values.bb_lower,
            volume: values.volume,
            created_at: snapshot.fetched_at,
            updated_at: snapshot.fetched_at,
        }
    }
}
