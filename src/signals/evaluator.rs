//! Deterministic snapshot evaluation for both sweep modes.

use crate::models::{IndicatorSnapshot, ResolvedIndicators, SignalKind, Verdict};
use crate::signals::scoring::{count_buy_votes, count_sell_votes};
use std::fmt;

pub const HOLD_STRENGTH: f64 = 50.0;
pub const EXIT_STRENGTH: f64 = 40.0;

/// Vote count at which a directional signal upgrades to its strong variant.
pub const STRONG_VOTES: u32 = 4;

/// Per-vote strength weights. Strength is not capped, so a unanimous
/// strong signal can score above 100.
const STRONG_VOTE_WEIGHT: f64 = 25.0;
const VOTE_WEIGHT: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalMode {
    /// Entry hunting: directional votes resolved through a threshold ladder.
    BuySell,
    /// Position upkeep: the ranging-market check resolves to hold or exit.
    HoldExit,
}

impl fmt::Display for EvalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EvalMode::BuySell => "buy_sell",
            EvalMode::HoldExit => "hold_exit",
        })
    }
}

/// Evaluate one snapshot. Pure: the same snapshot and mode always
/// produce the same verdict.
pub fn evaluate(mode: EvalMode, snapshot: &IndicatorSnapshot) -> Verdict {
    let values = snapshot.resolve();
    match mode {
        EvalMode::BuySell => evaluate_buy_sell(&values),
        EvalMode::HoldExit => evaluate_hold_exit(&values),
    }
}

/// Strong variants need at least [`STRONG_VOTES`] and a majority over the
/// opposing side; plain variants need only the majority. A tie is a hold.
fn evaluate_buy_sell(v: &ResolvedIndicators) -> Verdict {
    let buy = count_buy_votes(v);
    let sell = count_sell_votes(v);

    if buy >= STRONG_VOTES && buy > sell {
        Verdict {
            kind: SignalKind::StrongBuy,
            strength: f64::from(buy) * STRONG_VOTE_WEIGHT,
        }
    } else if sell >= STRONG_VOTES && sell > buy {
        Verdict {
            kind: SignalKind::StrongSell,
            strength: f64::from(sell) * STRONG_VOTE_WEIGHT,
        }
    } else if buy > sell {
        Verdict {
            kind: SignalKind::Buy,
            strength: f64::from(buy) * VOTE_WEIGHT,
        }
    } else if sell > buy {
        Verdict {
            kind: SignalKind::Sell,
            strength: f64::from(sell) * VOTE_WEIGHT,
        }
    } else {
        Verdict {
            kind: SignalKind::Hold,
            strength: HOLD_STRENGTH,
        }
    }
}

/// Holding is only advised while the market ranges: neutral RSI, flat
/// MACD, converged EMAs, weak trend, price inside the bands, and some
/// volume behind it. Any condition failing means exit.
fn evaluate_hold_exit(v: &ResolvedIndicators) -> Verdict {
    let rsi_neutral = (40.0..=60.0).contains(&v.rsi);
    let macd_flat = (v.macd_value - v.macd_signal).abs() < 0.1;
    let emas_converged = v.ema21 != 0.0 && ((v.ema9 - v.ema21) / v.ema21).abs() < 0.01;
    let weak_trend = v.adx < 20.0;
    let inside_bands = v.bb_lower < v.price && v.price < v.bb_upper;
    let has_volume = v.volume > 0.0;

    if rsi_neutral && macd_flat && emas_converged && weak_trend && inside_bands && has_volume {
        Verdict {
            kind: SignalKind::Hold,
            strength: HOLD_STRENGTH,
        }
    } else {
        Verdict {
            kind: SignalKind::Exit,
            strength: EXIT_STRENGTH,
        }
    }
}
