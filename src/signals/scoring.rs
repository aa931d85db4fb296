//! Voting conditions for the buy/sell evaluation mode.
//!
//! Each condition inspects the resolved snapshot and contributes at most
//! one vote to its side. The vote counts feed the threshold ladder in the
//! evaluator.

use crate::models::ResolvedIndicators;

pub const RSI_BUY_THRESHOLD: f64 = 35.0;
pub const RSI_SELL_THRESHOLD: f64 = 65.0;
pub const ADX_TREND_THRESHOLD: f64 = 25.0;
pub const STOCH_OVERSOLD: f64 = 20.0;
pub const STOCH_OVERBOUGHT: f64 = 80.0;

/// Momentum washed out to the downside.
pub fn rsi_oversold(v: &ResolvedIndicators) -> bool {
    v.rsi < RSI_BUY_THRESHOLD
}

/// Momentum stretched to the upside.
pub fn rsi_overbought(v: &ResolvedIndicators) -> bool {
    v.rsi > RSI_SELL_THRESHOLD
}

/// MACD crossed above its signal line while still below zero.
pub fn macd_bullish_cross(v: &ResolvedIndicators) -> bool {
    v.macd_value > v.macd_signal && v.macd_value < 0.0
}

/// MACD crossed below its signal line while still above zero.
pub fn macd_bearish_cross(v: &ResolvedIndicators) -> bool {
    v.macd_value < v.macd_signal && v.macd_value > 0.0
}

/// Fast EMA riding above the slow one.
pub fn ema_bullish(v: &ResolvedIndicators) -> bool {
    v.ema9 > v.ema21
}

pub fn ema_bearish(v: &ResolvedIndicators) -> bool {
    v.ema9 < v.ema21
}

/// Established trend with positive directional movement dominating.
pub fn adx_bullish(v: &ResolvedIndicators) -> bool {
    v.adx > ADX_TREND_THRESHOLD && v.plus_di > v.minus_di
}

pub fn adx_bearish(v: &ResolvedIndicators) -> bool {
    v.adx > ADX_TREND_THRESHOLD && v.minus_di > v.plus_di
}

/// StochRSI %K turning up from oversold territory.
pub fn stoch_bullish_turn(v: &ResolvedIndicators) -> bool {
    v.stoch_k > v.stoch_d && v.stoch_k < STOCH_OVERSOLD
}

/// StochRSI %K turning down from overbought territory.
pub fn stoch_bearish_turn(v: &ResolvedIndicators) -> bool {
    v.stoch_k < v.stoch_d && v.stoch_k > STOCH_OVERBOUGHT
}

/// Price pushed below the lower band on real volume.
pub fn below_lower_band(v: &ResolvedIndicators) -> bool {
    v.price < v.bb_lower && v.volume > 0.0
}

/// Price pushed above the upper band on real volume.
pub fn above_upper_band(v: &ResolvedIndicators) -> bool {
    v.price > v.bb_upper && v.volume > 0.0
}

pub fn count_buy_votes(v: &ResolvedIndicators) -> u32 {
    rsi_oversold(v) as u32
        + macd_bullish_cross(v) as u32
        + ema_bullish(v) as u32
        + adx_bullish(v) as u32
        + stoch_bullish_turn(v) as u32
        + below_lower_band(v) as u32
}

pub fn count_sell_votes(v: &ResolvedIndicators) -> u32 {
    rsi_overbought(v) as u32
        + macd_bearish_cross(v) as u32
        + ema_bearish(v) as u32
        + adx_bearish(v) as u32
        + stoch_bearish_turn(v) as u32
        + above_upper_band(v) as u32
}
