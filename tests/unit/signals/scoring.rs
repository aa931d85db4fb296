//! Unit tests for the buy/sell voting conditions

use indicatrix::models::ResolvedIndicators;
use indicatrix::signals::{
    above_upper_band, adx_bearish, adx_bullish, below_lower_band, count_buy_votes,
    count_sell_votes, ema_bearish, ema_bullish, macd_bearish_cross, macd_bullish_cross,
    rsi_overbought, rsi_oversold, stoch_bearish_turn, stoch_bullish_turn,
};

fn neutral() -> ResolvedIndicators {
    ResolvedIndicators {
        price: 100.0,
        rsi: 50.0,
        macd_value: 0.0,
        macd_signal: 0.0,
        macd_hist: 0.0,
        ema9: 0.0,
        ema21: 0.0,
        adx: 0.0,
        plus_di: 0.0,
        minus_di: 0.0,
        stoch_k: 50.0,
        stoch_d: 50.0,
        bb_upper: 0.0,
        bb_middle: 0.0,
        bb_lower: 0.0,
        volume: 0.0,
    }
}

fn all_buy_conditions() -> ResolvedIndicators {
    ResolvedIndicators {
        price: 95.0,
        rsi: 30.0,
        macd_value: -0.5,
        macd_signal: -1.0,
        macd_hist: 0.5,
        ema9: 105.0,
        ema21: 100.0,
        adx: 30.0,
        plus_di: 25.0,
        minus_di: 15.0,
        stoch_k: 15.0,
        stoch_d: 10.0,
        bb_upper: 110.0,
        bb_middle: 103.0,
        bb_lower: 96.0,
        volume: 1000.0,
    }
}

fn all_sell_conditions() -> ResolvedIndicators {
    ResolvedIndicators {
        price: 111.0,
        rsi: 70.0,
        macd_value: 1.0,
        macd_signal: 1.5,
        macd_hist: -0.5,
        ema9: 95.0,
        ema21: 100.0,
        adx: 30.0,
        plus_di: 10.0,
        minus_di: 25.0,
        stoch_k: 85.0,
        stoch_d: 90.0,
        bb_upper: 110.0,
        bb_middle: 103.0,
        bb_lower: 96.0,
        volume: 1000.0,
    }
}

#[test]
fn test_neutral_values_cast_no_votes() {
    let v = neutral();

    assert_eq!(count_buy_votes(&v), 0);
    assert_eq!(count_sell_votes(&v), 0);
}

#[test]
fn test_buy_setup_casts_all_six_votes() {
    let v = all_buy_conditions();

    assert!(rsi_oversold(&v));
    assert!(macd_bullish_cross(&v));
    assert!(ema_bullish(&v));
    assert!(adx_bullish(&v));
    assert!(stoch_bullish_turn(&v));
    assert!(below_lower_band(&v));

    assert_eq!(count_buy_votes(&v), 6);
    assert_eq!(count_sell_votes(&v), 0);
}

#[test]
fn test_sell_setup_casts_all_six_votes() {
    let v = all_sell_conditions();

    assert!(rsi_overbought(&v));
    assert!(macd_bearish_cross(&v));
    assert!(ema_bearish(&v));
    assert!(adx_bearish(&v));
    assert!(stoch_bearish_turn(&v));
    assert!(above_upper_band(&v));

    assert_eq!(count_sell_votes(&v), 6);
    assert_eq!(count_buy_votes(&v), 0);
}

#[test]
fn test_rsi_thresholds_are_strict() {
    let mut v = neutral();

    v.rsi = 35.0;
    assert!(!rsi_oversold(&v));
    v.rsi = 34.9;
    assert!(rsi_oversold(&v));

    v.rsi = 65.0;
    assert!(!rsi_overbought(&v));
    v.rsi = 65.1;
    assert!(rsi_overbought(&v));
}

#[test]
fn test_macd_crosses_require_matching_sign() {
    let mut v = neutral();

    // Above the signal line but already positive: not a fresh bullish cross.
    v.macd_value = 0.5;
    v.macd_signal = 0.2;
    assert!(!macd_bullish_cross(&v));
    assert!(!macd_bearish_cross(&v));

    // Below the signal line but already negative: not a fresh bearish cross.
    v.macd_value = -0.5;
    v.macd_signal = -0.2;
    assert!(!macd_bearish_cross(&v));
    assert!(!macd_bullish_cross(&v));
}

#[test]
fn test_adx_ignores_weak_trends() {
    let mut v = neutral();
    v.adx = 25.0;
    v.plus_di = 30.0;
    v.minus_di = 10.0;

    assert!(!adx_bullish(&v));

    v.adx = 25.1;
    assert!(adx_bullish(&v));
    assert!(!adx_bearish(&v));
}

#[test]
fn test_stoch_turns_stay_inside_extremes() {
    let mut v = neutral();

    v.stoch_k = 20.0;
    v.stoch_d = 10.0;
    assert!(!stoch_bullish_turn(&v));
    v.stoch_k = 19.9;
    assert!(stoch_bullish_turn(&v));

    v.stoch_k = 80.0;
    v.stoch_d = 90.0;
    assert!(!stoch_bearish_turn(&v));
    v.stoch_k = 80.1;
    assert!(stoch_bearish_turn(&v));
}

#[test]
fn test_band_breaks_need_volume() {
    let mut v = neutral();
    v.price = 95.0;
    v.bb_lower = 96.0;
    v.bb_upper = 110.0;
    v.volume = 0.0;

    assert!(!below_lower_band(&v));

    v.volume = 1.0;
    assert!(below_lower_band(&v));

    v.price = 111.0;
    v.volume = 0.0;
    assert!(!above_upper_band(&v));
    v.volume = 1.0;
    assert!(above_upper_band(&v));
}
