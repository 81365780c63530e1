//! Single and two-candle patterns, encoded as +1 (bullish), -1 (bearish)
//! or 0 (no pattern).

use crate::domain::candle::Candle;
use crate::domain::indicator::{Series, available};

/// Minimum body share of the high-low range for a marubozu.
pub const MARUBOZU_BODY_RATIO: f64 = 0.9;

/// Engulfing: the body of the current candle covers the opposite-coloured
/// body of the previous one.
pub fn engulfing(candles: &[Candle]) -> Option<Series> {
    let mut out = vec![f64::NAN; candles.len()];
    for i in 1..candles.len() {
        let (prev, curr) = (&candles[i - 1], &candles[i]);
        let bullish = prev.is_bearish()
            && curr.is_bullish()
            && curr.open <= prev.close
            && curr.close >= prev.open
            && (curr.open < prev.close || curr.close > prev.open);
        let bearish = prev.is_bullish()
            && curr.is_bearish()
            && curr.open >= prev.close
            && curr.close <= prev.open
            && (curr.open > prev.close || curr.close < prev.open);
        out[i] = signed(bullish, bearish);
    }
    available(out)
}

/// Marubozu: a candle whose body fills at least `body_ratio` of its range.
pub fn marubozu(candles: &[Candle], body_ratio: f64) -> Option<Series> {
    let out = candles
        .iter()
        .map(|c| {
            let range = c.high - c.low;
            let full_body = range > 0.0 && (c.close - c.open).abs() >= body_ratio * range;
            signed(full_body && c.is_bullish(), full_body && c.is_bearish())
        })
        .collect();
    available(out)
}

fn signed(bullish: bool, bearish: bool) -> f64 {
    match (bullish, bearish) {
        (true, _) => 1.0,
        (_, true) => -1.0,
        _ => 0.0,
    }
}
