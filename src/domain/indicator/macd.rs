//! MACD (Moving Average Convergence Divergence) indicator.
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of MACD Line
//! Histogram = MACD Line - Signal Line
//!
//! Parameters used by the condition library: fast=18, slow=52, signal=14
//! Warmup: slow - 1 + signal - 1 values.

use crate::domain::indicator::{Series, ema, has_valid, subtract};

pub const DEFAULT_FAST: usize = 18;
pub const DEFAULT_SLOW: usize = 52;
pub const DEFAULT_SIGNAL: usize = 14;

#[derive(Debug, Clone)]
pub struct Macd {
    pub line: Series,
    pub signal: Series,
    pub histogram: Series,
}

pub fn calculate_macd(
    closes: &[f64],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> Option<Macd> {
    if closes.is_empty() || fast == 0 || slow == 0 || signal_period == 0 {
        return None;
    }

    let ema_fast = ema(closes, fast);
    let ema_slow = ema(closes, slow);
    let line = subtract(&ema_fast, &ema_slow);
    let signal = ema(&line, signal_period);
    if !has_valid(&signal) {
        return None;
    }
    let histogram = subtract(&line, &signal);

    Some(Macd {
        line,
        signal,
        histogram,
    })
}

pub fn calculate_macd_default(closes: &[f64]) -> Option<Macd> {
    calculate_macd(closes, DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL)
}
