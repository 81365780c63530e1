//! RSI (Relative Strength Index) indicator implementation.
//!
//! Uses Wilder's smoothing for average gain/loss calculation:
//! - First average: simple mean of gains/losses over first n changes
//! - Subsequent: avg = (prev_avg * (n-1) + current) / n
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0: RSI = 100
//!
//! Warmup: first n values are undefined (need n price changes).

use crate::domain::indicator::{Series, available};

pub const DEFAULT_PERIOD: usize = 20;

pub fn calculate_rsi(closes: &[f64], period: usize) -> Option<Series> {
    let mut values = vec![f64::NAN; closes.len()];
    if period == 0 || closes.len() <= period {
        return None;
    }

    let mut gains: Vec<f64> = Vec::with_capacity(closes.len() - 1);
    let mut losses: Vec<f64> = Vec::with_capacity(closes.len() - 1);
    for i in 1..closes.len() {
        let change = closes[i] - closes[i - 1];
        gains.push(if change > 0.0 { change } else { 0.0 });
        losses.push(if change < 0.0 { -change } else { 0.0 });
    }

    let mut avg_gain = gains[..period].iter().sum::<f64>() / period as f64;
    let mut avg_loss = losses[..period].iter().sum::<f64>() / period as f64;
    values[period] = rsi_from(avg_gain, avg_loss);

    for i in (period + 1)..closes.len() {
        let gain_idx = i - 1;
        avg_gain = (avg_gain * (period - 1) as f64 + gains[gain_idx]) / period as f64;
        avg_loss = (avg_loss * (period - 1) as f64 + losses[gain_idx]) / period as f64;
        values[i] = rsi_from(avg_gain, avg_loss);
    }

    available(values)
}

fn rsi_from(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
    }
}
