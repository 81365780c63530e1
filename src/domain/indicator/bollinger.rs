//! Bollinger Bands indicator.
//!
//! Bollinger Bands consist of:
//! - Middle: Simple Moving Average (SMA) over n periods
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//!
//! Where StdDev is population standard deviation (divides by N, not N-1).
//!
//! Default parameters: period=20, multiplier=2.0
//! Warmup: first (period-1) values are undefined.

use crate::domain::indicator::{Series, has_valid, rolling_stddev, sma};

pub const DEFAULT_PERIOD: usize = 20;
pub const DEFAULT_MULTIPLIER: f64 = 2.0;

#[derive(Debug, Clone)]
pub struct BollingerBands {
    pub upper: Series,
    pub middle: Series,
    pub lower: Series,
}

pub fn calculate_bollinger(closes: &[f64], period: usize, multiplier: f64) -> Option<BollingerBands> {
    let middle = sma(closes, period);
    if !has_valid(&middle) {
        return None;
    }
    let stddev = rolling_stddev(closes, period);

    let upper = middle
        .iter()
        .zip(&stddev)
        .map(|(m, s)| m + multiplier * s)
        .collect();
    let lower = middle
        .iter()
        .zip(&stddev)
        .map(|(m, s)| m - multiplier * s)
        .collect();

    Some(BollingerBands {
        upper,
        middle,
        lower,
    })
}
