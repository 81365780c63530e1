//! Volatility indicators: Mass Index, Holt-Winters channel mid line and the
//! Relative Volatility Index.

use crate::domain::candle::Candle;
use crate::domain::indicator::{Series, available, ema, rolling_stddev, rolling_sum};

pub const MASSI_FAST: usize = 9;
pub const MASSI_SLOW: usize = 25;
pub const RVI_PERIOD: usize = 30;

/// Sum over `slow` candles of EMA(range) / EMA(EMA(range)).
pub fn calculate_massi(candles: &[Candle], fast: usize, slow: usize) -> Option<Series> {
    let ranges: Vec<f64> = candles.iter().map(|c| c.high - c.low).collect();
    let single = ema(&ranges, fast);
    let double = ema(&single, fast);
    let ratio: Vec<f64> = single
        .iter()
        .zip(&double)
        .map(|(s, d)| if *d == 0.0 { f64::NAN } else { s / d })
        .collect();
    available(rolling_sum(&ratio, slow))
}

/// Smoothing factors of the triple exponential (Holt-Winters) channel.
#[derive(Debug, Clone, Copy)]
pub struct HoltWinters {
    pub level: f64,
    pub velocity: f64,
    pub acceleration: f64,
}

impl Default for HoltWinters {
    fn default() -> Self {
        Self {
            level: 0.2,
            velocity: 0.1,
            acceleration: 0.1,
        }
    }
}

/// Holt-Winters channel mid line. Defined from the first candle on.
pub fn calculate_hwc_mid(closes: &[f64], factors: HoltWinters) -> Option<Series> {
    let first = *closes.first()?;
    let HoltWinters {
        level: na,
        velocity: nb,
        acceleration: nc,
    } = factors;

    let mut last_f = first;
    let mut last_v = 0.0;
    let mut last_a = 0.0;
    let mut mid = Vec::with_capacity(closes.len());
    for &close in closes {
        let f = (1.0 - na) * (last_f + last_v + 0.5 * last_a) + na * close;
        let v = (1.0 - nb) * (last_v + last_a) + nb * (f - last_f);
        let a = (1.0 - nc) * last_a + nc * (v - last_v);
        mid.push(f + v + 0.5 * a);
        last_f = f;
        last_v = v;
        last_a = a;
    }
    available(mid)
}

/// Relative Volatility Index: share of rolling standard deviation that
/// accrued on up-closes, scaled to 0..100.
pub fn calculate_rvi(closes: &[f64], period: usize) -> Option<Series> {
    let stddev = rolling_stddev(closes, period);
    let mut up = vec![f64::NAN; closes.len()];
    let mut down = vec![f64::NAN; closes.len()];
    for i in 0..closes.len() {
        if stddev[i].is_nan() {
            continue;
        }
        let change = if i == 0 { 0.0 } else { closes[i] - closes[i - 1] };
        up[i] = if change > 0.0 { stddev[i] } else { 0.0 };
        down[i] = if change < 0.0 { stddev[i] } else { 0.0 };
    }

    let up_avg = ema(&up, period);
    let down_avg = ema(&down, period);
    let rvi = up_avg
        .iter()
        .zip(&down_avg)
        .map(|(u, d)| {
            let total = u + d;
            if total == 0.0 { f64::NAN } else { 100.0 * u / total }
        })
        .collect();
    available(rvi)
}
