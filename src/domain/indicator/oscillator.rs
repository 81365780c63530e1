//! Bounded momentum oscillators: Schaff Trend Cycle, Ultimate Oscillator,
//! Relative Vigor Index and Balance of Power.

use crate::domain::candle::Candle;
use crate::domain::indicator::moving_average::swma4;
use crate::domain::indicator::{
    Series, available, ema, rolling_max, rolling_min, rolling_sum, subtract,
};

#[derive(Debug, Clone, Copy)]
pub struct StcParams {
    pub cycle: usize,
    pub fast: usize,
    pub slow: usize,
    pub factor: f64,
}

impl Default for StcParams {
    fn default() -> Self {
        Self {
            cycle: 12,
            fast: 14,
            slow: 28,
            factor: 0.6,
        }
    }
}

/// Schaff Trend Cycle: a doubly smoothed stochastic of the EMA spread,
/// bounded to 0..100.
pub fn calculate_stc(closes: &[f64], params: StcParams) -> Option<Series> {
    let spread = subtract(&ema(closes, params.fast), &ema(closes, params.slow));
    let first = smoothed_stochastic(&spread, params.cycle, params.factor);
    let second = smoothed_stochastic(&first, params.cycle, params.factor);
    available(second)
}

/// Stochastic of `values` over `cycle`, then exponentially smoothed with
/// `factor`. A flat window keeps the previous stochastic value.
fn smoothed_stochastic(values: &[f64], cycle: usize, factor: f64) -> Series {
    let low = rolling_min(values, cycle);
    let high = rolling_max(values, cycle);

    let mut out = vec![f64::NAN; values.len()];
    let mut stoch = 0.0;
    let mut smoothed = 0.0;
    for i in 0..values.len() {
        if low[i].is_nan() || high[i].is_nan() {
            continue;
        }
        let range = high[i] - low[i];
        if range > 0.0 {
            stoch = 100.0 * (values[i] - low[i]) / range;
        }
        smoothed += factor * (stoch - smoothed);
        out[i] = smoothed;
    }
    out
}

/// Ultimate Oscillator over three buying-pressure windows, weighted 4:2:1.
pub fn calculate_uo(candles: &[Candle], fast: usize, medium: usize, slow: usize) -> Option<Series> {
    let mut pressure = Vec::with_capacity(candles.len());
    let mut ranges = Vec::with_capacity(candles.len());
    for (i, candle) in candles.iter().enumerate() {
        let (floor, ceiling) = match i.checked_sub(1).map(|p| candles[p].close) {
            Some(prev_close) => (candle.low.min(prev_close), candle.high.max(prev_close)),
            None => (candle.low, candle.high),
        };
        pressure.push(candle.close - floor);
        ranges.push(ceiling - floor);
    }

    let average = |period: usize| -> Series {
        rolling_sum(&pressure, period)
            .iter()
            .zip(rolling_sum(&ranges, period))
            .map(|(bp, tr)| if tr == 0.0 { f64::NAN } else { bp / tr })
            .collect()
    };
    let (fast_avg, medium_avg, slow_avg) = (average(fast), average(medium), average(slow));

    let uo = (0..candles.len())
        .map(|i| 100.0 * (4.0 * fast_avg[i] + 2.0 * medium_avg[i] + slow_avg[i]) / 7.0)
        .collect();
    available(uo)
}

#[derive(Debug, Clone)]
pub struct Rvgi {
    pub rvgi: Series,
    pub signal: Series,
}

/// Relative Vigor Index: smoothed close-open body over smoothed range,
/// summed over `period`. The signal line is a 4-candle symmetric WMA of it.
pub fn calculate_rvgi(candles: &[Candle], period: usize) -> Option<Rvgi> {
    let bodies: Vec<f64> = candles.iter().map(|c| c.close - c.open).collect();
    let ranges: Vec<f64> = candles.iter().map(|c| c.high - c.low).collect();
    let numerator = rolling_sum(&swma4(&bodies), period);
    let denominator = rolling_sum(&swma4(&ranges), period);

    let rvgi: Series = numerator
        .iter()
        .zip(&denominator)
        .map(|(n, d)| if *d == 0.0 { f64::NAN } else { n / d })
        .collect();
    let signal = available(swma4(&rvgi))?;
    Some(Rvgi { rvgi, signal })
}

/// Balance of Power: (close − open) / (high − low).
pub fn calculate_bop(candles: &[Candle]) -> Option<Series> {
    let bop = candles
        .iter()
        .map(|c| {
            let range = c.high - c.low;
            if range == 0.0 {
                f64::NAN
            } else {
                (c.close - c.open) / range
            }
        })
        .collect();
    available(bop)
}
