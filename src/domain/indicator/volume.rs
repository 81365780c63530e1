//! Volume-weighted indicators: Price Volume Trend, Chaikin Money Flow and the
//! Accumulation/Distribution oscillator.

use crate::domain::candle::Candle;
use crate::domain::indicator::{Series, available, ema, rising, rolling_sum, sma, subtract};

pub const PVT_SIGNAL_PERIOD: usize = 9;
pub const CMF_PERIOD: usize = 20;
pub const ADOSC_FAST: usize = 30;
pub const ADOSC_SLOW: usize = 40;

#[derive(Debug, Clone)]
pub struct Pvt {
    pub pvt: Series,
    /// SMA of the PVT line.
    pub signal: Series,
}

/// Cumulative sum of `percent change · volume`.
pub fn calculate_pvt(candles: &[Candle], signal_period: usize) -> Option<Pvt> {
    let mut pvt = vec![f64::NAN; candles.len()];
    let mut total = 0.0;
    for i in 1..candles.len() {
        let prev_close = candles[i - 1].close;
        if prev_close != 0.0 {
            let change = 100.0 * (candles[i].close - prev_close) / prev_close;
            total += change * candles[i].volume as f64;
        }
        pvt[i] = total;
    }
    let signal = sma(&pvt, signal_period);
    let signal = available(signal)?;
    Some(Pvt { pvt, signal })
}

/// Money flow volume of one candle: close location in its range times
/// volume. A zero range contributes nothing.
fn money_flow_volume(candle: &Candle) -> f64 {
    let range = candle.high - candle.low;
    if range == 0.0 {
        return 0.0;
    }
    let location = (2.0 * candle.close - candle.high - candle.low) / range;
    location * candle.volume as f64
}

pub fn calculate_cmf(candles: &[Candle], period: usize) -> Option<Series> {
    let flow: Vec<f64> = candles.iter().map(money_flow_volume).collect();
    let volumes: Vec<f64> = candles.iter().map(|c| c.volume as f64).collect();
    let flow_sum = rolling_sum(&flow, period);
    let volume_sum = rolling_sum(&volumes, period);

    let cmf = flow_sum
        .iter()
        .zip(&volume_sum)
        .map(|(f, v)| if *v == 0.0 { f64::NAN } else { f / v })
        .collect();
    available(cmf)
}

/// Accumulation/Distribution line.
pub fn accumulation_distribution(candles: &[Candle]) -> Series {
    candles
        .iter()
        .scan(0.0, |total, candle| {
            *total += money_flow_volume(candle);
            Some(*total)
        })
        .collect()
}

/// 1.0 where EMA(AD, fast) − EMA(AD, slow) rose against the previous
/// candle, 0.0 otherwise.
pub fn adosc_direction(candles: &[Candle], fast: usize, slow: usize) -> Option<Series> {
    let ad = accumulation_distribution(candles);
    let oscillator = subtract(&ema(&ad, fast), &ema(&ad, slow));
    available(rising(&oscillator))
}
