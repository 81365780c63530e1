//! Cycle and regression indicators: Ehlers' Even Better Sinewave and the
//! rolling linear-regression correlation.

use crate::domain::indicator::{Series, available, rising, rolling};
use std::f64::consts::{PI, SQRT_2};

pub const EBSW_PERIOD: usize = 40;
pub const EBSW_BARS: usize = 10;
pub const LINREG_PERIOD: usize = 24;

/// Even Better Sinewave, normalized to -1..1.
///
/// A high-pass filter removes cycles longer than `period`, a super smoother
/// over `bars` cleans the rest, and the 3-bar wave is divided by the root of
/// its 3-bar power. The first value sits at `period - 1` (0.0).
pub fn calculate_ebsw(closes: &[f64], period: usize, bars: usize) -> Option<Series> {
    if period == 0 || bars == 0 || closes.len() < period {
        return None;
    }
    let mut out = vec![f64::NAN; closes.len()];
    out[period - 1] = 0.0;

    let angle = (360.0 / period as f64).to_radians();
    let alpha = (1.0 - angle.sin()) / angle.cos();
    let a1 = (-SQRT_2 * PI / bars as f64).exp();
    let c2 = 2.0 * a1 * (SQRT_2 * 180.0 / bars as f64).to_radians().cos();
    let c3 = -a1 * a1;
    let c1 = 1.0 - c2 - c3;

    let mut last_close = closes[period - 1];
    let mut last_hp = 0.0;
    let mut history = [0.0, 0.0];
    for i in period..closes.len() {
        let hp = 0.5 * (1.0 + alpha) * (closes[i] - last_close) + alpha * last_hp;
        let filt = c1 * (hp + last_hp) / 2.0 + c2 * history[1] + c3 * history[0];

        let wave = (filt + history[1] + history[0]) / 3.0;
        let power = (filt * filt + history[1] * history[1] + history[0] * history[0]) / 3.0;
        out[i] = if power > 0.0 { wave / power.sqrt() } else { f64::NAN };

        history = [history[1], filt];
        last_hp = hp;
        last_close = closes[i];
    }

    Some(out)
}

/// Pearson correlation between each `period` window and the sequence
/// 1..=period. `NaN` on a flat window.
pub fn linreg_r(closes: &[f64], period: usize) -> Series {
    let n = period as f64;
    let x_sum = 0.5 * n * (n + 1.0);
    let x2_sum = x_sum * (2.0 * n + 1.0) / 3.0;
    let divisor = n * x2_sum - x_sum * x_sum;

    rolling(closes, period, |window| {
        let y_sum: f64 = window.iter().sum();
        let y2_sum: f64 = window.iter().map(|y| y * y).sum();
        let xy_sum: f64 = window
            .iter()
            .enumerate()
            .map(|(j, y)| (j + 1) as f64 * y)
            .sum();
        let numerator = n * xy_sum - x_sum * y_sum;
        let denominator = (divisor * (n * y2_sum - y_sum * y_sum)).sqrt();
        if denominator > 0.0 {
            numerator / denominator
        } else {
            f64::NAN
        }
    })
}

/// 1.0 where the regression correlation rose against the previous candle.
pub fn linreg_direction(closes: &[f64], period: usize) -> Option<Series> {
    available(rising(&linreg_r(closes, period)))
}
