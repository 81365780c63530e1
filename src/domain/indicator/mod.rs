//! Technical indicator implementations.
//!
//! Every indicator returns one value per input candle. Warm-up positions are
//! `NaN`. An indicator that cannot produce a single valid value for the given
//! series length returns `None`, which the condition library treats as
//! "indicator not available for this window".
//!
//! The shared rolling helpers below operate on plain `f64` slices so that
//! indicators can be chained (EMA of a MACD line, SMA of PVT, ...). A window
//! containing `NaN` yields `NaN`.

pub mod atr;
pub mod bollinger;
pub mod candle_pattern;
pub mod cycle;
pub mod macd;
pub mod moving_average;
pub mod oscillator;
pub mod rsi;
pub mod trend;
pub mod volatility;
pub mod volume;

/// One value per candle, `NaN` where undefined.
pub type Series = Vec<f64>;

/// Index of the first non-`NaN` value.
pub fn first_valid(values: &[f64]) -> Option<usize> {
    values.iter().position(|v| !v.is_nan())
}

/// `true` when the series holds at least one defined value.
pub fn has_valid(values: &[f64]) -> bool {
    first_valid(values).is_some()
}

/// Simple moving average over `period` values.
pub fn sma(values: &[f64], period: usize) -> Series {
    rolling(values, period, |window| {
        window.iter().sum::<f64>() / period as f64
    })
}

/// Rolling sum over `period` values.
pub fn rolling_sum(values: &[f64], period: usize) -> Series {
    rolling(values, period, |window| window.iter().sum::<f64>())
}

pub fn rolling_max(values: &[f64], period: usize) -> Series {
    rolling(values, period, |window| {
        window.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    })
}

pub fn rolling_min(values: &[f64], period: usize) -> Series {
    rolling(values, period, |window| {
        window.iter().copied().fold(f64::INFINITY, f64::min)
    })
}

/// Population standard deviation over `period` values (divides by N).
pub fn rolling_stddev(values: &[f64], period: usize) -> Series {
    rolling(values, period, |window| {
        let mean = window.iter().sum::<f64>() / period as f64;
        let variance = window
            .iter()
            .map(|v| {
                let diff = v - mean;
                diff * diff
            })
            .sum::<f64>()
            / period as f64;
        variance.sqrt()
    })
}

/// Apply `f` to every full window of `period` values ending at each index.
pub fn rolling<F>(values: &[f64], period: usize, f: F) -> Series
where
    F: Fn(&[f64]) -> f64,
{
    let mut out = vec![f64::NAN; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }
    for i in (period - 1)..values.len() {
        let window = &values[i + 1 - period..=i];
        if window.iter().any(|v| v.is_nan()) {
            continue;
        }
        out[i] = f(window);
    }
    out
}

/// Exponential moving average, k = 2/(n+1), seeded with the SMA of the first
/// `period` defined values. Leading `NaN`s are skipped.
pub fn ema(values: &[f64], period: usize) -> Series {
    smoothed(values, period, 2.0 / (period as f64 + 1.0))
}

/// Wilder's smoothing (RMA), k = 1/n, seeded like [`ema`].
pub fn rma(values: &[f64], period: usize) -> Series {
    smoothed(values, period, 1.0 / period as f64)
}

fn smoothed(values: &[f64], period: usize, k: f64) -> Series {
    let mut out = vec![f64::NAN; values.len()];
    if period == 0 {
        return out;
    }
    let Some(start) = first_valid(values) else {
        return out;
    };
    if values.len() < start + period {
        return out;
    }

    let seed_end = start + period - 1;
    let seed = &values[start..=seed_end];
    if seed.iter().any(|v| v.is_nan()) {
        return out;
    }
    let mut avg = seed.iter().sum::<f64>() / period as f64;
    out[seed_end] = avg;

    for i in (seed_end + 1)..values.len() {
        if values[i].is_nan() {
            continue;
        }
        avg = values[i] * k + avg * (1.0 - k);
        out[i] = avg;
    }
    out
}

/// 1.0 where the value rose against the previous one, 0.0 where it did not,
/// `NaN` where either side is undefined.
pub fn rising(values: &[f64]) -> Series {
    let mut out = vec![f64::NAN; values.len()];
    for i in 1..values.len() {
        let (prev, curr) = (values[i - 1], values[i]);
        if prev.is_nan() || curr.is_nan() {
            continue;
        }
        out[i] = if curr > prev { 1.0 } else { 0.0 };
    }
    out
}

/// Element-wise `a - b`.
pub fn subtract(a: &[f64], b: &[f64]) -> Series {
    a.iter().zip(b).map(|(x, y)| x - y).collect()
}

/// `Some(series)` when at least one value is defined.
pub fn available(series: Series) -> Option<Series> {
    if has_valid(&series) { Some(series) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn sma_warmup_and_values() {
        let out = sma(&[1.0, 2.0, 3.0, 4.0], 3);
        assert!(out[0].is_nan());
        assert!(out[1].is_nan());
        assert_relative_eq!(out[2], 2.0);
        assert_relative_eq!(out[3], 3.0);
    }

    #[test]
    fn sma_too_short_is_all_nan() {
        let out = sma(&[1.0, 2.0], 3);
        assert!(out.iter().all(|v| v.is_nan()));
        assert!(!has_valid(&out));
    }

    #[test]
    fn rolling_window_with_nan_is_nan() {
        let out = rolling_sum(&[f64::NAN, 1.0, 2.0, 3.0], 2);
        assert!(out[1].is_nan());
        assert_relative_eq!(out[2], 3.0);
        assert_relative_eq!(out[3], 5.0);
    }

    #[test]
    fn ema_seed_is_sma() {
        let out = ema(&[10.0, 20.0, 30.0, 40.0], 3);
        assert!(out[1].is_nan());
        assert_relative_eq!(out[2], 20.0);
        // k = 0.5
        assert_relative_eq!(out[3], 40.0 * 0.5 + 20.0 * 0.5);
    }

    #[test]
    fn ema_skips_leading_nan() {
        let out = ema(&[f64::NAN, f64::NAN, 10.0, 20.0, 30.0], 2);
        assert!(out[2].is_nan());
        assert_relative_eq!(out[3], 15.0);
        let k = 2.0 / 3.0;
        assert_relative_eq!(out[4], 30.0 * k + 15.0 * (1.0 - k));
    }

    #[test]
    fn rma_uses_wilder_factor() {
        let out = rma(&[2.0, 4.0, 6.0], 2);
        assert_relative_eq!(out[1], 3.0);
        assert_relative_eq!(out[2], (3.0 * 1.0 + 6.0) / 2.0);
    }

    #[test]
    fn rolling_extremes() {
        let values = [3.0, 1.0, 4.0, 1.0, 5.0];
        let max = rolling_max(&values, 3);
        let min = rolling_min(&values, 3);
        assert_relative_eq!(max[2], 4.0);
        assert_relative_eq!(max[4], 5.0);
        assert_relative_eq!(min[2], 1.0);
        assert_relative_eq!(min[4], 1.0);
    }

    #[test]
    fn stddev_constant_is_zero() {
        let out = rolling_stddev(&[5.0, 5.0, 5.0], 3);
        assert_relative_eq!(out[2], 0.0);
    }

    #[test]
    fn rising_flags() {
        let out = rising(&[1.0, 2.0, 2.0, 1.0]);
        assert!(out[0].is_nan());
        assert_relative_eq!(out[1], 1.0);
        assert_relative_eq!(out[2], 0.0);
        assert_relative_eq!(out[3], 0.0);
    }

    #[test]
    fn available_requires_a_defined_value() {
        assert!(available(vec![f64::NAN, f64::NAN]).is_none());
        assert!(available(vec![f64::NAN, 1.0]).is_some());
    }
}
