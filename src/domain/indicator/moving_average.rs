//! Derived moving averages: DEMA, ALMA and the symmetric weighted MA.

use crate::domain::indicator::{Series, available, ema, rolling};

/// Double EMA: 2·EMA(n) − EMA(EMA(n)).
pub fn dema(values: &[f64], period: usize) -> Series {
    let first = ema(values, period);
    let second = ema(&first, period);
    first
        .iter()
        .zip(&second)
        .map(|(e1, e2)| 2.0 * e1 - e2)
        .collect()
}

/// +1 where DEMA(fast) ≥ DEMA(slow), −1 below, `NaN` during warm-up.
pub fn dema_trend(closes: &[f64], fast: usize, slow: usize) -> Option<Series> {
    let fast_line = dema(closes, fast);
    let slow_line = dema(closes, slow);
    let trend = fast_line
        .iter()
        .zip(&slow_line)
        .map(|(f, s)| {
            if f.is_nan() || s.is_nan() {
                f64::NAN
            } else if f >= s {
                1.0
            } else {
                -1.0
            }
        })
        .collect();
    available(trend)
}

/// Arnaud Legoux moving average.
///
/// Gaussian weights centred at `offset · (n − 1)` with width `n / sigma`.
pub fn alma(values: &[f64], period: usize, sigma: f64, offset: f64) -> Option<Series> {
    if period == 0 || sigma <= 0.0 {
        return None;
    }
    let m = offset * (period - 1) as f64;
    let s = period as f64 / sigma;
    let weights: Vec<f64> = (0..period)
        .map(|j| (-((j as f64 - m).powi(2)) / (2.0 * s * s)).exp())
        .collect();
    let norm: f64 = weights.iter().sum();

    let out = rolling(values, period, |window| {
        window
            .iter()
            .zip(&weights)
            .map(|(v, w)| v * w)
            .sum::<f64>()
            / norm
    });
    available(out)
}

/// Symmetric weighted moving average over 4 values, weights 1-2-2-1.
pub fn swma4(values: &[f64]) -> Series {
    rolling(values, 4, |w| (w[0] + 2.0 * w[1] + 2.0 * w[2] + w[3]) / 6.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn dema_of_constant_is_constant() {
        let out = dema(&[50.0; 20], 5);
        assert!(out[7].is_nan());
        assert_relative_eq!(out[8], 50.0);
        assert_relative_eq!(out[19], 50.0);
    }

    #[test]
    fn dema_trend_follows_direction() {
        let up: Vec<f64> = (0..120).map(|i| 100.0 + 0.01 * (i * i) as f64).collect();
        let trend = dema_trend(&up, 20, 30).unwrap();
        assert_relative_eq!(trend[119], 1.0);

        let down: Vec<f64> = (0..120).map(|i| 300.0 - 0.01 * (i * i) as f64).collect();
        let trend = dema_trend(&down, 20, 30).unwrap();
        assert_relative_eq!(trend[119], -1.0);
    }

    #[test]
    fn dema_trend_too_short() {
        let closes: Vec<f64> = (0..30).map(|i| i as f64).collect();
        assert!(dema_trend(&closes, 20, 30).is_none());
    }

    #[test]
    fn alma_of_constant_is_constant() {
        let out = alma(&[7.0; 30], 18, 6.0, 0.85).unwrap();
        assert!(out[16].is_nan());
        assert_relative_eq!(out[17], 7.0, epsilon = 1e-12);
    }

    #[test]
    fn alma_leans_towards_recent_values() {
        let values: Vec<f64> = (0..18).map(|i| i as f64).collect();
        let out = alma(&values, 18, 6.0, 0.85).unwrap();
        let plain_mean = values.iter().sum::<f64>() / 18.0;
        assert!(out[17] > plain_mean);
    }

    #[test]
    fn swma_weights() {
        let out = swma4(&[1.0, 2.0, 3.0, 4.0]);
        assert_relative_eq!(out[3], (1.0 + 4.0 + 6.0 + 4.0) / 6.0);
    }
}
