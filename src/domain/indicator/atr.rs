//! Average True Range with Wilder smoothing.

use crate::domain::candle::Candle;
use crate::domain::indicator::Series;

pub fn true_ranges(candles: &[Candle]) -> Series {
    candles
        .iter()
        .enumerate()
        .map(|(i, candle)| {
            if i == 0 {
                candle.high - candle.low
            } else {
                candle.true_range(candles[i - 1].close)
            }
        })
        .collect()
}

pub fn calc_atr(candles: &[Candle], period: usize) -> Option<Series> {
    if candles.len() < period || period == 0 {
        return None;
    }

    let tr_values = true_ranges(candles);
    let mut results = vec![f64::NAN; candles.len()];

    let seed: f64 = tr_values[..period].iter().sum::<f64>() / period as f64;
    results[period - 1] = seed;

    let mut prev_atr = seed;
    for i in period..candles.len() {
        let atr = (prev_atr * (period - 1) as f64 + tr_values[i]) / period as f64;
        results[i] = atr;
        prev_atr = atr;
    }

    Some(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_candle(minute: u32, high: f64, low: f64, close: f64) -> Candle {
        Candle {
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 2)
                .unwrap()
                .and_hms_opt(10, minute, 0)
                .unwrap(),
            open: close,
            high,
            low,
            close,
            volume: 1000,
        }
    }

    #[test]
    fn atr_warmup() {
        let candles: Vec<Candle> = (0..5).map(|i| make_candle(i, 110.0, 90.0, 100.0)).collect();

        let series = calc_atr(&candles, 3).unwrap();
        assert_eq!(series.len(), 5);
        assert!(series[0].is_nan());
        assert!(series[1].is_nan());
        assert!(!series[2].is_nan());
        assert!(!series[4].is_nan());
    }

    #[test]
    fn atr_seed_is_average() {
        let candles = vec![
            make_candle(0, 110.0, 100.0, 105.0),
            make_candle(1, 115.0, 105.0, 110.0),
            make_candle(2, 120.0, 110.0, 115.0),
        ];

        let series = calc_atr(&candles, 3).unwrap();
        assert!((series[2] - 10.0).abs() < 1e-9);
    }

    #[test]
    fn atr_wilder_smoothing() {
        let candles = vec![
            make_candle(0, 110.0, 100.0, 105.0),
            make_candle(1, 115.0, 105.0, 110.0),
            make_candle(2, 120.0, 110.0, 115.0),
            make_candle(3, 125.0, 115.0, 120.0),
        ];

        let series = calc_atr(&candles, 3).unwrap();
        let expected = (10.0 * 2.0 + 10.0) / 3.0;
        assert!((series[3] - expected).abs() < 1e-9);
    }

    #[test]
    fn atr_insufficient_candles() {
        let candles: Vec<Candle> = (0..2).map(|i| make_candle(i, 110.0, 90.0, 100.0)).collect();
        assert!(calc_atr(&candles, 5).is_none());
    }

    #[test]
    fn true_range_uses_gaps() {
        let candles = vec![
            make_candle(0, 110.0, 100.0, 105.0),
            make_candle(1, 130.0, 120.0, 125.0),
        ];
        let tr = true_ranges(&candles);
        assert!((tr[0] - 10.0).abs() < 1e-9);
        // |130 - 105| = 25
        assert!((tr[1] - 25.0).abs() < 1e-9);
    }
}
