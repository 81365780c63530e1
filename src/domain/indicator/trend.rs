//! Trend-following overlays: Parabolic SAR, Supertrend and the Gann HiLo
//! activator.

use crate::domain::candle::Candle;
use crate::domain::indicator::atr::calc_atr;
use crate::domain::indicator::{Series, available, sma};

pub const PSAR_STEP: f64 = 0.1;
pub const PSAR_MAX_STEP: f64 = 0.25;

/// Parabolic SAR split by regime: `long` is defined while the SAR trails
/// below price, `short` while it trails above.
#[derive(Debug, Clone)]
pub struct Psar {
    pub long: Series,
    pub short: Series,
}

pub fn calculate_psar(candles: &[Candle], step: f64, max_step: f64) -> Option<Psar> {
    if candles.len() < 2 {
        return None;
    }
    let n = candles.len();
    let mut long = vec![f64::NAN; n];
    let mut short = vec![f64::NAN; n];

    let up_move = candles[1].high - candles[0].high;
    let down_move = candles[0].low - candles[1].low;
    let mut falling = down_move > up_move && down_move > 0.0;

    let mut sar = if falling { candles[0].high } else { candles[0].low };
    let mut extreme = if falling { candles[0].low } else { candles[0].high };
    let mut af = step;

    for row in 1..n {
        let candle = &candles[row];
        let prev = &candles[row - 1];
        let prev2 = &candles[row.saturating_sub(2)];

        let mut next = sar + af * (extreme - sar);
        let reverse;
        if falling {
            reverse = candle.high > next;
            if candle.low < extreme {
                extreme = candle.low;
                af = (af + step).min(max_step);
            }
            next = next.max(prev.high).max(prev2.high);
        } else {
            reverse = candle.low < next;
            if candle.high > extreme {
                extreme = candle.high;
                af = (af + step).min(max_step);
            }
            next = next.min(prev.low).min(prev2.low);
        }

        if reverse {
            next = extreme;
            af = step;
            falling = !falling;
            extreme = if falling { candle.low } else { candle.high };
        }

        sar = next;
        if falling {
            short[row] = sar;
        } else {
            long[row] = sar;
        }
    }

    Some(Psar { long, short })
}

/// Supertrend line: the lower band while the trend is up, the upper band
/// while it is down. Bands are `hl2 ± multiplier · ATR(period)` and only
/// ever tighten within a trend.
pub fn calculate_supertrend(candles: &[Candle], period: usize, multiplier: f64) -> Option<Series> {
    let atr = calc_atr(candles, period)?;
    let n = candles.len();

    let mut upper: Vec<f64> = candles
        .iter()
        .zip(&atr)
        .map(|(c, a)| c.median_price() + multiplier * a)
        .collect();
    let mut lower: Vec<f64> = candles
        .iter()
        .zip(&atr)
        .map(|(c, a)| c.median_price() - multiplier * a)
        .collect();

    let mut direction = vec![1i8; n];
    let mut trend = vec![f64::NAN; n];
    for i in 1..n {
        let close = candles[i].close;
        if close > upper[i - 1] {
            direction[i] = 1;
        } else if close < lower[i - 1] {
            direction[i] = -1;
        } else {
            direction[i] = direction[i - 1];
            if direction[i] > 0 && lower[i] < lower[i - 1] {
                lower[i] = lower[i - 1];
            }
            if direction[i] < 0 && upper[i] > upper[i - 1] {
                upper[i] = upper[i - 1];
            }
        }
        trend[i] = if direction[i] > 0 { lower[i] } else { upper[i] };
    }

    available(trend)
}

/// Gann HiLo activator: the SMA of lows after a close above the SMA of
/// highs, the SMA of highs after a close below the SMA of lows, otherwise
/// the previous value carried forward.
pub fn calculate_hilo(candles: &[Candle], high_period: usize, low_period: usize) -> Option<Series> {
    let highs: Vec<f64> = candles.iter().map(|c| c.high).collect();
    let lows: Vec<f64> = candles.iter().map(|c| c.low).collect();
    let high_ma = sma(&highs, high_period);
    let low_ma = sma(&lows, low_period);

    let mut hilo = vec![f64::NAN; candles.len()];
    for i in 1..candles.len() {
        let close = candles[i].close;
        hilo[i] = if close > high_ma[i - 1] {
            low_ma[i]
        } else if close < low_ma[i - 1] {
            high_ma[i]
        } else {
            hilo[i - 1]
        };
    }

    available(hilo)
}
