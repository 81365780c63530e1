//! Minute candle representation.

use chrono::{Days, NaiveDate, NaiveDateTime};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq)]
pub struct Candle {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

impl Candle {
    /// (open + close) / 2, the simulated fill price of a candle.
    pub fn midpoint(&self) -> f64 {
        (self.open + self.close) / 2.0
    }

    /// (high + low + close) / 3
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    /// (high + low) / 2
    pub fn median_price(&self) -> f64 {
        (self.high + self.low) / 2.0
    }

    /// max(high - low, |high - prev_close|, |low - prev_close|)
    pub fn true_range(&self, prev_close: f64) -> f64 {
        let hl = self.high - self.low;
        let hc = (self.high - prev_close).abs();
        let lc = (self.low - prev_close).abs();
        hl.max(hc).max(lc)
    }

    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }
}

/// Sort candles by timestamp and collapse rows sharing a timestamp, keeping
/// the last one received.
pub fn coalesce(candles: Vec<Candle>) -> Vec<Candle> {
    let mut indexed: Vec<(usize, Candle)> = candles.into_iter().enumerate().collect();
    indexed.sort_by(|a, b| a.1.timestamp.cmp(&b.1.timestamp).then(a.0.cmp(&b.0)));

    let mut result: Vec<Candle> = Vec::with_capacity(indexed.len());
    for (_, candle) in indexed {
        match result.last_mut() {
            Some(last) if last.timestamp == candle.timestamp => *last = candle,
            _ => result.push(candle),
        }
    }
    result
}

/// A history window in calendar days, written `"30d"`. Also the label a
/// calibration result is stored under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Lookback {
    days: u32,
}

impl Lookback {
    pub fn days(days: u32) -> Self {
        Self { days }
    }

    /// First calendar day inside the window ending on `last`.
    pub fn first_day(&self, last: NaiveDate) -> NaiveDate {
        last.checked_sub_days(Days::new(u64::from(self.days.saturating_sub(1))))
            .unwrap_or(NaiveDate::MIN)
    }

    /// Keep the candles of the last `days` calendar days of `candles`.
    pub fn trim(&self, candles: Vec<Candle>) -> Vec<Candle> {
        let Some(last) = candles.last().map(|c| c.timestamp.date()) else {
            return candles;
        };
        let first = self.first_day(last);
        candles
            .into_iter()
            .filter(|c| c.timestamp.date() >= first)
            .collect()
    }
}

impl fmt::Display for Lookback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d", self.days)
    }
}

impl FromStr for Lookback {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let days = s
            .trim()
            .strip_suffix('d')
            .and_then(|n| n.parse::<u32>().ok())
            .filter(|&n| n > 0)
            .ok_or_else(|| format!("invalid lookback '{s}', expected e.g. '30d'"))?;
        Ok(Self { days })
    }
}
