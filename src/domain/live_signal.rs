//! The live signal of the short-listed strategies.
//!
//! Each strategy contributes the most recent signal it produced today, up
//! to the last full candle. The latest of those wins; strategies signalling
//! on the same candle vote and a tie yields nothing. A signal already acted
//! on is not repeated.

use crate::domain::candle::Lookback;
use crate::domain::condition::ConditionSet;
use crate::domain::error::DayTraderError;
use crate::domain::frame::Frame;
use crate::domain::instrument::Signal;
use crate::domain::session::DayPhase;
use crate::domain::strategy::{Strategy, from_ids, referenced_kinds};
use crate::domain::walker::{LastSignal, signal_at};
use crate::ports::market_data_port::MarketDataPort;
use chrono::NaiveDateTime;
use std::time::Duration;
use tracing::debug;

/// Most recent signal among `strategies` on the trading day of row `upto`,
/// looking no further than `upto`.
pub fn latest_signal(strategies: &[Strategy], frame: &Frame, upto: usize) -> Option<LastSignal> {
    if upto >= frame.len() {
        return None;
    }
    let day = frame.candle(upto).timestamp.date();

    let signals: Vec<LastSignal> = strategies
        .iter()
        .filter_map(|strategy| {
            (0..=upto)
                .rev()
                .map(|i| frame.row(i))
                .take_while(|row| row.timestamp().date() == day)
                .find_map(|row| {
                    signal_at(strategy, &row).map(|signal| LastSignal {
                        signal,
                        time: row.timestamp(),
                    })
                })
        })
        .collect();

    let time = signals.iter().map(|s| s.time).max()?;
    let (buys, sells) = signals
        .iter()
        .filter(|s| s.time == time)
        .fold((0, 0), |(b, s), last| match last.signal {
            Signal::Buy => (b + 1, s),
            Signal::Sell => (b, s + 1),
        });
    let signal = match buys.cmp(&sells) {
        std::cmp::Ordering::Greater => Signal::Buy,
        std::cmp::Ordering::Less => Signal::Sell,
        std::cmp::Ordering::Equal => return None,
    };
    Some(LastSignal { signal, time })
}

#[derive(Debug, Clone)]
pub struct LiveSignalSource {
    strategy_ids: Vec<String>,
    symbol: String,
    resolution: String,
    max_candle_age: Duration,
    acted: Option<LastSignal>,
}

impl LiveSignalSource {
    pub fn new(
        strategy_ids: Vec<String>,
        symbol: impl Into<String>,
        resolution: impl Into<String>,
        max_candle_age: Duration,
    ) -> Self {
        Self {
            strategy_ids,
            symbol: symbol.into(),
            resolution: resolution.into(),
            max_candle_age,
            acted: None,
        }
    }

    pub fn strategy_ids(&self) -> &[String] {
        &self.strategy_ids
    }

    /// Remember that `signal` was acted on.
    pub fn acknowledge(&mut self, signal: LastSignal) {
        self.acted = Some(signal);
    }

    /// Signal to act on at `now`, if any. Today's candles alone are too few
    /// for the indicators early in the day, so `MorningTransition` reads two
    /// days.
    pub fn evaluate(
        &self,
        market: &dyn MarketDataPort,
        phase: DayPhase,
        now: NaiveDateTime,
    ) -> Result<Option<LastSignal>, DayTraderError> {
        if self.strategy_ids.is_empty() {
            return Ok(None);
        }
        let lookback = if phase == DayPhase::MorningTransition {
            Lookback::days(2)
        } else {
            Lookback::days(1)
        };
        let mut frame = Frame::new(market.get_candles(&self.symbol, lookback, &self.resolution)?);
        if frame.len() < 2 {
            debug!(candles = frame.len(), "not enough candles for a signal");
            return Ok(None);
        }

        let last_full = frame.len() - 2;
        let age = now - frame.candle(last_full).timestamp;
        if age.to_std().is_ok_and(|age| age > self.max_candle_age) {
            debug!(
                candle = %frame.candle(last_full).timestamp,
                age_secs = age.num_seconds(),
                "last full candle is stale"
            );
            return Ok(None);
        }

        let set = ConditionSet::build_only(&mut frame, &referenced_kinds(&self.strategy_ids));
        let strategies = from_ids(&self.strategy_ids, &set);
        let Some(latest) = latest_signal(&strategies, &frame, last_full) else {
            return Ok(None);
        };

        if let Some(acted) = self.acted {
            if acted.signal == latest.signal && latest.time <= acted.time {
                debug!(signal = %latest, "signal already acted on");
                return Ok(None);
            }
        }
        debug!(signal = %latest, strategies = strategies.len(), "live signal");
        Ok(Some(latest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::candle::Candle;
    use crate::domain::condition::ConditionKind;
    use crate::domain::frame::Column;
    use crate::domain::strategy::enumerate_all;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    /// Strategies over ENGULFING and MARUBOZU (one each) with RSI and EBSW.
    fn strategies() -> Vec<Strategy> {
        enumerate_all(&ConditionSet::from_kinds(&[
            ConditionKind::Engulfing,
            ConditionKind::Marubozu,
            ConditionKind::Rsi,
            ConditionKind::Ebsw,
        ]))
    }

    fn frame(times: &[NaiveDateTime], engulfing: &[f64], marubozu: &[f64]) -> Frame {
        let candles = times
            .iter()
            .map(|&timestamp| Candle {
                timestamp,
                open: 100.0,
                high: 100.0,
                low: 100.0,
                close: 100.0,
                volume: 1,
            })
            .collect();
        let mut frame = Frame::new(candles);
        frame.insert(Column::Engulfing, engulfing.to_vec());
        frame.insert(Column::Marubozu, marubozu.to_vec());
        frame.insert(Column::Rsi, vec![60.0; times.len()]);
        frame.insert(Column::Ebsw, vec![0.9; times.len()]);
        frame
    }

    #[test]
    fn latest_signal_time_wins() {
        let nan = f64::NAN;
        let times = [at(6, 11, 0), at(6, 11, 1), at(6, 11, 2), at(6, 11, 3)];
        let frame = frame(&times, &[1.0, nan, nan, nan], &[nan, 1.0, nan, nan]);

        let latest = latest_signal(&strategies(), &frame, 2).unwrap();
        assert_eq!(latest.signal, Signal::Buy);
        assert_eq!(latest.time, at(6, 11, 1));
    }

    #[test]
    fn rows_after_upto_are_ignored() {
        let nan = f64::NAN;
        let times = [at(6, 11, 0), at(6, 11, 1), at(6, 11, 2)];
        let frame = frame(&times, &[nan, nan, 1.0], &[nan, nan, nan]);
        assert_eq!(latest_signal(&strategies(), &frame, 1), None);
    }

    #[test]
    fn previous_day_signals_are_ignored() {
        let nan = f64::NAN;
        let times = [at(5, 16, 0), at(6, 9, 30), at(6, 9, 31)];
        let frame = frame(&times, &[1.0, nan, nan], &[nan, nan, nan]);
        assert_eq!(latest_signal(&strategies(), &frame, 1), None);
    }

    #[test]
    fn tied_vote_yields_nothing() {
        let pick = |kinds: &[ConditionKind]| enumerate_all(&ConditionSet::from_kinds(kinds))[0];
        let buyer = pick(&[ConditionKind::Engulfing, ConditionKind::Rsi, ConditionKind::Ebsw]);
        let seller = pick(&[ConditionKind::Marubozu, ConditionKind::Uo, ConditionKind::Cmf]);

        let times = [at(6, 11, 0), at(6, 11, 1)];
        let mut frame = frame(&times, &[1.0, f64::NAN], &[-1.0, f64::NAN]);
        frame.insert(Column::Uo, vec![80.0; 2]);
        frame.insert(Column::Cmf, vec![-0.1; 2]);

        assert_eq!(latest_signal(&[buyer], &frame, 1).unwrap().signal, Signal::Buy);
        assert_eq!(latest_signal(&[seller], &frame, 1).unwrap().signal, Signal::Sell);
        assert_eq!(latest_signal(&[buyer, seller], &frame, 1), None);
        assert_eq!(
            latest_signal(&[buyer, seller, buyer], &frame, 1).unwrap().signal,
            Signal::Buy
        );
    }
}
