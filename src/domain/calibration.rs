//! Calibration runs.
//!
//! * `update` walks every enumerated strategy over the long lookback and
//!   stores the filtered ranking under its label, with usage statistics.
//! * `test` re-walks the long list over the test lookback, stores that
//!   ranking and the short-list under `"use"`.
//! * `adjust` re-ranks the short-list by profit over the last hours.
//!
//! Each run rewrites only its own labels in the store.

use crate::domain::candle::{Candle, Lookback, coalesce};
use crate::domain::condition::ConditionSet;
use crate::domain::error::DayTraderError;
use crate::domain::frame::Frame;
use crate::domain::selector::{
    SHORT_LIST_LABEL, SelectionMode, indicator_usage, select, short_list,
};
use crate::domain::settings::{CalibrationSettings, Settings};
use crate::domain::strategy::{enumerate_all, from_ids, referenced_kinds};
use crate::domain::summary::StrategySummary;
use crate::domain::walker::{LastSignal, WalkOutcome, Walker};
use crate::ports::market_data_port::MarketDataPort;
use crate::ports::strategy_store_port::StrategyStorePort;
use chrono::Duration;
use std::collections::HashMap;
use std::fmt;
use tracing::{info, warn};

/// A ranked summary together with the signal its walk ended on.
#[derive(Debug, Clone, PartialEq)]
pub struct Selected {
    pub summary: StrategySummary,
    pub last_signal: Option<LastSignal>,
}

impl fmt::Display for Selected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary)?;
        if let Some(signal) = self.last_signal {
            write!(f, " | last signal: {signal}")?;
        }
        Ok(())
    }
}

/// Operator message announcing the strategies chosen for trading.
pub fn short_list_message(selected: &[Selected]) -> String {
    let mut message = String::from("DT calibration:");
    for entry in selected {
        message.push_str("\n> ");
        message.push_str(&entry.summary.strategy);
    }
    message
}

pub struct Calibration<'a> {
    market: &'a dyn MarketDataPort,
    store: &'a dyn StrategyStorePort,
    symbol: String,
    settings: CalibrationSettings,
    walker: Walker,
}

impl<'a> Calibration<'a> {
    pub fn new(
        settings: &Settings,
        market: &'a dyn MarketDataPort,
        store: &'a dyn StrategyStorePort,
    ) -> Self {
        Self {
            market,
            store,
            symbol: settings.instruments.monitoring.clone(),
            settings: settings.calibration.clone(),
            walker: Walker::new(settings.walker.clone()),
        }
    }

    pub fn update(&self) -> Result<Vec<Selected>, DayTraderError> {
        let lookback = self.settings.long_lookback;
        info!(%lookback, "updating strategies");

        let outcomes = self.walk(lookback, None, None)?;
        let ranked = select(summaries(&outcomes), SelectionMode::Filter);

        let mut book = self.store.load()?;
        book.indicator_usage = indicator_usage(&ranked);
        book.replace(lookback.to_string(), ranked.clone());
        self.store.save(&book)?;

        info!(%lookback, selected = ranked.len(), "strategies updated");
        Ok(attach(ranked, &outcomes))
    }

    /// Returns the new short-list.
    pub fn test(&self) -> Result<Vec<Selected>, DayTraderError> {
        let lookback = self.settings.test_lookback;
        info!(%lookback, "testing strategies");

        let mut book = self.store.load()?;
        let ids = book.ids(&self.settings.long_lookback.to_string());
        let outcomes = self.walk(lookback, Some(&ids), None)?;
        let ranked = select(summaries(&outcomes), SelectionMode::Filter);
        let top = short_list(&ranked);

        book.replace(lookback.to_string(), ranked);
        book.replace(SHORT_LIST_LABEL, top.clone());
        self.store.save(&book)?;

        info!(%lookback, short_list = top.len(), "strategies tested");
        Ok(attach(top, &outcomes))
    }

    pub fn adjust(&self) -> Result<Vec<Selected>, DayTraderError> {
        let lookback = self.settings.adjust_lookback;
        let hours = self.settings.adjust_limit_hours;
        info!(%lookback, hours, "adjusting strategies");

        let mut book = self.store.load()?;
        let ids = book.ids(SHORT_LIST_LABEL);
        let outcomes = self.walk(lookback, Some(&ids), Some(hours))?;
        let ranked = select(summaries(&outcomes), SelectionMode::Adjust);

        book.replace(SHORT_LIST_LABEL, ranked.clone());
        self.store.save(&book)?;

        info!(strategies = ranked.len(), "strategies adjusted");
        Ok(attach(ranked, &outcomes))
    }

    /// The conditions that can be registered for `lookback` of data.
    pub fn conditions(&self, lookback: Lookback) -> Result<ConditionSet, DayTraderError> {
        let mut frame = self.load_frame(lookback, None)?;
        Ok(ConditionSet::build(&mut frame))
    }

    /// Walk `ids` (or every enumerated strategy) over `lookback`, trimmed to
    /// the last `limit_hours` when given.
    fn walk(
        &self,
        lookback: Lookback,
        ids: Option<&[String]>,
        limit_hours: Option<u32>,
    ) -> Result<Vec<WalkOutcome>, DayTraderError> {
        let mut frame = self.load_frame(lookback, limit_hours)?;
        let strategies = match ids {
            None => enumerate_all(&ConditionSet::build(&mut frame)),
            Some(ids) => {
                if ids.is_empty() {
                    warn!(%lookback, "no stored strategies to walk");
                }
                let set = ConditionSet::build_only(&mut frame, &referenced_kinds(ids));
                from_ids(ids, &set)
            }
        };
        info!(
            strategies = strategies.len(),
            candles = frame.len(),
            "walking candle history"
        );
        Ok(self.walker.traverse(&strategies, &frame))
    }

    fn load_frame(
        &self,
        lookback: Lookback,
        limit_hours: Option<u32>,
    ) -> Result<Frame, DayTraderError> {
        let candles = self
            .market
            .get_candles(&self.symbol, lookback, &self.settings.resolution)?;
        let candles = match limit_hours {
            Some(hours) => last_hours(coalesce(candles), hours),
            None => candles,
        };
        if candles.is_empty() {
            return Err(DayTraderError::NoData {
                symbol: self.symbol.clone(),
            });
        }
        Ok(Frame::new(candles))
    }
}

/// Candles within `hours` of the last one.
fn last_hours(candles: Vec<Candle>, hours: u32) -> Vec<Candle> {
    let Some(last) = candles.last().map(|c| c.timestamp) else {
        return candles;
    };
    let cutoff = last - Duration::hours(i64::from(hours));
    candles.into_iter().filter(|c| c.timestamp > cutoff).collect()
}

fn summaries(outcomes: &[WalkOutcome]) -> Vec<StrategySummary> {
    outcomes.iter().map(|o| o.summary.clone()).collect()
}

fn attach(ranked: Vec<StrategySummary>, outcomes: &[WalkOutcome]) -> Vec<Selected> {
    let signals: HashMap<&str, Option<LastSignal>> = outcomes
        .iter()
        .map(|o| (o.summary.strategy.as_str(), o.last_signal))
        .collect();
    ranked
        .into_iter()
        .map(|summary| Selected {
            last_signal: signals.get(summary.strategy.as_str()).copied().flatten(),
            summary,
        })
        .collect()
}
