//! Per-strategy backtest summary.

use crate::domain::instrument::Instrument;
use crate::domain::walker::{TradeRecord, Verdict, NOTIONAL};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Trade and win counts for one instrument.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentCounts {
    pub trades: usize,
    pub good: usize,
}

impl fmt::Display for InstrumentCounts {
    /// `"NN% - good / total"`, empty without trades.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.trades == 0 {
            return Ok(());
        }
        write!(
            f,
            "{}% - {} / {}",
            percent(self.good, self.trades),
            self.good,
            self.trades
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategySummary {
    pub strategy: String,
    pub points: i64,
    /// Net of the 1000-unit notional of every trade.
    pub profit: i64,
    /// Share of good trades, whole percent.
    pub efficiency: u32,
    #[serde(default)]
    pub bull: InstrumentCounts,
    #[serde(default)]
    pub bear: InstrumentCounts,
}

impl StrategySummary {
    pub fn empty(strategy: impl Into<String>) -> Self {
        Self {
            strategy: strategy.into(),
            points: 0,
            profit: 0,
            efficiency: 0,
            bull: InstrumentCounts::default(),
            bear: InstrumentCounts::default(),
        }
    }

    pub fn from_trades(strategy: impl Into<String>, trades: &[TradeRecord]) -> Self {
        let mut summary = Self::empty(strategy);
        if trades.is_empty() {
            return summary;
        }

        let mut good = 0;
        let mut gross = 0;
        for trade in trades {
            let is_good = trade.verdict == Verdict::Good;
            let counts = match trade.instrument {
                Instrument::Bull => &mut summary.bull,
                Instrument::Bear => &mut summary.bear,
            };
            counts.trades += 1;
            if is_good {
                counts.good += 1;
                good += 1;
            }
            summary.points += trade.points;
            gross += trade.profit;
        }
        summary.profit = gross - trades.len() as i64 * NOTIONAL;
        summary.efficiency = percent(good, trades.len());
        summary
    }

    pub fn trades(&self) -> usize {
        self.bull.trades + self.bear.trades
    }

    pub fn counts(&self, instrument: Instrument) -> InstrumentCounts {
        match instrument {
            Instrument::Bull => self.bull,
            Instrument::Bear => self.bear,
        }
    }
}

impl fmt::Display for StrategySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | points: {} | profit: {} | efficiency: {}% | BULL: {} | BEAR: {}",
            self.strategy, self.points, self.profit, self.efficiency, self.bull, self.bear
        )
    }
}

/// `round(100 · part / whole)`, halves to even.
fn percent(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    (100.0 * part as f64 / whole as f64).round_ties_even() as u32
}
