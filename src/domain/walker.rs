//! Backtest simulator.
//!
//! Replays a frame candle by candle against one strategy. A buy signal
//! closes any open BEAR order and opens BULL; a sell signal closes BULL and
//! opens BEAR. Fills happen at the midpoint of the signal candle, entries
//! moved against the trade by a fixed slippage. Candles before the session
//! start are skipped; at the session close, and on the final candle, every
//! open order is closed.
//!
//! Walks are pure: the same frame and strategy always give the same
//! outcome, so strategies are walked in parallel.

use crate::domain::candle::Candle;
use crate::domain::frame::{Frame, Row};
use crate::domain::instrument::{Instrument, Signal};
use crate::domain::strategy::Strategy;
use crate::domain::summary::StrategySummary;
use chrono::{NaiveDateTime, NaiveTime};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

/// Notional every simulated trade is scored against.
pub const NOTIONAL: i64 = 1000;
/// Certificate leverage applied to underlying moves.
pub const LEVERAGE: f64 = 20.0;
/// `(|profit - notional| threshold, weight)`; evaluated in order, the last
/// evaluation decides the weight.
const POINT_WEIGHTS: [(i64, i64); 2] = [(100, 2), (200, 3)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Good,
    Bad,
}

/// `Good` when the exit moved in the instrument's favour.
pub fn verdict(instrument: Instrument, price_buy: f64, price_sell: f64) -> Verdict {
    let bad = match instrument {
        Instrument::Bull => price_sell <= price_buy,
        Instrument::Bear => price_sell >= price_buy,
    };
    if bad { Verdict::Bad } else { Verdict::Good }
}

/// `round(20 · (sell − buy) · direction + 1000)`.
pub fn trade_profit(instrument: Instrument, price_buy: f64, price_sell: f64) -> i64 {
    let raw = LEVERAGE * (price_sell - price_buy) * instrument.direction() + NOTIONAL as f64;
    raw.round_ties_even() as i64
}

/// ±1 by the sign of the deviation from the notional, weighted by the last
/// bucket in [`POINT_WEIGHTS`]: 3 beyond 200, otherwise 1.
pub fn trade_points(profit: i64) -> i64 {
    let deviation = profit - NOTIONAL;
    let sign = if deviation > 0 { 1 } else { -1 };
    let weight = POINT_WEIGHTS.iter().fold(1, |_, &(threshold, weight)| {
        if deviation.abs() > threshold { weight } else { 1 }
    });
    sign * weight
}

/// A closed simulated trade.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeRecord {
    pub instrument: Instrument,
    pub price_buy: f64,
    pub price_sell: f64,
    pub time_buy: NaiveDateTime,
    pub time_sell: NaiveDateTime,
    pub verdict: Verdict,
    pub profit: i64,
    pub points: i64,
}

/// The single simulated order slot of one instrument.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedOrder {
    pub instrument: Instrument,
    pub on_balance: bool,
    pub price_buy: Option<f64>,
    pub price_sell: Option<f64>,
    pub time_buy: Option<NaiveDateTime>,
    pub time_sell: Option<NaiveDateTime>,
    pub verdict: Option<Verdict>,
}

impl SimulatedOrder {
    pub fn new(instrument: Instrument) -> Self {
        Self {
            instrument,
            on_balance: false,
            price_buy: None,
            price_sell: None,
            time_buy: None,
            time_sell: None,
            verdict: None,
        }
    }

    /// Open at the slipped midpoint of `candle`. No-op while on balance.
    pub fn buy(&mut self, candle: &Candle) {
        if self.on_balance {
            return;
        }
        self.on_balance = true;
        self.price_buy = Some(self.instrument.entry_price(candle.midpoint()));
        self.time_buy = Some(candle.timestamp);
    }

    /// Close at the midpoint of `candle` and reset the slot.
    pub fn sell(&mut self, candle: &Candle) -> Option<TradeRecord> {
        if !self.on_balance {
            return None;
        }
        let (price_buy, time_buy) = (self.price_buy?, self.time_buy?);
        let price_sell = candle.midpoint();
        let verdict = verdict(self.instrument, price_buy, price_sell);
        self.price_sell = Some(price_sell);
        self.time_sell = Some(candle.timestamp);
        self.verdict = Some(verdict);

        let profit = trade_profit(self.instrument, price_buy, price_sell);
        let record = TradeRecord {
            instrument: self.instrument,
            price_buy,
            price_sell,
            time_buy,
            time_sell: candle.timestamp,
            verdict,
            profit,
            points: trade_points(profit),
        };
        *self = SimulatedOrder::new(self.instrument);
        Some(record)
    }

    /// Leveraged value ratio of the open order at `price` (1.0 = unchanged).
    pub fn leveraged_ratio(&self, price: f64) -> Option<f64> {
        let price_buy = self.price_buy.filter(|_| self.on_balance)?;
        Some(1.0 + LEVERAGE * self.instrument.direction() * (price - price_buy) / price_buy)
    }
}

/// Simulated stop-loss / take-profit as leveraged value ratios, e.g. 0.98
/// and 1.02.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradeLimits {
    pub stop_loss: f64,
    pub take_profit: f64,
}

impl TradeLimits {
    pub fn crossed(&self, ratio: f64) -> bool {
        ratio <= self.stop_loss || ratio >= self.take_profit
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WalkerConfig {
    pub session_start: NaiveTime,
    pub session_close: NaiveTime,
    pub limits: Option<TradeLimits>,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            session_start: NaiveTime::from_hms_opt(10, 0, 0).unwrap_or_default(),
            session_close: NaiveTime::from_hms_opt(17, 15, 0).unwrap_or_default(),
            limits: None,
        }
    }
}

/// Most recent signal of a walk that still holds at its end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LastSignal {
    pub signal: Signal,
    pub time: NaiveDateTime,
}

impl fmt::Display for LastSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.signal, self.time.format("%H:%M"))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WalkOutcome {
    pub summary: StrategySummary,
    pub trades: Vec<TradeRecord>,
    pub last_signal: Option<LastSignal>,
}

/// Composite signal of `strategy` on one row; buy wins when both fire.
pub fn signal_at(strategy: &Strategy, row: &Row<'_>) -> Option<Signal> {
    if strategy.buy(row) {
        Some(Signal::Buy)
    } else if strategy.sell(row) {
        Some(Signal::Sell)
    } else {
        None
    }
}

#[derive(Debug, Clone, Default)]
pub struct Walker {
    config: WalkerConfig,
}

impl Walker {
    pub fn new(config: WalkerConfig) -> Self {
        Self { config }
    }

    pub fn walk(&self, strategy: &Strategy, frame: &Frame) -> WalkOutcome {
        let mut orders = Instrument::ALL.map(SimulatedOrder::new);
        let mut trades = Vec::new();
        let mut last_signal: Option<LastSignal> = None;

        for row in frame.rows() {
            let candle = row.candle();
            let time = candle.timestamp.time();
            if time < self.config.session_start {
                continue;
            }

            if time >= self.config.session_close || row.is_last() {
                if let Some(last) = last_signal {
                    if !orders[last.signal.instrument().index()].on_balance {
                        last_signal = None;
                    }
                }
                trades.extend(orders.iter_mut().filter_map(|o| o.sell(candle)));
                continue;
            }

            if let Some(limits) = self.config.limits {
                for order in orders.iter_mut() {
                    let crossed = order
                        .leveraged_ratio(candle.midpoint())
                        .is_some_and(|ratio| limits.crossed(ratio));
                    if crossed {
                        trades.extend(order.sell(candle));
                    }
                }
            }

            if let Some(signal) = signal_at(strategy, &row) {
                let main = signal.instrument();
                trades.extend(orders[main.other().index()].sell(candle));
                orders[main.index()].buy(candle);
                last_signal = Some(LastSignal {
                    signal,
                    time: candle.timestamp,
                });
            }
        }

        WalkOutcome {
            summary: StrategySummary::from_trades(strategy.id(), &trades),
            trades,
            last_signal,
        }
    }

    /// Walk every strategy over the same frame. Output order matches input.
    pub fn traverse(&self, strategies: &[Strategy], frame: &Frame) -> Vec<WalkOutcome> {
        info!(
            strategies = strategies.len(),
            candles = frame.len(),
            "walking strategies"
        );
        strategies
            .par_iter()
            .map(|strategy| self.walk(strategy, frame))
            .collect()
    }
}
