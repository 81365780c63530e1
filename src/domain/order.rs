//! Broker-side records the live session reads and writes.

use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OrderSide::Buy => "BUY",
            OrderSide::Sell => "SELL",
        })
    }
}

/// Current certificate quote. `spread` is in percent of the ask.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Quote {
    pub bid: Option<f64>,
    pub ask: Option<f64>,
    pub spread: Option<f64>,
}

impl Quote {
    pub fn new(bid: f64, ask: f64) -> Self {
        let spread = (ask > 0.0).then(|| (ask - bid) / ask * 100.0);
        Self {
            bid: Some(bid),
            ask: Some(ask),
            spread,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub instrument_id: String,
    pub volume: i64,
    pub acquired_price: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActiveOrder {
    pub id: String,
    pub instrument_id: String,
    pub side: OrderSide,
    pub price: f64,
    pub volume: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderRequest {
    pub account: String,
    pub instrument_id: String,
    pub side: OrderSide,
    pub price: f64,
    pub volume: i64,
    pub valid_until: NaiveDate,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AccountOverview {
    pub buying_power: f64,
    pub own_capital: f64,
}
