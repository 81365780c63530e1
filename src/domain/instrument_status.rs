//! Per-instrument live status and the exit prices derived from it.
//!
//! Reference price is the position's acquisition price, or the active
//! order's price while nothing is held. Stop-loss and take-profit are fixed
//! multiples of it. Once the bid rises above the reference the trailing
//! stop follows the best bid seen and can only move up; the effective stop
//! is the higher of the two.

use crate::domain::order::{ActiveOrder, OrderSide, Position, Quote};
use crate::domain::settings::TradingSettings;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstrumentStatus {
    pub has_position: bool,
    pub position: Option<Position>,
    pub active_order: Option<ActiveOrder>,
    pub quote: Quote,
    /// Current bid, the price a sell would fill at.
    pub current_price: Option<f64>,
    pub stop_loss_price: Option<f64>,
    pub take_profit_price: Option<f64>,
    pub trailing_stop_loss_price: Option<f64>,
}

impl InstrumentStatus {
    /// Status from fresh broker state. `previous` carries the trailing stop
    /// while the same position is held.
    pub fn derive(
        position: Option<Position>,
        active_order: Option<ActiveOrder>,
        quote: Quote,
        limits: &TradingSettings,
        previous: Option<&InstrumentStatus>,
    ) -> Self {
        let reference = position
            .as_ref()
            .map(|p| p.acquired_price)
            .or_else(|| active_order.as_ref().map(|o| o.price));
        let current_price = quote.bid;

        let trailing_stop_loss_price = match (&position, reference, current_price) {
            (Some(held), Some(reference), Some(bid)) => {
                let carried = previous
                    .filter(|p| p.position.as_ref().map(|q| q.acquired_price) == Some(held.acquired_price))
                    .and_then(|p| p.trailing_stop_loss_price);
                let candidate = (bid > reference).then(|| bid * limits.trailing_stop);
                match (carried, candidate) {
                    (Some(a), Some(b)) => Some(a.max(b)),
                    (a, b) => a.or(b),
                }
            }
            _ => None,
        };

        Self {
            has_position: position.is_some(),
            position,
            active_order,
            quote,
            current_price,
            stop_loss_price: reference.map(|r| r * limits.stop_loss),
            take_profit_price: reference.map(|r| r * limits.take_profit),
            trailing_stop_loss_price,
        }
    }

    /// The stop a held position is protected by.
    pub fn effective_stop_loss(&self) -> Option<f64> {
        match (self.stop_loss_price, self.trailing_stop_loss_price) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn stop_loss_breached(&self) -> bool {
        matches!(
            (self.current_price, self.effective_stop_loss()),
            (Some(bid), Some(stop)) if bid < stop
        )
    }

    pub fn take_profit_reached(&self) -> bool {
        matches!(
            (self.current_price, self.take_profit_price),
            (Some(bid), Some(target)) if bid >= target
        )
    }

    /// Price of a new sell order: the bid on a stop-loss breach, otherwise
    /// the better of bid and take-profit.
    pub fn sell_price(&self) -> Option<f64> {
        let bid = self.current_price?;
        if self.stop_loss_breached() {
            return Some(bid);
        }
        Some(self.take_profit_price.map_or(bid, |target| target.max(bid)))
    }

    pub fn active_buy(&self) -> Option<&ActiveOrder> {
        self.active_order.as_ref().filter(|o| o.side == OrderSide::Buy)
    }

    pub fn active_sell(&self) -> Option<&ActiveOrder> {
        self.active_order.as_ref().filter(|o| o.side == OrderSide::Sell)
    }
}
