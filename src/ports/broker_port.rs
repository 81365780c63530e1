//! Brokerage port.

use crate::domain::error::BrokerError;
use crate::domain::order::{AccountOverview, ActiveOrder, OrderRequest, Position, Quote};

/// Every call may fail with [`BrokerError::Transient`] on timeouts; callers
/// retry those through a [`crate::domain::retry::RetryPolicy`].
pub trait BrokerPort {
    fn get_position(&self, instrument_id: &str) -> Result<Option<Position>, BrokerError>;
    fn get_active_order(&self, instrument_id: &str) -> Result<Option<ActiveOrder>, BrokerError>;
    fn get_quote(&self, instrument_id: &str) -> Result<Quote, BrokerError>;
    /// Returns the broker's order id.
    fn place_order(&self, request: &OrderRequest) -> Result<String, BrokerError>;
    fn update_order(&self, order: &ActiveOrder, price: f64) -> Result<(), BrokerError>;
    fn cancel_order(&self, order_id: &str) -> Result<(), BrokerError>;
    fn get_account_overview(&self, account: &str) -> Result<AccountOverview, BrokerError>;
    /// Re-establish the session after a transient failure.
    fn reconnect(&self) -> Result<(), BrokerError>;
}
