//! Narrow collaborator traits the domain is written against.

pub mod broker_port;
pub mod clock_port;
pub mod config_port;
pub mod market_data_port;
pub mod notifier_port;
pub mod strategy_store_port;
