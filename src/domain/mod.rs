//! Core domain types and logic.

pub mod calibration;
pub mod candle;
pub mod condition;
pub mod config_validation;
pub mod error;
pub mod frame;
pub mod indicator;
pub mod instrument;
pub mod instrument_status;
pub mod live_signal;
pub mod order;
pub mod retry;
pub mod selector;
pub mod session;
pub mod settings;
pub mod strategy;
pub mod summary;
pub mod trader;
pub mod walker;
