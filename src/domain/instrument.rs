//! The two traded certificates and the signals that move between them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Leveraged certificate on the monitored index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Instrument {
    Bull,
    Bear,
}

impl Instrument {
    /// Fixed processing order.
    pub const ALL: [Instrument; 2] = [Instrument::Bull, Instrument::Bear];

    /// Position in [`Instrument::ALL`], for per-instrument arrays.
    pub fn index(self) -> usize {
        match self {
            Instrument::Bull => 0,
            Instrument::Bear => 1,
        }
    }

    pub fn other(self) -> Instrument {
        match self {
            Instrument::Bull => Instrument::Bear,
            Instrument::Bear => Instrument::Bull,
        }
    }

    /// +1 for BULL, -1 for BEAR.
    pub fn direction(self) -> f64 {
        match self {
            Instrument::Bull => 1.0,
            Instrument::Bear => -1.0,
        }
    }

    /// Simulated entry fill: the midpoint moved against the trade by 0.015%.
    pub fn entry_price(self, midpoint: f64) -> f64 {
        match self {
            Instrument::Bull => midpoint * 1.00015,
            Instrument::Bear => midpoint * 0.99985,
        }
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Instrument::Bull => "BULL",
            Instrument::Bear => "BEAR",
        })
    }
}

/// Composite strategy signal on the underlying index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Signal {
    Buy,
    Sell,
}

impl Signal {
    /// The instrument a signal opens. The other one is closed first.
    pub fn instrument(self) -> Instrument {
        match self {
            Signal::Buy => Instrument::Bull,
            Signal::Sell => Instrument::Bear,
        }
    }

    pub fn opposite(self) -> Signal {
        match self {
            Signal::Buy => Signal::Sell,
            Signal::Sell => Signal::Buy,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Signal::Buy => "BUY",
            Signal::Sell => "SELL",
        })
    }
}
