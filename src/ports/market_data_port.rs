//! Candle history port.

use crate::domain::candle::{Candle, Lookback};
use crate::domain::error::DayTraderError;

pub trait MarketDataPort {
    /// Candles of `symbol` covering `lookback` at `resolution` (e.g. `"1m"`),
    /// oldest first. Duplicate timestamps may be returned; callers coalesce.
    fn get_candles(
        &self,
        symbol: &str,
        lookback: Lookback,
        resolution: &str,
    ) -> Result<Vec<Candle>, DayTraderError>;
}
