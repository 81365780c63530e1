//! Persistence of calibrated strategy lists.

use crate::domain::error::DayTraderError;
use crate::domain::selector::StrategyBook;

pub trait StrategyStorePort {
    /// The stored book; an absent store loads as empty.
    fn load(&self) -> Result<StrategyBook, DayTraderError>;
    /// Replace the stored book.
    fn save(&self, book: &StrategyBook) -> Result<(), DayTraderError>;
}
