//! CSV candle file adapter.
//!
//! One file per symbol and resolution, `<base>/<symbol>_<resolution>.csv`,
//! with a header row and columns
//! `timestamp,open,high,low,close,volume` (timestamp `%Y-%m-%d %H:%M:%S`).

use crate::domain::candle::{Candle, Lookback, coalesce};
use crate::domain::error::DayTraderError;
use crate::ports::market_data_port::MarketDataPort;
use chrono::NaiveDateTime;
use std::fs;
use std::path::PathBuf;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str, resolution: &str) -> PathBuf {
        self.base_path.join(format!("{}_{}.csv", symbol, resolution))
    }
}

fn market_error(reason: impl Into<String>) -> DayTraderError {
    DayTraderError::MarketData {
        reason: reason.into(),
    }
}

fn field<T: std::str::FromStr>(
    record: &csv::StringRecord,
    index: usize,
    name: &str,
) -> Result<T, DayTraderError>
where
    T::Err: std::fmt::Display,
{
    record
        .get(index)
        .ok_or_else(|| market_error(format!("missing {} column", name)))?
        .trim()
        .parse()
        .map_err(|e| market_error(format!("invalid {} value: {}", name, e)))
}

impl MarketDataPort for CsvAdapter {
    fn get_candles(
        &self,
        symbol: &str,
        lookback: Lookback,
        resolution: &str,
    ) -> Result<Vec<Candle>, DayTraderError> {
        let path = self.csv_path(symbol, resolution);
        let content = fs::read_to_string(&path)
            .map_err(|e| market_error(format!("failed to read {}: {}", path.display(), e)))?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut candles = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| market_error(format!("CSV parse error: {}", e)))?;

            let stamp = record
                .get(0)
                .ok_or_else(|| market_error("missing timestamp column"))?;
            let timestamp = NaiveDateTime::parse_from_str(stamp.trim(), TIMESTAMP_FORMAT)
                .map_err(|e| market_error(format!("invalid timestamp '{}': {}", stamp, e)))?;

            candles.push(Candle {
                timestamp,
                open: field(&record, 1, "open")?,
                high: field(&record, 2, "high")?,
                low: field(&record, 3, "low")?,
                close: field(&record, 4, "close")?,
                volume: field(&record, 5, "volume")?,
            });
        }

        Ok(lookback.trim(coalesce(candles)))
    }
}
