//! Candle series with attached indicator columns.
//!
//! A `Frame` owns a coalesced, strictly increasing candle series and a map of
//! computed indicator columns, each exactly as long as the series. Warm-up
//! rows hold `NaN`; every comparison against `NaN` is false, so predicates
//! never fire before their indicator is defined.

use crate::domain::candle::{Candle, coalesce};
use chrono::NaiveDateTime;
use std::collections::HashMap;
use std::fmt;

/// Identity of a computed indicator column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Column {
    Ebsw,
    Pvt,
    PvtSma,
    Cmf,
    AdoscDirection,
    Massi,
    HoltWintersMid,
    BollingerLower,
    BollingerUpper,
    Rvi,
    DemaTrend,
    PsarLong,
    PsarShort,
    Alma,
    Hilo,
    Supertrend,
    LinregDirection,
    Rsi,
    Stc,
    Uo,
    Rvgi,
    RvgiSignal,
    MacdDirection,
    Bop,
    Engulfing,
    Marubozu,
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Column::Ebsw => "EBSW_40_10",
            Column::Pvt => "PVT",
            Column::PvtSma => "SMA_9",
            Column::Cmf => "CMF_20",
            Column::AdoscDirection => "ADOSC_direction",
            Column::Massi => "MASSI_9_25",
            Column::HoltWintersMid => "HWM",
            Column::BollingerLower => "BBL_20_2.0",
            Column::BollingerUpper => "BBU_20_2.0",
            Column::Rvi => "RVI_30",
            Column::DemaTrend => "2DEMA",
            Column::PsarLong => "PSARl_0.1_0.25",
            Column::PsarShort => "PSARs_0.1_0.25",
            Column::Alma => "ALMA_18_6.0_0.85",
            Column::Hilo => "HILO_11_18",
            Column::Supertrend => "SUPERT_14_6.0",
            Column::LinregDirection => "LRr_direction",
            Column::Rsi => "RSI_20",
            Column::Stc => "STC_12_14_28_0.6",
            Column::Uo => "UO_7_14_28",
            Column::Rvgi => "RVGI_14_4",
            Column::RvgiSignal => "RVGIs_14_4",
            Column::MacdDirection => "MACD_ma_diff",
            Column::Bop => "BOP",
            Column::Engulfing => "CDL_ENGULFING",
            Column::Marubozu => "CDL_MARUBOZU",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Frame {
    candles: Vec<Candle>,
    columns: HashMap<Column, Vec<f64>>,
}

impl Frame {
    /// Build a frame from raw candles; duplicates are coalesced (last wins).
    pub fn new(candles: Vec<Candle>) -> Self {
        Self {
            candles: coalesce(candles),
            columns: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn candle(&self, index: usize) -> &Candle {
        &self.candles[index]
    }

    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.close).collect()
    }

    pub fn highs(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.high).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.low).collect()
    }

    pub fn opens(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.open).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.volume as f64).collect()
    }

    /// Attach a column. Columns of the wrong length are rejected.
    pub fn insert(&mut self, column: Column, values: Vec<f64>) -> bool {
        if values.len() != self.candles.len() {
            return false;
        }
        self.columns.insert(column, values);
        true
    }

    pub fn has(&self, column: Column) -> bool {
        self.columns.contains_key(&column)
    }

    pub fn column(&self, column: Column) -> Option<&[f64]> {
        self.columns.get(&column).map(|v| v.as_slice())
    }

    pub fn column_names(&self) -> Vec<Column> {
        let mut names: Vec<Column> = self.columns.keys().copied().collect();
        names.sort();
        names
    }

    /// Value of `column` at `index`, `NaN` when absent.
    pub fn value(&self, column: Column, index: usize) -> f64 {
        self.columns
            .get(&column)
            .and_then(|values| values.get(index).copied())
            .unwrap_or(f64::NAN)
    }

    /// Drop every column not listed in `keep`.
    pub fn retain_columns(&mut self, keep: &[Column]) {
        self.columns.retain(|column, _| keep.contains(column));
    }

    pub fn row(&self, index: usize) -> Row<'_> {
        Row { frame: self, index }
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        (0..self.len()).map(move |index| self.row(index))
    }
}

/// One candle of a frame together with its indicator values.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    frame: &'a Frame,
    index: usize,
}

impl<'a> Row<'a> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn candle(&self) -> &'a Candle {
        self.frame.candle(self.index)
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.candle().timestamp
    }

    pub fn close(&self) -> f64 {
        self.candle().close
    }

    pub fn get(&self, column: Column) -> f64 {
        self.frame.value(column, self.index)
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 == self.frame.len()
    }
}
