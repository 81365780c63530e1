//! Condition library.
//!
//! Every condition is a pair of fixed-threshold predicates over one frame
//! row. The catalog is a closed enum ([`ConditionKind`]); building a
//! [`ConditionSet`] computes the indicator columns a kind depends on and
//! registers the kind only when its indicator produced a value for the
//! frame's window. Columns that no registered condition reads are pruned.

use crate::domain::frame::{Column, Frame, Row};
use crate::domain::indicator::{
    Series, bollinger, candle_pattern, cycle, macd, moving_average, oscillator, rising, rsi,
    trend, volatility, volume,
};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Indicator family. Strategies combine conditions of distinct categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Volatility,
    Trend,
    Candle,
    Overlap,
    Momentum,
    Volume,
    Cycles,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Volatility,
        Category::Trend,
        Category::Candle,
        Category::Overlap,
        Category::Momentum,
        Category::Volume,
        Category::Cycles,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Category::Volatility => "Volatility",
            Category::Trend => "Trend",
            Category::Candle => "Candle",
            Category::Overlap => "Overlap",
            Category::Momentum => "Momentum",
            Category::Volume => "Volume",
            Category::Cycles => "Cycles",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or_else(|| format!("unknown category '{s}'"))
    }
}

const MASSI_BAND: (f64, f64) = (26.0, 27.0);
const NEUTRAL_LEVEL: f64 = 50.0;
const STC_BUY_BELOW: f64 = 75.0;
const STC_SELL_ABOVE: f64 = 25.0;
const UO_OVERSOLD: f64 = 30.0;
const UO_OVERBOUGHT: f64 = 70.0;
const BOP_LEVEL: f64 = 0.25;
const CMF_LEVEL: f64 = 0.05;
const EBSW_LEVEL: f64 = 0.5;
const ALMA_PERIOD: usize = 18;
const ALMA_SIGMA: f64 = 6.0;
const ALMA_OFFSET: f64 = 0.85;
const HILO_HIGH: usize = 11;
const HILO_LOW: usize = 18;
const SUPERTREND_PERIOD: usize = 14;
const SUPERTREND_MULTIPLIER: f64 = 6.0;
const DEMA_FAST: usize = 20;
const DEMA_SLOW: usize = 30;
const RVGI_PERIOD: usize = 14;
const UO_PERIODS: (usize, usize, usize) = (7, 14, 28);

/// The closed catalog of conditions, in enumeration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConditionKind {
    Massi,
    Hwc,
    Bbands,
    Rvi,
    Dema,
    Psar,
    Engulfing,
    Marubozu,
    Alma,
    Ghla,
    Supertrend,
    Linreg,
    Rsi,
    Stc,
    Uo,
    Rvgi,
    Macd,
    Bop,
    Pvt,
    Cmf,
    Adosc,
    Ebsw,
}

impl ConditionKind {
    pub const ALL: [ConditionKind; 22] = [
        ConditionKind::Massi,
        ConditionKind::Hwc,
        ConditionKind::Bbands,
        ConditionKind::Rvi,
        ConditionKind::Dema,
        ConditionKind::Psar,
        ConditionKind::Engulfing,
        ConditionKind::Marubozu,
        ConditionKind::Alma,
        ConditionKind::Ghla,
        ConditionKind::Supertrend,
        ConditionKind::Linreg,
        ConditionKind::Rsi,
        ConditionKind::Stc,
        ConditionKind::Uo,
        ConditionKind::Rvgi,
        ConditionKind::Macd,
        ConditionKind::Bop,
        ConditionKind::Pvt,
        ConditionKind::Cmf,
        ConditionKind::Adosc,
        ConditionKind::Ebsw,
    ];

    pub fn category(self) -> Category {
        use ConditionKind::*;
        match self {
            Massi | Hwc | Bbands | Rvi => Category::Volatility,
            Dema | Psar => Category::Trend,
            Engulfing | Marubozu => Category::Candle,
            Alma | Ghla | Supertrend | Linreg => Category::Overlap,
            Rsi | Stc | Uo | Rvgi | Macd | Bop => Category::Momentum,
            Pvt | Cmf | Adosc => Category::Volume,
            Ebsw => Category::Cycles,
        }
    }

    pub fn name(self) -> &'static str {
        use ConditionKind::*;
        match self {
            Massi => "MASSI",
            Hwc => "HWC",
            Bbands => "BBANDS",
            Rvi => "RVI",
            Dema => "2DEMA",
            Psar => "PSAR",
            Engulfing => "ENGULFING",
            Marubozu => "MARUBOZU",
            Alma => "ALMA",
            Ghla => "GHLA",
            Supertrend => "SUPERT",
            Linreg => "LINREG",
            Rsi => "RSI",
            Stc => "STC",
            Uo => "UO",
            Rvgi => "RVGI",
            Macd => "MACD",
            Bop => "BOP",
            Pvt => "PVT",
            Cmf => "CMF",
            Adosc => "ADOSC",
            Ebsw => "EBSW",
        }
    }

    /// Look a kind up by its persisted `(category, name)` pair.
    pub fn lookup(category: Category, name: &str) -> Option<ConditionKind> {
        ConditionKind::ALL
            .into_iter()
            .find(|k| k.category() == category && k.name() == name)
    }

    /// Columns read by the predicates.
    pub fn columns(self) -> &'static [Column] {
        use ConditionKind::*;
        match self {
            Massi => &[Column::Massi],
            Hwc => &[Column::HoltWintersMid],
            Bbands => &[Column::BollingerLower, Column::BollingerUpper],
            Rvi => &[Column::Rvi],
            Dema => &[Column::DemaTrend],
            Psar => &[Column::PsarLong, Column::PsarShort],
            Engulfing => &[Column::Engulfing],
            Marubozu => &[Column::Marubozu],
            Alma => &[Column::Alma],
            Ghla => &[Column::Hilo],
            Supertrend => &[Column::Supertrend],
            Linreg => &[Column::LinregDirection],
            Rsi => &[Column::Rsi],
            Stc => &[Column::Stc],
            Uo => &[Column::Uo],
            Rvgi => &[Column::Rvgi, Column::RvgiSignal],
            Macd => &[Column::MacdDirection],
            Bop => &[Column::Bop],
            Pvt => &[Column::Pvt, Column::PvtSma],
            Cmf => &[Column::Cmf],
            Adosc => &[Column::AdoscDirection],
            Ebsw => &[Column::Ebsw],
        }
    }

    /// Compute the indicator columns for `frame`. `None` when the indicator
    /// has no defined value for this window.
    fn compute(self, frame: &Frame) -> Option<Vec<(Column, Series)>> {
        use ConditionKind::*;
        let candles = frame.candles();
        let closes = frame.closes();
        let columns = match self {
            Massi => vec![(
                Column::Massi,
                volatility::calculate_massi(candles, volatility::MASSI_FAST, volatility::MASSI_SLOW)?,
            )],
            Hwc => vec![(
                Column::HoltWintersMid,
                volatility::calculate_hwc_mid(&closes, volatility::HoltWinters::default())?,
            )],
            Bbands => {
                let bands = bollinger::calculate_bollinger(
                    &closes,
                    bollinger::DEFAULT_PERIOD,
                    bollinger::DEFAULT_MULTIPLIER,
                )?;
                vec![
                    (Column::BollingerLower, bands.lower),
                    (Column::BollingerUpper, bands.upper),
                ]
            }
            Rvi => vec![(
                Column::Rvi,
                volatility::calculate_rvi(&closes, volatility::RVI_PERIOD)?,
            )],
            Dema => vec![(
                Column::DemaTrend,
                moving_average::dema_trend(&closes, DEMA_FAST, DEMA_SLOW)?,
            )],
            Psar => {
                let psar = trend::calculate_psar(candles, trend::PSAR_STEP, trend::PSAR_MAX_STEP)?;
                vec![(Column::PsarLong, psar.long), (Column::PsarShort, psar.short)]
            }
            Engulfing => vec![(Column::Engulfing, candle_pattern::engulfing(candles)?)],
            Marubozu => vec![(
                Column::Marubozu,
                candle_pattern::marubozu(candles, candle_pattern::MARUBOZU_BODY_RATIO)?,
            )],
            Alma => vec![(
                Column::Alma,
                moving_average::alma(&closes, ALMA_PERIOD, ALMA_SIGMA, ALMA_OFFSET)?,
            )],
            Ghla => vec![(
                Column::Hilo,
                trend::calculate_hilo(candles, HILO_HIGH, HILO_LOW)?,
            )],
            Supertrend => vec![(
                Column::Supertrend,
                trend::calculate_supertrend(candles, SUPERTREND_PERIOD, SUPERTREND_MULTIPLIER)?,
            )],
            Linreg => vec![(
                Column::LinregDirection,
                cycle::linreg_direction(&closes, cycle::LINREG_PERIOD)?,
            )],
            Rsi => vec![(Column::Rsi, rsi::calculate_rsi(&closes, rsi::DEFAULT_PERIOD)?)],
            Stc => vec![(
                Column::Stc,
                oscillator::calculate_stc(&closes, oscillator::StcParams::default())?,
            )],
            Uo => {
                let (fast, medium, slow) = UO_PERIODS;
                vec![(Column::Uo, oscillator::calculate_uo(candles, fast, medium, slow)?)]
            }
            Rvgi => {
                let rvgi = oscillator::calculate_rvgi(candles, RVGI_PERIOD)?;
                vec![(Column::Rvgi, rvgi.rvgi), (Column::RvgiSignal, rvgi.signal)]
            }
            Macd => {
                let macd = macd::calculate_macd_default(&closes)?;
                vec![(Column::MacdDirection, rising(&macd.histogram))]
            }
            Bop => vec![(Column::Bop, oscillator::calculate_bop(candles)?)],
            Pvt => {
                let pvt = volume::calculate_pvt(candles, volume::PVT_SIGNAL_PERIOD)?;
                vec![(Column::Pvt, pvt.pvt), (Column::PvtSma, pvt.signal)]
            }
            Cmf => vec![(Column::Cmf, volume::calculate_cmf(candles, volume::CMF_PERIOD)?)],
            Adosc => vec![(
                Column::AdoscDirection,
                volume::adosc_direction(candles, volume::ADOSC_FAST, volume::ADOSC_SLOW)?,
            )],
            Ebsw => vec![(
                Column::Ebsw,
                cycle::calculate_ebsw(&closes, cycle::EBSW_PERIOD, cycle::EBSW_BARS)?,
            )],
        };
        Some(columns)
    }

    pub fn buy(self, row: &Row<'_>) -> bool {
        use ConditionKind::*;
        let close = row.close();
        match self {
            Massi => in_band(row.get(Column::Massi), MASSI_BAND),
            Hwc => close > row.get(Column::HoltWintersMid),
            Bbands => close > row.get(Column::BollingerLower),
            Rvi => row.get(Column::Rvi) > NEUTRAL_LEVEL,
            Dema => row.get(Column::DemaTrend) > 0.0,
            Psar => close > row.get(Column::PsarLong),
            Engulfing => row.get(Column::Engulfing) > 0.0,
            Marubozu => row.get(Column::Marubozu) > 0.0,
            Alma => close > row.get(Column::Alma),
            Ghla => close > row.get(Column::Hilo),
            Supertrend => close > row.get(Column::Supertrend),
            Linreg => row.get(Column::LinregDirection) > 0.5,
            Rsi => row.get(Column::Rsi) > NEUTRAL_LEVEL,
            Stc => row.get(Column::Stc) < STC_BUY_BELOW,
            Uo => row.get(Column::Uo) < UO_OVERSOLD,
            Rvgi => row.get(Column::Rvgi) > row.get(Column::RvgiSignal),
            Macd => row.get(Column::MacdDirection) > 0.5,
            Bop => row.get(Column::Bop) < -BOP_LEVEL,
            Pvt => row.get(Column::PvtSma) < row.get(Column::Pvt),
            Cmf => row.get(Column::Cmf) > CMF_LEVEL,
            Adosc => row.get(Column::AdoscDirection) > 0.5,
            Ebsw => row.get(Column::Ebsw) > EBSW_LEVEL,
        }
    }

    pub fn sell(self, row: &Row<'_>) -> bool {
        use ConditionKind::*;
        let close = row.close();
        match self {
            Massi => in_band(row.get(Column::Massi), MASSI_BAND),
            Hwc => close < row.get(Column::HoltWintersMid),
            Bbands => close < row.get(Column::BollingerUpper),
            Rvi => row.get(Column::Rvi) < NEUTRAL_LEVEL,
            Dema => row.get(Column::DemaTrend) < 0.0,
            Psar => close < row.get(Column::PsarShort),
            Engulfing => row.get(Column::Engulfing) < 0.0,
            Marubozu => row.get(Column::Marubozu) < 0.0,
            Alma => close < row.get(Column::Alma),
            Ghla => close < row.get(Column::Hilo),
            Supertrend => close < row.get(Column::Supertrend),
            Linreg => row.get(Column::LinregDirection) < 0.5,
            Rsi => row.get(Column::Rsi) < NEUTRAL_LEVEL,
            Stc => row.get(Column::Stc) > STC_SELL_ABOVE,
            Uo => row.get(Column::Uo) > UO_OVERBOUGHT,
            Rvgi => row.get(Column::Rvgi) < row.get(Column::RvgiSignal),
            Macd => row.get(Column::MacdDirection) < 0.5,
            Bop => row.get(Column::Bop) > BOP_LEVEL,
            Pvt => row.get(Column::PvtSma) > row.get(Column::Pvt),
            Cmf => row.get(Column::Cmf) < -CMF_LEVEL,
            Adosc => row.get(Column::AdoscDirection) < 0.5,
            Ebsw => row.get(Column::Ebsw) < -EBSW_LEVEL,
        }
    }
}

fn in_band(value: f64, (low, high): (f64, f64)) -> bool {
    value > low && value < high
}

impl fmt::Display for ConditionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}) {}", self.category(), self.name())
    }
}

/// One registered buy/sell predicate pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Condition {
    kind: ConditionKind,
}

impl Condition {
    pub fn kind(&self) -> ConditionKind {
        self.kind
    }

    pub fn category(&self) -> Category {
        self.kind.category()
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn buy(&self, row: &Row<'_>) -> bool {
        self.kind.buy(row)
    }

    pub fn sell(&self, row: &Row<'_>) -> bool {
        self.kind.sell(row)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind.fmt(f)
    }
}

/// Conditions available for one frame, in catalog order.
#[derive(Debug, Clone, Default)]
pub struct ConditionSet {
    conditions: Vec<Condition>,
}

impl ConditionSet {
    /// Compute every catalog indicator on `frame` and register the
    /// conditions whose indicator is defined for the window.
    pub fn build(frame: &mut Frame) -> ConditionSet {
        Self::build_only(frame, &ConditionKind::ALL)
    }

    /// Like [`ConditionSet::build`], restricted to `kinds`.
    pub fn build_only(frame: &mut Frame, kinds: &[ConditionKind]) -> ConditionSet {
        let mut conditions = Vec::new();
        for kind in ConditionKind::ALL.into_iter().filter(|k| kinds.contains(k)) {
            let Some(columns) = kind.compute(frame) else {
                debug!(condition = %kind, candles = frame.len(), "indicator not available");
                continue;
            };
            if columns.into_iter().all(|(column, values)| frame.insert(column, values)) {
                conditions.push(Condition { kind });
            }
        }

        let set = ConditionSet { conditions };
        set.prune(frame);
        debug!(registered = set.len(), candles = frame.len(), "condition set built");
        set
    }

    /// Drop every frame column no registered condition reads.
    fn prune(&self, frame: &mut Frame) {
        let keep: Vec<Column> = self
            .conditions
            .iter()
            .flat_map(|c| c.kind.columns().iter().copied())
            .collect();
        frame.retain_columns(&keep);
    }

    /// A set registering `kinds` without computing anything.
    pub fn from_kinds(kinds: &[ConditionKind]) -> ConditionSet {
        ConditionSet {
            conditions: ConditionKind::ALL
                .into_iter()
                .filter(|k| kinds.contains(k))
                .map(|kind| Condition { kind })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Condition> {
        self.conditions.iter()
    }

    pub fn as_slice(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn get(&self, category: Category, name: &str) -> Option<Condition> {
        self.conditions
            .iter()
            .copied()
            .find(|c| c.category() == category && c.name() == name)
    }

    pub fn contains(&self, kind: ConditionKind) -> bool {
        self.conditions.iter().any(|c| c.kind == kind)
    }
}
