//! Strategy selection: filtering, ranking and short-listing of walk summaries.

use crate::domain::strategy::parse_id;
use crate::domain::summary::StrategySummary;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use tracing::{debug, warn};

/// Summaries below this point score are discarded in filter mode.
pub const MIN_POINTS: i64 = -10;
/// Filter mode keeps only profits strictly above this.
pub const MIN_PROFIT: i64 = 100;
/// Minimum share of good trades, percent.
pub const MIN_EFFICIENCY: u32 = 50;
/// The short-list keeps adding point levels until it holds more than this.
pub const SHORT_LIST_SIZE: usize = 3;

/// Label of the short-list a live session trades.
pub const SHORT_LIST_LABEL: &str = "use";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    /// Drop weak summaries, rank by (points, profit) descending.
    Filter,
    /// Keep everything, rank by profit descending.
    Adjust,
}

pub fn passes_filter(summary: &StrategySummary) -> bool {
    summary.points >= MIN_POINTS
        && summary.profit > MIN_PROFIT
        && summary.efficiency >= MIN_EFFICIENCY
}

pub fn select(mut summaries: Vec<StrategySummary>, mode: SelectionMode) -> Vec<StrategySummary> {
    let total = summaries.len();
    match mode {
        SelectionMode::Filter => {
            summaries.retain(passes_filter);
            summaries.sort_by(|a, b| b.points.cmp(&a.points).then(b.profit.cmp(&a.profit)));
        }
        SelectionMode::Adjust => summaries.sort_by(|a, b| b.profit.cmp(&a.profit)),
    }
    debug!(?mode, total, kept = summaries.len(), "strategies selected");
    summaries
}

/// Every strategy of the best point levels, level by level, until more than
/// [`SHORT_LIST_SIZE`] are collected.
pub fn short_list(ranked: &[StrategySummary]) -> Vec<StrategySummary> {
    let mut levels: Vec<i64> = ranked.iter().map(|s| s.points).collect();
    levels.sort_unstable_by(|a, b| b.cmp(a));
    levels.dedup();

    let mut top = Vec::new();
    for level in levels {
        top.extend(ranked.iter().filter(|s| s.points == level).cloned());
        if top.len() > SHORT_LIST_SIZE {
            break;
        }
    }
    top
}

/// How often one condition occurs among a set of strategies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorUsage {
    pub condition: String,
    pub count: usize,
}

impl fmt::Display for IndicatorUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.condition, self.count)
    }
}

/// Occurrences of every `(Category) NAME` across `summaries`, most used
/// first. Unparseable identifiers are skipped.
pub fn indicator_usage(summaries: &[StrategySummary]) -> Vec<IndicatorUsage> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for summary in summaries {
        match parse_id(&summary.strategy) {
            Ok(refs) => {
                for r in refs {
                    *counts.entry(format!("({}) {}", r.category, r.name)).or_default() += 1;
                }
            }
            Err(err) => warn!(strategy = %summary.strategy, error = %err, "skipping in usage statistics"),
        }
    }

    let mut usage: Vec<IndicatorUsage> = counts
        .into_iter()
        .map(|(condition, count)| IndicatorUsage { condition, count })
        .collect();
    usage.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.condition.cmp(&b.condition)));
    usage
}

/// Ranked strategy lists keyed by label (`"30d"`, `"15d"`, `"use"`), plus
/// the usage statistics of the last full calibration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrategyBook {
    #[serde(default)]
    pub lists: BTreeMap<String, Vec<StrategySummary>>,
    #[serde(default)]
    pub indicator_usage: Vec<IndicatorUsage>,
}

impl StrategyBook {
    /// The list stored under `label`, empty when absent.
    pub fn list(&self, label: &str) -> &[StrategySummary] {
        self.lists.get(label).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn ids(&self, label: &str) -> Vec<String> {
        self.list(label).iter().map(|s| s.strategy.clone()).collect()
    }

    /// Overwrite one label, leaving the others untouched.
    pub fn replace(&mut self, label: impl Into<String>, list: Vec<StrategySummary>) {
        self.lists.insert(label.into(), list);
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.lists.keys().map(String::as_str)
    }
}
