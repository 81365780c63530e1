//! Calibration runs over mock market data and an in-memory store.

mod common;

use common::*;
use daytrader::domain::calibration::Calibration;
use daytrader::domain::condition::ConditionKind;
use daytrader::domain::error::DayTraderError;
use daytrader::domain::selector::{
    SHORT_LIST_LABEL, StrategyBook, indicator_usage, passes_filter, short_list,
};
use daytrader::domain::summary::StrategySummary;

fn market() -> MockMarketData {
    MockMarketData::new(wavy_sessions(&[2, 3, 6]))
}

fn seeded(label: &str, ids: &[&str]) -> StrategyBook {
    let mut book = StrategyBook::default();
    book.replace(
        label,
        ids.iter().map(|id| StrategySummary::empty(*id)).collect(),
    );
    book
}

const IDS: [&str; 4] = [
    "(Volatility) BBANDS + (Trend) PSAR + (Momentum) RSI",
    "(Trend) 2DEMA + (Overlap) ALMA + (Volume) CMF",
    "(Candle) ENGULFING + (Momentum) MACD + (Cycles) EBSW",
    "(Volatility) HWC + (Overlap) SUPERT + (Momentum) STC",
];

#[test]
fn update_stores_filtered_ranking_and_usage() {
    let settings = settings();
    let market = market();
    let store = MemoryStore::with_book(seeded("keep", &["x"]));

    let selected = Calibration::new(&settings, &market, &store).update().unwrap();

    let book = store.book();
    let ranked = book.list("30d");
    assert_eq!(ranked.len(), selected.len());
    assert!(ranked.iter().all(passes_filter));
    assert!(ranked.windows(2).all(|w| (w[0].points, w[0].profit) >= (w[1].points, w[1].profit)));
    assert_eq!(book.indicator_usage, indicator_usage(ranked));
    assert_eq!(book.ids("keep"), vec!["x".to_string()]);
    assert_eq!(store.saves.get(), 1);

    let requests = market.requests.borrow();
    assert_eq!(requests[0].0, "OMXS30");
    assert_eq!(requests[0].1.to_string(), "30d");
    assert_eq!(requests[0].2, "1m");
}

#[test]
fn test_run_writes_its_list_and_the_short_list() {
    let settings = settings();
    let market = market();
    let store = MemoryStore::with_book(seeded("30d", &IDS));

    let selected = Calibration::new(&settings, &market, &store).test().unwrap();

    let book = store.book();
    let tested = book.list("15d");
    assert!(tested.iter().all(passes_filter));
    assert!(tested.iter().all(|s| IDS.contains(&s.strategy.as_str())));
    assert_eq!(book.list(SHORT_LIST_LABEL), short_list(tested).as_slice());
    assert_eq!(
        selected.iter().map(|s| s.summary.strategy.clone()).collect::<Vec<_>>(),
        book.ids(SHORT_LIST_LABEL)
    );
    // The long list is left as it was.
    assert_eq!(book.list("30d"), seeded("30d", &IDS).list("30d"));
}

#[test]
fn adjust_reranks_short_list_by_profit() {
    let settings = settings();
    let market = market();
    let mut book = seeded(SHORT_LIST_LABEL, &IDS);
    book.replace("15d", vec![StrategySummary::empty(IDS[0])]);
    let store = MemoryStore::with_book(book);

    Calibration::new(&settings, &market, &store).adjust().unwrap();

    let book = store.book();
    let adjusted = book.list(SHORT_LIST_LABEL);
    assert!(!adjusted.is_empty());
    assert!(adjusted.len() <= IDS.len());
    assert!(adjusted.iter().all(|s| IDS.contains(&s.strategy.as_str())));
    assert!(adjusted.windows(2).all(|w| w[0].profit >= w[1].profit));
    assert_eq!(book.ids("15d"), vec![IDS[0].to_string()]);
    assert_eq!(market.requests.borrow()[0].1.to_string(), "1d");
}

#[test]
fn unknown_stored_ids_are_dropped() {
    let settings = settings();
    let market = market();
    let store = MemoryStore::with_book(seeded(
        SHORT_LIST_LABEL,
        &[IDS[0], "(Trend) NOPE + (Momentum) RSI + (Volume) CMF", "garbage"],
    ));

    Calibration::new(&settings, &market, &store).adjust().unwrap();

    assert_eq!(store.book().ids(SHORT_LIST_LABEL), vec![IDS[0].to_string()]);
}

#[test]
fn empty_history_is_an_error() {
    let settings = settings();
    let market = MockMarketData::new(Vec::new());
    let store = MemoryStore::default();

    let result = Calibration::new(&settings, &market, &store).update();

    assert!(matches!(result, Err(DayTraderError::NoData { .. })));
    assert_eq!(store.saves.get(), 0);
}

#[test]
fn market_failure_propagates() {
    let settings = settings();
    let market = MockMarketData::failing("provider down");
    let store = MemoryStore::default();

    let result = Calibration::new(&settings, &market, &store).test();
    assert!(matches!(result, Err(DayTraderError::MarketData { .. })));
}

#[test]
fn conditions_are_listed_for_a_window() {
    let settings = settings();
    let market = market();
    let store = MemoryStore::default();

    let set = Calibration::new(&settings, &market, &store)
        .conditions("30d".parse().unwrap())
        .unwrap();
    assert!(set.contains(ConditionKind::Rsi));
    assert!(set.contains(ConditionKind::Bbands));
    assert!(set.len() <= ConditionKind::ALL.len());
}
