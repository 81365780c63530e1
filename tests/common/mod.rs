#![allow(dead_code)]

use chrono::{Duration as ChronoDuration, NaiveDate, NaiveDateTime};
use daytrader::adapters::file_config_adapter::FileConfigAdapter;
use daytrader::domain::candle::{Candle, Lookback};
use daytrader::domain::error::{BrokerError, DayTraderError};
use daytrader::domain::order::{AccountOverview, ActiveOrder, OrderRequest, OrderSide, Position, Quote};
use daytrader::domain::selector::StrategyBook;
use daytrader::domain::settings::Settings;
use daytrader::ports::broker_port::BrokerPort;
use daytrader::ports::clock_port::ClockPort;
use daytrader::ports::market_data_port::MarketDataPort;
use daytrader::ports::notifier_port::NotifierPort;
use daytrader::ports::strategy_store_port::StrategyStorePort;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::time::Duration;

pub const BULL: &str = "1001";
pub const BEAR: &str = "1002";

pub const SETTINGS_INI: &str = r#"
[instruments]
monitoring = OMXS30
bull = 1001
bear = 1002
account = 42

[trading]
budget = 5000
poll_interval_secs = 60
sell_confirm_pause_secs = 1
"#;

pub fn settings() -> Settings {
    let config = FileConfigAdapter::from_string(SETTINGS_INI).unwrap();
    Settings::from_config(&config).unwrap()
}

pub fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, day)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

// ---------------------------------------------------------------------------
// Candle generators
// ---------------------------------------------------------------------------

/// One candle per minute from `start`, opening at the previous close.
pub fn minute_candles(start: NaiveDateTime, closes: &[f64]) -> Vec<Candle> {
    let mut open = closes.first().copied().unwrap_or(100.0);
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let candle = Candle {
                timestamp: start + ChronoDuration::minutes(i as i64),
                open,
                high: open.max(close) + 0.02,
                low: open.min(close) - 0.02,
                close,
                volume: 1000 + (i as i64 % 17) * 40,
            };
            open = close;
            candle
        })
        .collect()
}

/// Steadily rising full-body candles: every one a bullish marubozu.
pub fn rising_candles(start: NaiveDateTime, count: usize) -> Vec<Candle> {
    (0..count)
        .map(|i| {
            let open = 100.0 + i as f64 * 0.05;
            let close = open + 0.05;
            Candle {
                timestamp: start + ChronoDuration::minutes(i as i64),
                open,
                high: close,
                low: open,
                close,
                volume: 1000,
            }
        })
        .collect()
}

/// A wavy 09:00-17:29 session for each of `days` (day-of-month).
pub fn wavy_sessions(days: &[u32]) -> Vec<Candle> {
    let mut candles = Vec::new();
    let mut phase = 0.0_f64;
    for &day in days {
        let closes: Vec<f64> = (0..510)
            .map(|i| {
                let t = phase + i as f64;
                100.0 + 1.5 * (t / 23.0).sin() + 0.6 * (t / 7.3).sin() + 0.2 * (t / 2.1).cos()
            })
            .collect();
        phase += 510.0;
        candles.extend(minute_candles(at(day, 9, 0), &closes));
    }
    candles
}

// ---------------------------------------------------------------------------
// Market data
// ---------------------------------------------------------------------------

pub struct MockMarketData {
    pub candles: Vec<Candle>,
    pub error: Option<String>,
    pub requests: RefCell<Vec<(String, Lookback, String)>>,
}

impl MockMarketData {
    pub fn new(candles: Vec<Candle>) -> Self {
        Self {
            candles,
            error: None,
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            error: Some(reason.to_string()),
            ..Self::new(Vec::new())
        }
    }
}

impl MarketDataPort for MockMarketData {
    fn get_candles(
        &self,
        symbol: &str,
        lookback: Lookback,
        resolution: &str,
    ) -> Result<Vec<Candle>, DayTraderError> {
        self.requests
            .borrow_mut()
            .push((symbol.to_string(), lookback, resolution.to_string()));
        if let Some(reason) = &self.error {
            return Err(DayTraderError::MarketData {
                reason: reason.clone(),
            });
        }
        Ok(lookback.trim(self.candles.clone()))
    }
}

// ---------------------------------------------------------------------------
// Broker
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum BrokerCall {
    Place(OrderRequest),
    Update { order_id: String, price: f64 },
    Cancel(String),
    Reconnect,
}

#[derive(Default)]
pub struct MockBroker {
    pub positions: RefCell<HashMap<String, Position>>,
    pub orders: RefCell<HashMap<String, ActiveOrder>>,
    pub quotes: RefCell<HashMap<String, Quote>>,
    pub overview: Cell<AccountOverview>,
    /// Sell orders fill at once, clearing the position.
    pub fill_sells: Cell<bool>,
    /// The next n `get_position` calls time out.
    pub transient_failures: Cell<u32>,
    pub fatal: RefCell<Option<String>>,
    pub calls: RefCell<Vec<BrokerCall>>,
    next_order: Cell<u32>,
}

impl MockBroker {
    pub fn new() -> Self {
        let broker = Self::default();
        broker.overview.set(AccountOverview {
            buying_power: 10_000.0,
            own_capital: 10_000.0,
        });
        broker
    }

    pub fn with_position(self, instrument_id: &str, volume: i64, acquired_price: f64) -> Self {
        self.positions.borrow_mut().insert(
            instrument_id.to_string(),
            Position {
                instrument_id: instrument_id.to_string(),
                volume,
                acquired_price,
            },
        );
        self
    }

    pub fn with_order(self, instrument_id: &str, side: OrderSide, price: f64, volume: i64) -> Self {
        self.orders.borrow_mut().insert(
            instrument_id.to_string(),
            ActiveOrder {
                id: format!("existing-{instrument_id}"),
                instrument_id: instrument_id.to_string(),
                side,
                price,
                volume,
            },
        );
        self
    }

    pub fn with_quote(self, instrument_id: &str, bid: f64, ask: f64) -> Self {
        self.quotes
            .borrow_mut()
            .insert(instrument_id.to_string(), Quote::new(bid, ask));
        self
    }

    pub fn calls(&self) -> Vec<BrokerCall> {
        self.calls.borrow().clone()
    }

    pub fn placed(&self) -> Vec<OrderRequest> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                BrokerCall::Place(request) => Some(request),
                _ => None,
            })
            .collect()
    }

    fn check_fatal(&self) -> Result<(), BrokerError> {
        match self.fatal.borrow().as_ref() {
            Some(reason) => Err(BrokerError::Fatal {
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl BrokerPort for MockBroker {
    fn get_position(&self, instrument_id: &str) -> Result<Option<Position>, BrokerError> {
        self.check_fatal()?;
        let failures = self.transient_failures.get();
        if failures > 0 {
            self.transient_failures.set(failures - 1);
            return Err(BrokerError::Transient {
                reason: "timeout".into(),
            });
        }
        Ok(self.positions.borrow().get(instrument_id).cloned())
    }

    fn get_active_order(&self, instrument_id: &str) -> Result<Option<ActiveOrder>, BrokerError> {
        self.check_fatal()?;
        Ok(self.orders.borrow().get(instrument_id).cloned())
    }

    fn get_quote(&self, instrument_id: &str) -> Result<Quote, BrokerError> {
        self.check_fatal()?;
        Ok(self
            .quotes
            .borrow()
            .get(instrument_id)
            .copied()
            .unwrap_or_default())
    }

    fn place_order(&self, request: &OrderRequest) -> Result<String, BrokerError> {
        self.check_fatal()?;
        self.calls.borrow_mut().push(BrokerCall::Place(request.clone()));
        let id = format!("order-{}", self.next_order.get());
        self.next_order.set(self.next_order.get() + 1);

        if request.side == OrderSide::Sell && self.fill_sells.get() {
            self.positions.borrow_mut().remove(&request.instrument_id);
        } else {
            self.orders.borrow_mut().insert(
                request.instrument_id.clone(),
                ActiveOrder {
                    id: id.clone(),
                    instrument_id: request.instrument_id.clone(),
                    side: request.side,
                    price: request.price,
                    volume: request.volume,
                },
            );
        }
        Ok(id)
    }

    fn update_order(&self, order: &ActiveOrder, price: f64) -> Result<(), BrokerError> {
        self.check_fatal()?;
        self.calls.borrow_mut().push(BrokerCall::Update {
            order_id: order.id.clone(),
            price,
        });
        if order.side == OrderSide::Sell && self.fill_sells.get() {
            self.positions.borrow_mut().remove(&order.instrument_id);
            self.orders.borrow_mut().remove(&order.instrument_id);
        } else if let Some(stored) = self.orders.borrow_mut().get_mut(&order.instrument_id) {
            stored.price = price;
        }
        Ok(())
    }

    fn cancel_order(&self, order_id: &str) -> Result<(), BrokerError> {
        self.check_fatal()?;
        self.calls.borrow_mut().push(BrokerCall::Cancel(order_id.to_string()));
        self.orders.borrow_mut().retain(|_, order| order.id != order_id);
        Ok(())
    }

    fn get_account_overview(&self, _account: &str) -> Result<AccountOverview, BrokerError> {
        self.check_fatal()?;
        Ok(self.overview.get())
    }

    fn reconnect(&self) -> Result<(), BrokerError> {
        self.calls.borrow_mut().push(BrokerCall::Reconnect);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Store, notifier, clock
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryStore {
    pub book: RefCell<StrategyBook>,
    pub saves: Cell<u32>,
}

impl MemoryStore {
    pub fn with_book(book: StrategyBook) -> Self {
        Self {
            book: RefCell::new(book),
            saves: Cell::new(0),
        }
    }

    pub fn book(&self) -> StrategyBook {
        self.book.borrow().clone()
    }
}

impl StrategyStorePort for MemoryStore {
    fn load(&self) -> Result<StrategyBook, DayTraderError> {
        Ok(self.book.borrow().clone())
    }

    fn save(&self, book: &StrategyBook) -> Result<(), DayTraderError> {
        *self.book.borrow_mut() = book.clone();
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub messages: RefCell<Vec<String>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }
}

impl NotifierPort for RecordingNotifier {
    fn notify(&self, message: &str) {
        self.messages.borrow_mut().push(message.to_string());
    }
}

/// A clock that only moves when slept on.
pub struct FakeClock {
    pub now: Cell<NaiveDateTime>,
    pub sleeps: RefCell<Vec<Duration>>,
}

impl FakeClock {
    pub fn at(now: NaiveDateTime) -> Self {
        Self {
            now: Cell::new(now),
            sleeps: RefCell::new(Vec::new()),
        }
    }
}

impl ClockPort for FakeClock {
    fn now(&self) -> NaiveDateTime {
        self.now.get()
    }

    fn sleep(&self, duration: Duration) {
        self.sleeps.borrow_mut().push(duration);
        let step = ChronoDuration::from_std(duration).unwrap_or_default();
        self.now.set(self.now.get() + step);
    }
}
