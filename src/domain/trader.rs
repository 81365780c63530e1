//! Live trading state machine.
//!
//! One [`TradingSession`] owns all mutable session state: the day clock,
//! the per-instrument status, the live signal source and the statistics.
//! Each tick refreshes broker state and walks BULL then BEAR: the buy
//! action (outside the evening) followed by the sell action.

use crate::domain::error::{BrokerError, DayTraderError};
use crate::domain::instrument::Instrument;
use crate::domain::instrument_status::InstrumentStatus;
use crate::domain::live_signal::LiveSignalSource;
use crate::domain::order::{AccountOverview, ActiveOrder, OrderRequest, OrderSide, Quote};
use crate::domain::session::{DayClock, DayPhase};
use crate::domain::settings::Settings;
use crate::domain::walker::LastSignal;
use crate::ports::broker_port::BrokerPort;
use crate::ports::clock_port::ClockPort;
use crate::ports::market_data_port::MarketDataPort;
use crate::ports::notifier_port::NotifierPort;
use std::fmt;
use tracing::{error, info, warn};

/// Budget granularity of the float-up rule.
const BUDGET_STEP: f64 = 1000.0;

/// The collaborators a session drives.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    pub broker: &'a dyn BrokerPort,
    pub market: &'a dyn MarketDataPort,
    pub clock: &'a dyn ClockPort,
    pub notifier: &'a dyn NotifierPort,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionStats {
    pub balance_before: f64,
    pub balance_after: f64,
    pub budget: f64,
    pub errors: u32,
    /// Buy orders placed.
    pub trades: u32,
}

impl fmt::Display for SessionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Day trading finished")?;
        writeln!(
            f,
            "balance: {:.2} -> {:.2} ({:+.2})",
            self.balance_before,
            self.balance_after,
            self.balance_after - self.balance_before
        )?;
        writeln!(f, "budget: {:.0}", self.budget)?;
        writeln!(f, "trades: {}", self.trades)?;
        write!(f, "errors: {}", self.errors)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing to do in this phase.
    Idle,
    Traded,
    /// Night reached; the session is over.
    Finished,
}

/// `max(budget, (own_capital // 1000 - 1) * 1000)`.
pub fn floated_budget(budget: f64, own_capital: f64) -> f64 {
    let floating = ((own_capital / BUDGET_STEP).floor() - 1.0) * BUDGET_STEP;
    budget.max(floating)
}

pub struct TradingSession<'a> {
    settings: Settings,
    ports: Collaborators<'a>,
    day: DayClock,
    signals: LiveSignalSource,
    status: [InstrumentStatus; 2],
    stats: SessionStats,
}

impl<'a> TradingSession<'a> {
    pub fn new(settings: Settings, ports: Collaborators<'a>, strategy_ids: Vec<String>) -> Self {
        let signals = LiveSignalSource::new(
            strategy_ids,
            settings.instruments.monitoring.clone(),
            settings.calibration.resolution.clone(),
            settings.trading.max_candle_age,
        );
        let stats = SessionStats {
            budget: settings.trading.budget,
            ..SessionStats::default()
        };
        Self {
            day: DayClock::new(settings.session),
            settings,
            ports,
            signals,
            status: Default::default(),
            stats,
        }
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn phase(&self) -> DayPhase {
        self.day.phase()
    }

    pub fn status(&self, instrument: Instrument) -> &InstrumentStatus {
        &self.status[instrument.index()]
    }

    /// Run until night, then report. Any unrecoverable error is reported as
    /// a crash and ends the session.
    pub fn run(&mut self) -> Result<SessionStats, DayTraderError> {
        match self.run_until_night() {
            Ok(stats) => {
                self.ports.notifier.notify(&stats.to_string());
                Ok(stats)
            }
            Err(err) => {
                error!(error = %err, "trading session crashed");
                self.ports
                    .notifier
                    .notify(&format!("Day trading crashed: {err}"));
                Err(err)
            }
        }
    }

    fn run_until_night(&mut self) -> Result<SessionStats, DayTraderError> {
        self.start()?;
        loop {
            match self.tick() {
                Ok(TickOutcome::Finished) => break,
                Ok(_) => {}
                Err(err) if err.is_transient() => {
                    error!(error = %err, "broker connection lost, reconnecting");
                    self.stats.errors += 1;
                    let broker = self.ports.broker;
                    self.settings
                        .retry
                        .run(self.ports.clock, "reconnect", || broker.reconnect())?;
                }
                Err(err) => return Err(err.into()),
            }
            self.ports.clock.sleep(self.settings.trading.poll_interval);
        }
        self.finish()
    }

    /// Read the opening balance and float the budget up to the capital.
    pub fn start(&mut self) -> Result<(), DayTraderError> {
        let overview = self.account_overview()?;
        self.stats.balance_before = overview.buying_power;
        self.stats.budget = floated_budget(self.settings.trading.budget, overview.own_capital);
        info!(
            account = %self.settings.instruments.account,
            balance = overview.buying_power,
            budget = self.stats.budget,
            strategies = self.signals.strategy_ids().len(),
            "trading session started"
        );
        Ok(())
    }

    fn finish(&mut self) -> Result<SessionStats, DayTraderError> {
        self.stats.balance_after = self.account_overview()?.buying_power;
        info!(
            balance = self.stats.balance_after,
            trades = self.stats.trades,
            errors = self.stats.errors,
            "end of the trading day"
        );
        Ok(self.stats.clone())
    }

    fn account_overview(&self) -> Result<AccountOverview, BrokerError> {
        let broker = self.ports.broker;
        let account = self.settings.instruments.account.as_str();
        self.settings.retry.run(self.ports.clock, "account overview", || {
            broker.get_account_overview(account)
        })
    }

    /// One polling iteration.
    pub fn tick(&mut self) -> Result<TickOutcome, BrokerError> {
        let now = self.ports.clock.now();
        let phase = self.day.update(now.time());
        if phase == DayPhase::Night {
            return Ok(TickOutcome::Finished);
        }
        if !phase.is_trading() {
            return Ok(TickOutcome::Idle);
        }

        let signal = if phase.allows_buy() {
            match self.signals.evaluate(self.ports.market, phase, now) {
                Ok(signal) => signal,
                Err(err) => {
                    warn!(error = %err, "no market data this tick");
                    None
                }
            }
        } else {
            None
        };

        for instrument in Instrument::ALL {
            if phase.allows_buy() {
                self.buy_action(instrument, signal)?;
            } else {
                self.withdraw_buy(instrument)?;
            }
            self.sell_action(instrument, phase == DayPhase::Evening)?;
        }
        Ok(TickOutcome::Traded)
    }

    fn buy_action(&mut self, main: Instrument, signal: Option<LastSignal>) -> Result<(), BrokerError> {
        let status = self.refresh(main)?;
        if status.has_position {
            return Ok(());
        }
        if let Some(order) = status.active_buy() {
            match status.quote.ask {
                Some(ask) if order.price != ask => self.update(main, order, &status.quote, ask)?,
                Some(_) => {}
                None => self.quote_missing(main, "requote buy"),
            }
            return Ok(());
        }
        match signal {
            Some(signal) if signal.signal.instrument() == main => {
                self.open_with_close_opposite(main, signal)
            }
            _ => Ok(()),
        }
    }

    /// Sell the opposite instrument, wait for it to clear, then buy `main`.
    fn open_with_close_opposite(&mut self, main: Instrument, signal: LastSignal) -> Result<(), BrokerError> {
        let other = main.other();
        if self.refresh(other)?.has_position {
            info!(instrument = %other, signal = %signal, "closing opposite position");
            self.enforce_sell(other)?;
            self.ports.clock.sleep(self.settings.trading.sell_confirm_pause);
            if self.refresh(other)?.has_position {
                warn!(instrument = %other, "opposite position still open, postponing buy");
                return Ok(());
            }
        }

        if self.place_buy(main)? {
            self.signals.acknowledge(signal);
        }
        Ok(())
    }

    /// Cancel a buy order still waiting once buying has closed.
    fn withdraw_buy(&mut self, instrument: Instrument) -> Result<(), BrokerError> {
        let status = self.refresh(instrument)?;
        let Some(order) = status.active_buy().filter(|_| !status.has_position) else {
            return Ok(());
        };
        let broker = self.ports.broker;
        self.settings
            .retry
            .run(self.ports.clock, "cancel order", || broker.cancel_order(&order.id))?;
        info!(instrument = %instrument, order = %order.id, price = order.price, "buy order withdrawn");
        Ok(())
    }

    fn sell_action(&mut self, instrument: Instrument, enforced: bool) -> Result<(), BrokerError> {
        let status = self.refresh(instrument)?;
        if !status.has_position {
            return Ok(());
        }
        if enforced {
            return self.enforce_sell(instrument);
        }

        match status.active_sell() {
            None => match status.sell_price() {
                Some(price) => self.place_sell(instrument, &status, price)?,
                None => self.quote_missing(instrument, "place sell"),
            },
            Some(order) => {
                let exit = status.stop_loss_breached() || status.take_profit_reached();
                if let (true, Some(bid)) = (exit, status.current_price) {
                    if order.price != bid {
                        self.update(instrument, order, &status.quote, bid)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Get out at the bid: re-price the open sell order or place one.
    fn enforce_sell(&mut self, instrument: Instrument) -> Result<(), BrokerError> {
        let status = self.status[instrument.index()].clone();
        let Some(bid) = status.current_price else {
            self.quote_missing(instrument, "enforce sell");
            return Ok(());
        };
        match status.active_sell() {
            Some(order) if order.price == bid => Ok(()),
            Some(order) => self.update(instrument, order, &status.quote, bid),
            None => self.place_sell(instrument, &status, bid),
        }
    }

    fn place_buy(&mut self, instrument: Instrument) -> Result<bool, BrokerError> {
        let status = self.status[instrument.index()].clone();
        if !self.spread_allows(instrument, &status.quote, "place buy") {
            return Ok(false);
        }
        let Some(ask) = status.quote.ask.filter(|&ask| ask > 0.0) else {
            self.quote_missing(instrument, "place buy");
            return Ok(false);
        };
        let volume = (self.stats.budget / ask).floor() as i64;
        if volume < 1 {
            warn!(instrument = %instrument, ask, budget = self.stats.budget, "budget below one unit");
            return Ok(false);
        }

        self.place(instrument, OrderSide::Buy, ask, volume)?;
        self.stats.trades += 1;
        Ok(true)
    }

    fn place_sell(&mut self, instrument: Instrument, status: &InstrumentStatus, price: f64) -> Result<(), BrokerError> {
        let Some(volume) = status.position.as_ref().map(|p| p.volume) else {
            return Ok(());
        };
        if !self.spread_allows(instrument, &status.quote, "place sell") {
            return Ok(());
        }
        self.place(instrument, OrderSide::Sell, price, volume)
    }

    fn place(&mut self, instrument: Instrument, side: OrderSide, price: f64, volume: i64) -> Result<(), BrokerError> {
        let request = OrderRequest {
            account: self.settings.instruments.account.clone(),
            instrument_id: self.settings.instruments.id(instrument).to_string(),
            side,
            price,
            volume,
            valid_until: self.ports.clock.now().date(),
        };
        let broker = self.ports.broker;
        let id = self
            .settings
            .retry
            .run(self.ports.clock, "place order", || broker.place_order(&request))?;
        info!(instrument = %instrument, %side, price, volume, order = %id, "order placed");
        Ok(())
    }

    fn update(&mut self, instrument: Instrument, order: &ActiveOrder, quote: &Quote, price: f64) -> Result<(), BrokerError> {
        if !self.spread_allows(instrument, quote, "update order") {
            return Ok(());
        }
        let broker = self.ports.broker;
        self.settings
            .retry
            .run(self.ports.clock, "update order", || broker.update_order(order, price))?;
        info!(
            instrument = %instrument,
            side = %order.side,
            from = order.price,
            to = price,
            "order updated"
        );
        Ok(())
    }

    /// Spread guard. A blocked action counts one error.
    fn spread_allows(&mut self, instrument: Instrument, quote: &Quote, action: &str) -> bool {
        let limit = if self.day.phase() == DayPhase::Evening {
            self.settings.trading.max_spread_evening
        } else {
            self.settings.trading.max_spread
        };
        match quote.spread {
            Some(spread) if spread <= limit => true,
            spread => {
                self.stats.errors += 1;
                error!(instrument = %instrument, action, ?spread, limit, "spread too wide");
                false
            }
        }
    }

    /// An action with no usable price is blocked like a wide spread.
    fn quote_missing(&mut self, instrument: Instrument, action: &str) {
        self.stats.errors += 1;
        error!(instrument = %instrument, action, "no quote");
    }

    fn refresh(&mut self, instrument: Instrument) -> Result<InstrumentStatus, BrokerError> {
        let broker = self.ports.broker;
        let clock = self.ports.clock;
        let retry = self.settings.retry;
        let id = self.settings.instruments.id(instrument);

        let position = retry.run(clock, "get position", || broker.get_position(id))?;
        let order = retry.run(clock, "get active order", || broker.get_active_order(id))?;
        let quote = retry.run(clock, "get quote", || broker.get_quote(id))?;

        let index = instrument.index();
        let status = InstrumentStatus::derive(
            position,
            order,
            quote,
            &self.settings.trading,
            Some(&self.status[index]),
        );
        self.status[index] = status.clone();
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_floats_up_with_capital() {
        assert_eq!(floated_budget(5000.0, 12_345.0), 11_000.0);
        assert_eq!(floated_budget(5000.0, 4_000.0), 5000.0);
        assert_eq!(floated_budget(5000.0, 6_999.0), 5000.0);
    }

    #[test]
    fn report_lists_session_statistics() {
        let stats = SessionStats {
            balance_before: 10_000.0,
            balance_after: 10_250.5,
            budget: 9000.0,
            errors: 2,
            trades: 3,
        };
        let report = stats.to_string();
        assert!(report.contains("balance: 10000.00 -> 10250.50 (+250.50)"));
        assert!(report.contains("budget: 9000"));
        assert!(report.contains("trades: 3"));
        assert!(report.ends_with("errors: 2"));
    }
}
