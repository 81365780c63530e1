//! Typed settings, built from a [`ConfigPort`] after validation.

use crate::domain::candle::Lookback;
use crate::domain::config_validation::{self, read_lookback, read_time, required_string};
use crate::domain::error::DayTraderError;
use crate::domain::instrument::Instrument;
use crate::domain::retry::RetryPolicy;
use crate::domain::session::SessionTimes;
use crate::domain::walker::{TradeLimits, WalkerConfig};
use crate::ports::config_port::ConfigPort;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_STOP_LOSS: f64 = 0.98;
pub const DEFAULT_TAKE_PROFIT: f64 = 1.015;
pub const DEFAULT_TRAILING_STOP: f64 = 0.99;
pub const DEFAULT_MAX_SPREAD: f64 = 0.65;
pub const DEFAULT_MAX_SPREAD_EVENING: f64 = 1.0;
pub const DEFAULT_POLL_INTERVAL_SECS: i64 = 60;
pub const DEFAULT_SELL_CONFIRM_PAUSE_SECS: i64 = 1;
pub const DEFAULT_MAX_CANDLE_AGE_SECS: i64 = 122;

#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentSettings {
    /// Underlying index the strategies are evaluated on.
    pub monitoring: String,
    pub bull: String,
    pub bear: String,
    pub account: String,
}

impl InstrumentSettings {
    /// Broker id of `instrument`.
    pub fn id(&self, instrument: Instrument) -> &str {
        match instrument {
            Instrument::Bull => &self.bull,
            Instrument::Bear => &self.bear,
        }
    }
}

/// Live trading limits. `stop_loss`, `take_profit` and `trailing_stop` are
/// price multipliers (0.98 = 2% below the reference price).
#[derive(Debug, Clone, PartialEq)]
pub struct TradingSettings {
    pub budget: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub trailing_stop: f64,
    /// Spread limits, percent.
    pub max_spread: f64,
    pub max_spread_evening: f64,
    pub poll_interval: Duration,
    pub sell_confirm_pause: Duration,
    pub max_candle_age: Duration,
}

impl Default for TradingSettings {
    fn default() -> Self {
        Self {
            budget: 0.0,
            stop_loss: DEFAULT_STOP_LOSS,
            take_profit: DEFAULT_TAKE_PROFIT,
            trailing_stop: DEFAULT_TRAILING_STOP,
            max_spread: DEFAULT_MAX_SPREAD,
            max_spread_evening: DEFAULT_MAX_SPREAD_EVENING,
            poll_interval: secs(DEFAULT_POLL_INTERVAL_SECS),
            sell_confirm_pause: secs(DEFAULT_SELL_CONFIRM_PAUSE_SECS),
            max_candle_age: secs(DEFAULT_MAX_CANDLE_AGE_SECS),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationSettings {
    pub data_dir: PathBuf,
    pub store_path: PathBuf,
    pub long_lookback: Lookback,
    pub test_lookback: Lookback,
    pub adjust_lookback: Lookback,
    pub adjust_limit_hours: u32,
    pub resolution: String,
}

impl Default for CalibrationSettings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            store_path: PathBuf::from("strategies.json"),
            long_lookback: Lookback::days(30),
            test_lookback: Lookback::days(15),
            adjust_lookback: Lookback::days(1),
            adjust_limit_hours: 4,
            resolution: "1m".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub instruments: InstrumentSettings,
    pub trading: TradingSettings,
    pub session: SessionTimes,
    pub walker: WalkerConfig,
    pub calibration: CalibrationSettings,
    pub retry: RetryPolicy,
}

impl Settings {
    /// Validate `config`, then read it into typed settings.
    pub fn from_config(config: &dyn ConfigPort) -> Result<Settings, DayTraderError> {
        config_validation::validate_settings(config)?;

        let instruments = InstrumentSettings {
            monitoring: required_string(config, "instruments", "monitoring")?,
            bull: required_string(config, "instruments", "bull")?,
            bear: required_string(config, "instruments", "bear")?,
            account: required_string(config, "instruments", "account")?,
        };

        let trading = TradingSettings {
            budget: config.get_double("trading", "budget", 0.0),
            stop_loss: config.get_double("trading", "stop_loss", DEFAULT_STOP_LOSS),
            take_profit: config.get_double("trading", "take_profit", DEFAULT_TAKE_PROFIT),
            trailing_stop: config.get_double("trading", "trailing_stop", DEFAULT_TRAILING_STOP),
            max_spread: config.get_double("trading", "max_spread", DEFAULT_MAX_SPREAD),
            max_spread_evening: config.get_double(
                "trading",
                "max_spread_evening",
                DEFAULT_MAX_SPREAD_EVENING,
            ),
            poll_interval: secs(config.get_int(
                "trading",
                "poll_interval_secs",
                DEFAULT_POLL_INTERVAL_SECS,
            )),
            sell_confirm_pause: secs(config.get_int(
                "trading",
                "sell_confirm_pause_secs",
                DEFAULT_SELL_CONFIRM_PAUSE_SECS,
            )),
            max_candle_age: secs(config.get_int(
                "trading",
                "max_candle_age_secs",
                DEFAULT_MAX_CANDLE_AGE_SECS,
            )),
        };

        let defaults = SessionTimes::default();
        let session = SessionTimes {
            morning_transition: read_time(config, "morning_transition", defaults.morning_transition)?,
            day: read_time(config, "day", defaults.day)?,
            evening_transition: read_time(config, "evening_transition", defaults.evening_transition)?,
            evening: read_time(config, "evening", defaults.evening)?,
            night: read_time(config, "night", defaults.night)?,
        };

        let walker_defaults = WalkerConfig::default();
        let walker = WalkerConfig {
            session_start: read_time(config, "walk_start", walker_defaults.session_start)?,
            session_close: read_time(config, "walk_close", walker_defaults.session_close)?,
            limits: config
                .get_bool("calibration", "trade_limits", false)
                .then_some(TradeLimits {
                    stop_loss: trading.stop_loss,
                    take_profit: trading.take_profit,
                }),
        };

        let calibration_defaults = CalibrationSettings::default();
        let calibration = CalibrationSettings {
            data_dir: config
                .get_string("calibration", "data_dir")
                .map_or(calibration_defaults.data_dir, PathBuf::from),
            store_path: config
                .get_string("calibration", "store_path")
                .map_or(calibration_defaults.store_path, PathBuf::from),
            long_lookback: read_lookback(config, "long_lookback", calibration_defaults.long_lookback)?,
            test_lookback: read_lookback(config, "test_lookback", calibration_defaults.test_lookback)?,
            adjust_lookback: read_lookback(
                config,
                "adjust_lookback",
                calibration_defaults.adjust_lookback,
            )?,
            adjust_limit_hours: config.get_int(
                "calibration",
                "adjust_limit_hours",
                i64::from(calibration_defaults.adjust_limit_hours),
            ) as u32,
            resolution: config
                .get_string("calibration", "resolution")
                .unwrap_or(calibration_defaults.resolution),
        };

        let retry_defaults = RetryPolicy::default();
        let retry = RetryPolicy {
            max_attempts: config.get_int(
                "retry",
                "max_attempts",
                i64::from(retry_defaults.max_attempts),
            ) as u32,
            backoff: secs(config.get_int(
                "retry",
                "backoff_secs",
                retry_defaults.backoff.as_secs() as i64,
            )),
            backoff_step: secs(config.get_int(
                "retry",
                "backoff_step_secs",
                retry_defaults.backoff_step.as_secs() as i64,
            )),
        };

        Ok(Settings {
            instruments,
            trading,
            session,
            walker,
            calibration,
            retry,
        })
    }
}

fn secs(value: i64) -> Duration {
    Duration::from_secs(value.max(0) as u64)
}
