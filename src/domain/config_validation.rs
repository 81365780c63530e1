//! Settings validation.
//!
//! Every section is checked before a run starts, so a bad value is reported
//! as a config error instead of surfacing mid-session.

use crate::domain::candle::Lookback;
use crate::domain::error::DayTraderError;
use crate::domain::session::SessionTimes;
use crate::domain::walker::WalkerConfig;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveTime;

pub fn validate_settings(config: &dyn ConfigPort) -> Result<(), DayTraderError> {
    validate_instruments(config)?;
    validate_budget(config)?;
    validate_limits(config)?;
    validate_spreads(config)?;
    validate_intervals(config)?;
    validate_session(config)?;
    validate_calibration(config)?;
    validate_retry(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> DayTraderError {
    DayTraderError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

/// A non-blank value of `[section] key`.
pub fn required_string(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<String, DayTraderError> {
    match config.get_string(section, key) {
        Some(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        _ => Err(DayTraderError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        }),
    }
}

/// An `HH:MM` value of `[session] key`, `default` when absent.
pub fn read_time(
    config: &dyn ConfigPort,
    key: &str,
    default: NaiveTime,
) -> Result<NaiveTime, DayTraderError> {
    match config.get_string("session", key) {
        None => Ok(default),
        Some(s) => NaiveTime::parse_from_str(s.trim(), "%H:%M")
            .map_err(|_| invalid("session", key, format!("invalid time '{s}', expected HH:MM"))),
    }
}

/// A `"<n>d"` value of `[calibration] key`, `default` when absent.
pub fn read_lookback(
    config: &dyn ConfigPort,
    key: &str,
    default: Lookback,
) -> Result<Lookback, DayTraderError> {
    match config.get_string("calibration", key) {
        None => Ok(default),
        Some(s) => s.parse().map_err(|reason: String| invalid("calibration", key, reason)),
    }
}

fn validate_instruments(config: &dyn ConfigPort) -> Result<(), DayTraderError> {
    for key in ["monitoring", "bull", "bear", "account"] {
        required_string(config, "instruments", key)?;
    }
    if required_string(config, "instruments", "bull")?
        == required_string(config, "instruments", "bear")?
    {
        return Err(invalid(
            "instruments",
            "bear",
            "bull and bear must be different instruments",
        ));
    }
    Ok(())
}

fn validate_budget(config: &dyn ConfigPort) -> Result<(), DayTraderError> {
    let value = config.get_double("trading", "budget", 0.0);
    if value <= 0.0 {
        return Err(invalid("trading", "budget", "budget must be positive"));
    }
    Ok(())
}

fn validate_limits(config: &dyn ConfigPort) -> Result<(), DayTraderError> {
    let stop_loss = config.get_double("trading", "stop_loss", 0.98);
    if stop_loss <= 0.0 || stop_loss >= 1.0 {
        return Err(invalid("trading", "stop_loss", "stop_loss must be between 0 and 1"));
    }
    let take_profit = config.get_double("trading", "take_profit", 1.015);
    if take_profit <= 1.0 {
        return Err(invalid("trading", "take_profit", "take_profit must be above 1"));
    }
    let trailing = config.get_double("trading", "trailing_stop", 0.99);
    if trailing <= 0.0 || trailing >= 1.0 {
        return Err(invalid(
            "trading",
            "trailing_stop",
            "trailing_stop must be between 0 and 1",
        ));
    }
    Ok(())
}

fn validate_spreads(config: &dyn ConfigPort) -> Result<(), DayTraderError> {
    let day = config.get_double("trading", "max_spread", 0.65);
    if day <= 0.0 {
        return Err(invalid("trading", "max_spread", "max_spread must be positive"));
    }
    let evening = config.get_double("trading", "max_spread_evening", 1.0);
    if evening < day {
        return Err(invalid(
            "trading",
            "max_spread_evening",
            "max_spread_evening must not be below max_spread",
        ));
    }
    Ok(())
}

fn validate_intervals(config: &dyn ConfigPort) -> Result<(), DayTraderError> {
    if config.get_int("trading", "poll_interval_secs", 60) < 1 {
        return Err(invalid(
            "trading",
            "poll_interval_secs",
            "poll_interval_secs must be at least 1",
        ));
    }
    if config.get_int("trading", "sell_confirm_pause_secs", 1) < 0 {
        return Err(invalid(
            "trading",
            "sell_confirm_pause_secs",
            "sell_confirm_pause_secs must be non-negative",
        ));
    }
    if config.get_int("trading", "max_candle_age_secs", 122) < 60 {
        return Err(invalid(
            "trading",
            "max_candle_age_secs",
            "max_candle_age_secs must cover at least one candle",
        ));
    }
    Ok(())
}

fn validate_session(config: &dyn ConfigPort) -> Result<(), DayTraderError> {
    let defaults = SessionTimes::default();
    let times = SessionTimes {
        morning_transition: read_time(config, "morning_transition", defaults.morning_transition)?,
        day: read_time(config, "day", defaults.day)?,
        evening_transition: read_time(config, "evening_transition", defaults.evening_transition)?,
        evening: read_time(config, "evening", defaults.evening)?,
        night: read_time(config, "night", defaults.night)?,
    };
    if !times.is_ordered() {
        return Err(invalid(
            "session",
            "night",
            "phase boundaries must be strictly increasing",
        ));
    }

    let walker = WalkerConfig::default();
    let start = read_time(config, "walk_start", walker.session_start)?;
    let close = read_time(config, "walk_close", walker.session_close)?;
    if start >= close {
        return Err(invalid("session", "walk_close", "walk_close must be after walk_start"));
    }
    Ok(())
}

fn validate_calibration(config: &dyn ConfigPort) -> Result<(), DayTraderError> {
    for key in ["long_lookback", "test_lookback", "adjust_lookback"] {
        read_lookback(config, key, Lookback::days(1))?;
    }
    let hours = config.get_int("calibration", "adjust_limit_hours", 4);
    if !(1..=24).contains(&hours) {
        return Err(invalid(
            "calibration",
            "adjust_limit_hours",
            "adjust_limit_hours must be between 1 and 24",
        ));
    }
    if let Some(resolution) = config.get_string("calibration", "resolution") {
        if resolution.trim().is_empty() {
            return Err(invalid("calibration", "resolution", "resolution must not be empty"));
        }
    }
    Ok(())
}

fn validate_retry(config: &dyn ConfigPort) -> Result<(), DayTraderError> {
    if config.get_int("retry", "max_attempts", 3) < 1 {
        return Err(invalid("retry", "max_attempts", "max_attempts must be at least 1"));
    }
    for key in ["backoff_secs", "backoff_step_secs"] {
        if config.get_int("retry", key, 0) < 0 {
            return Err(invalid("retry", key, format!("{key} must be non-negative")));
        }
    }
    Ok(())
}
