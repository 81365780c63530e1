//! Wall clock, injectable so session timing can be driven by tests.

use chrono::NaiveDateTime;
use std::time::Duration;

pub trait ClockPort {
    fn now(&self) -> NaiveDateTime;
    fn sleep(&self, duration: Duration);
}
