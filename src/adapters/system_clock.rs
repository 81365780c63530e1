//! Local wall clock.

use crate::ports::clock_port::ClockPort;
use chrono::{Local, NaiveDateTime};
use std::time::Duration;

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl ClockPort for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
