//! Bounded retries for collaborator calls.

use crate::domain::error::BrokerError;
use crate::ports::clock_port::ClockPort;
use std::time::Duration;
use tracing::warn;

/// Up to `max_attempts` tries; the n-th retry waits
/// `backoff + (n - 1) * backoff_step`. Only transient errors are retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
    pub backoff_step: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_secs(5),
            backoff_step: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Wait before retry number `retry` (1-based).
    pub fn delay(&self, retry: u32) -> Duration {
        self.backoff + self.backoff_step * retry.saturating_sub(1)
    }

    pub fn run<T>(
        &self,
        clock: &dyn ClockPort,
        operation: &str,
        mut call: impl FnMut() -> Result<T, BrokerError>,
    ) -> Result<T, BrokerError> {
        let mut last_error = None;
        for attempt in 0..self.max_attempts.max(1) {
            if attempt > 0 {
                let delay = self.delay(attempt);
                warn!(
                    operation,
                    attempt,
                    delay_secs = delay.as_secs_f64(),
                    error = ?last_error,
                    "retrying broker call"
                );
                clock.sleep(delay);
            }
            match call() {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() => last_error = Some(err),
                Err(err) => return Err(err),
            }
        }
        Err(last_error.unwrap_or_else(|| BrokerError::Transient {
            reason: format!("{operation}: no attempts made"),
        }))
    }
}
