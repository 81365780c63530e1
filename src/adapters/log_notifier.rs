//! Notifier that writes operator messages to the log.

use crate::ports::notifier_port::NotifierPort;
use tracing::info;

#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl NotifierPort for LogNotifier {
    fn notify(&self, message: &str) {
        info!(target: "daytrader::notify", "{}", message);
    }
}
