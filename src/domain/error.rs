//! Domain error types.

/// A strategy identifier parse error with position information.
#[derive(Debug, Clone, thiserror::Error)]
#[error("parse error at position {position}: {message}")]
pub struct ParseError {
    pub message: String,
    pub position: usize,
}

impl ParseError {
    /// Format the error with a caret pointing at the error position in the input.
    pub fn display_with_context(&self, input: &str) -> String {
        let caret = " ".repeat(self.position) + "^";
        format!(
            "{input}\n{caret}\n{err}",
            input = input,
            caret = caret,
            err = self
        )
    }
}

/// Outcome classes of a failed broker or market-data call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BrokerError {
    /// Timeouts and dropped connections. Worth retrying.
    #[error("transient broker error: {reason}")]
    Transient { reason: String },

    #[error("broker error: {reason}")]
    Fatal { reason: String },
}

impl BrokerError {
    pub fn is_transient(&self) -> bool {
        matches!(self, BrokerError::Transient { .. })
    }
}

/// Top-level error type for daytrader.
#[derive(Debug, thiserror::Error)]
pub enum DayTraderError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    StrategyParse(#[from] ParseError),

    #[error("condition ({category}) {name} is not available for this data window")]
    UnknownCondition { category: String, name: String },

    #[error("invalid strategy: {reason}")]
    InvalidStrategy { reason: String },

    #[error("no data for {symbol}")]
    NoData { symbol: String },

    #[error("market data error: {reason}")]
    MarketData { reason: String },

    #[error(transparent)]
    Broker(#[from] BrokerError),

    #[error("strategy store error: {reason}")]
    Store { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DayTraderError {
    pub fn is_transient(&self) -> bool {
        matches!(self, DayTraderError::Broker(e) if e.is_transient())
    }
}

impl From<&DayTraderError> for std::process::ExitCode {
    fn from(err: &DayTraderError) -> Self {
        let code: u8 = match err {
            DayTraderError::Io(_) => 1,
            DayTraderError::ConfigParse { .. }
            | DayTraderError::ConfigMissing { .. }
            | DayTraderError::ConfigInvalid { .. } => 2,
            DayTraderError::NoData { .. } | DayTraderError::MarketData { .. } => 3,
            DayTraderError::StrategyParse(_)
            | DayTraderError::UnknownCondition { .. }
            | DayTraderError::InvalidStrategy { .. } => 4,
            DayTraderError::Broker(_) => 5,
            DayTraderError::Store { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}
