//! Domain error types.

/// Top-level error type for trendcast.
///
/// Every variant is terminal for the single ticker being processed; the batch
/// loop catches per-ticker failures and reports them alongside successes.
#[derive(Debug, thiserror::Error)]
pub enum TrendcastError {
    #[error("no data available for {ticker}: {reason}")]
    DataUnavailable { ticker: String, reason: String },

    #[error("insufficient data for {ticker}: have {bars} bars, need {minimum}")]
    InsufficientData {
        ticker: String,
        bars: usize,
        minimum: usize,
    },

    #[error("no label available for bar index {index} (last bar of series)")]
    NoLabelAvailable { index: usize },

    #[error("insufficient training data: have {rows} rows, need {minimum}")]
    InsufficientTrainingData { rows: usize, minimum: usize },

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

    #[error("sink error: {reason}")]
    Sink { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&TrendcastError> for std::process::ExitCode {
    fn from(err: &TrendcastError) -> Self {
        let code: u8 = match err {
            TrendcastError::Io(_) | TrendcastError::Sink { .. } => 1,
            TrendcastError::ConfigParse { .. }
            | TrendcastError::ConfigMissing { .. }
            | TrendcastError::ConfigInvalid { .. } => 2,
            TrendcastError::DataUnavailable { .. } => 3,
            TrendcastError::InsufficientData { .. }
            | TrendcastError::InsufficientTrainingData { .. } => 4,
            TrendcastError::NoLabelAvailable { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
