//! Domain error types.

/// Top-level error type for stockcast.
#[derive(Debug, thiserror::Error)]
pub enum StockcastError {
    #[error("no data found for symbol {symbol}")]
    DataNotFound { symbol: String },

    #[error("insufficient data for symbol {symbol}: have {points} points, need {minimum}")]
    InsufficientData {
        symbol: String,
        points: usize,
        minimum: usize,
    },

    #[error("invalid value for {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("trend model unavailable for {symbol}: {reason}")]
    ModelUnavailable { symbol: String, reason: String },

    #[error("database error: {reason}")]
    Database { reason: String },

    #[error("database query error: {reason}")]
    DatabaseQuery { reason: String },

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
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StockcastError {
    pub fn validation(field: &str, reason: impl Into<String>) -> Self {
        StockcastError::Validation {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// True for both "no rows at all" and "too few rows for the operation".
    pub fn is_data_not_found(&self) -> bool {
        matches!(
            self,
            StockcastError::DataNotFound { .. } | StockcastError::InsufficientData { .. }
        )
    }
}

impl From<&StockcastError> for std::process::ExitCode {
    fn from(err: &StockcastError) -> Self {
        let code: u8 = match err {
            StockcastError::Io(_) => 1,
            StockcastError::ConfigParse { .. }
            | StockcastError::ConfigMissing { .. }
            | StockcastError::ConfigInvalid { .. } => 2,
            StockcastError::Database { .. } | StockcastError::DatabaseQuery { .. } => 3,
            StockcastError::Validation { .. } => 4,
            StockcastError::DataNotFound { .. } | StockcastError::InsufficientData { .. } => 5,
            StockcastError::ModelUnavailable { .. } => 6,
            StockcastError::Serialization(_) => 7,
        };
        std::process::ExitCode::from(code)
    }
}
