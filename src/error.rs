use thiserror::Error;

/// Failures talking to the broker's REST API
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("not found ({code}): {message}")]
    NotFound { code: String, message: String },

    #[error("broker API error ({status}, {code}): {message}")]
    Status {
        status: u16,
        code: String,
        message: String,
    },

    #[error("failed to decode broker response: {0}")]
    Decode(String),

    #[error("order rejected: {0}")]
    Rejected(String),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }
}

/// Failures that abort a decision cycle
#[derive(Error, Debug)]
pub enum BotError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("candle fetch failed: {0}")]
    DataFetch(#[source] ApiError),

    #[error("position query failed: {0}")]
    PositionQuery(#[source] ApiError),

    #[error("insufficient data: need {needed} candles, got {got}")]
    InsufficientData { needed: usize, got: usize },

    #[error("indicator calculation error: {0}")]
    Indicator(String),
}

impl BotError {
    /// Process exit code used when this error ends a run
    pub fn exit_code(&self) -> u8 {
        match self {
            BotError::Configuration(_) => 2,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, BotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error_has_distinct_exit_code() {
        let config = BotError::Configuration("missing token".to_string());
        let fetch = BotError::DataFetch(ApiError::Decode("bad".to_string()));

        assert_eq!(config.exit_code(), 2);
        assert_eq!(fetch.exit_code(), 1);
        assert_ne!(config.exit_code(), 0);
    }

    #[test]
    fn test_not_found_classification() {
        let err = ApiError::NotFound {
            code: "NO_SUCH_POSITION".to_string(),
            message: "no position".to_string(),
        };
        assert!(err.is_not_found());
        assert!(!ApiError::Rejected("FOK cancelled".to_string()).is_not_found());
    }
}
