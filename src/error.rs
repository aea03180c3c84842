use thiserror::Error;

/// Main error type for the copy-trading agent
#[derive(Error, Debug)]
pub enum CopyTradeError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration: {}", .0.join("; "))]
    InvalidConfig(Vec<String>),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Collaborator errors
    #[error("Trade discovery failed: {0}")]
    Discovery(String),

    #[error("Market check failed for {market_id}: {reason}")]
    MarketCheck { market_id: String, reason: String },

    #[error("Order execution failed: {0}")]
    Execution(String),

    #[error("Session error: {0}")]
    Session(String),
}

/// Result type alias for CopyTradeError
pub type Result<T> = std::result::Result<T, CopyTradeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_config_lists_every_violation() {
        let err = CopyTradeError::InvalidConfig(vec![
            "max_slippage must be between 0 and 1".to_string(),
            "leaders.wallets must not be empty".to_string(),
        ]);

        assert_eq!(
            err.to_string(),
            "Invalid configuration: max_slippage must be between 0 and 1; leaders.wallets must not be empty"
        );
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: CopyTradeError = io.into();
        assert!(matches!(err, CopyTradeError::Io(_)));
    }
}
