//! Error handling for tygia
//!
//! Defines the rate pipeline error type and establishes a unified Result
//! type using anyhow for context chaining and error propagation.

use thiserror::Error;

/// Core error types for the fetch/parse/store pipeline
#[derive(Error, Debug)]
pub enum RateError {
    #[error("network error: {0}")]
    Network(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("currency {0} not found")]
    NotFound(String),

    #[error("io error")]
    Io(#[from] std::io::Error),
}

/// Result type alias for rate operations
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_formatting_is_readable() {
        let err = RateError::Network("connection refused".to_string());
        assert_eq!(err.to_string(), "network error: connection refused");
    }

    #[test]
    fn test_not_found_names_the_currency() {
        let err = RateError::NotFound("XYZ".to_string());
        assert_eq!(err.to_string(), "currency XYZ not found");
    }

    #[test]
    fn test_anyhow_context_chains_errors() {
        use anyhow::Context;
        let result: Result<()> = Err(RateError::Parse("missing table".to_string()))
            .map_err(anyhow::Error::from)
            .context("failed to refresh rates");
        match result {
            Err(e) => {
                assert!(e.to_string().contains("failed to refresh rates"));
                let debug_msg = format!("{:?}", e);
                assert!(debug_msg.contains("missing table"));
            }
            Ok(_) => panic!("expected error"),
        }
    }
}
