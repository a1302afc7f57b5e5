//! Error types for the Privy client.

use betnad_core::BetnadError;
use thiserror::Error;

/// Errors that can occur when talking to the Privy API.
#[derive(Error, Debug)]
pub enum PrivyError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Privy returned an error response
    #[error("Privy API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Client was built with unusable settings
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Failed to parse a Privy response
    #[error("Failed to parse response: {0}")]
    Parse(String),
}

/// Result type for Privy client operations.
pub type Result<T> = std::result::Result<T, PrivyError>;

impl From<PrivyError> for BetnadError {
    fn from(err: PrivyError) -> Self {
        BetnadError::wallet_provider(err.to_string())
    }
}
