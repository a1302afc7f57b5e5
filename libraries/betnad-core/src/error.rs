/// Core error types for BetNad
use thiserror::Error;

/// Result type alias using `BetnadError`
pub type Result<T> = std::result::Result<T, BetnadError>;

/// Core error type for BetNad
#[derive(Error, Debug)]
pub enum BetnadError {
    /// Request body failed validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Identity token is malformed, expired or not signed by the provider
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Identity provider has no record for the subject
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// Persistence layer is unreachable or rejected the operation
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Unique key already taken
    #[error("Duplicate entry: {0}")]
    Duplicate(String),

    /// Identity provider could not be reached or answered unexpectedly
    #[error("Identity provider error: {0}")]
    IdentityProvider(String),

    /// Wallet custody provider could not be reached or refused the request
    #[error("Wallet provider error: {0}")]
    WalletProvider(String),

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl BetnadError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an invalid token error
    pub fn invalid_token(msg: impl Into<String>) -> Self {
        Self::InvalidToken(msg.into())
    }

    /// Create a user not found error
    pub fn user_not_found(uid: impl Into<String>) -> Self {
        Self::UserNotFound(uid.into())
    }

    /// Create a storage unavailable error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::StorageUnavailable(msg.into())
    }

    /// Create an identity provider error
    pub fn identity_provider(msg: impl Into<String>) -> Self {
        Self::IdentityProvider(msg.into())
    }

    /// Create a wallet provider error
    pub fn wallet_provider(msg: impl Into<String>) -> Self {
        Self::WalletProvider(msg.into())
    }

    /// Short message that is safe to return to API callers.
    ///
    /// Internal detail (driver messages, provider payloads) stays in the logs.
    pub fn client_message(&self) -> &'static str {
        match self {
            Self::Validation(_) => "Invalid request",
            Self::InvalidToken(_) => "Invalid or expired token",
            Self::UserNotFound(_) => "User not found",
            Self::StorageUnavailable(_) => "Service temporarily unavailable",
            Self::Duplicate(_) => "Resource already exists",
            Self::IdentityProvider(_) => "Identity provider unavailable",
            Self::WalletProvider(_) => "Wallet provider unavailable",
            Self::Serialization(_) => "Internal error",
        }
    }
}
