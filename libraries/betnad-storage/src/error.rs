/// Storage-specific errors
use mongodb::error::{ErrorKind, WriteFailure};
use thiserror::Error;

/// Result type alias using `StorageError`
pub type Result<T> = std::result::Result<T, StorageError>;

/// MongoDB server code for a unique index violation
const DUPLICATE_KEY_CODE: i32 = 11000;

/// Storage error types
#[derive(Error, Debug)]
pub enum StorageError {
    /// Database connection error
    #[error("Database connection error: {0}")]
    Connection(String),

    /// Query returned something the model cannot use
    #[error("Query error: {0}")]
    Query(String),

    /// Unique index violation
    #[error("Duplicate key: {0}")]
    Duplicate(String),

    /// Error from the MongoDB driver
    #[error(transparent)]
    Database(mongodb::error::Error),
}

impl From<mongodb::error::Error> for StorageError {
    fn from(err: mongodb::error::Error) -> Self {
        if is_duplicate_key(&err) {
            Self::Duplicate(err.to_string())
        } else {
            Self::Database(err)
        }
    }
}

impl From<StorageError> for betnad_core::BetnadError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Duplicate(msg) => betnad_core::BetnadError::Duplicate(msg),
            other => betnad_core::BetnadError::storage(other.to_string()),
        }
    }
}

/// Whether the driver error is a unique index violation.
///
/// Plain inserts report it as a write error, `findAndModify` as a command error.
pub fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => {
            write_error.code == DUPLICATE_KEY_CODE
        }
        ErrorKind::Command(command_error) => command_error.code == DUPLICATE_KEY_CODE,
        _ => false,
    }
}
