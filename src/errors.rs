//! Unified error type for the ledger service.
//!
//! Core functions return [`Result`] and never talk HTTP; the API layer maps
//! each variant to a status code.

use thiserror::Error;

/// Every failure a core operation or the server start-up can report.
#[derive(Debug, Error)]
pub enum Error {
    /// Input rejected before any write (non-positive quantity, missing calculator field, ...)
    #[error("Validation error: {message}")]
    Validation {
        /// What was wrong with the input
        message: String,
    },

    /// A referenced record does not exist
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of record, e.g. "Project"
        entity: &'static str,
        /// Key that was looked up
        id: String,
    },

    /// The operation conflicts with the current state of a record
    #[error("Conflict: {message}")]
    Conflict {
        /// Which state blocked the operation
        message: String,
    },

    /// Missing or malformed settings
    #[error("Configuration error: {message}")]
    Config {
        /// What was wrong with the setting
        message: String,
    },

    /// Query or connection failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Reading a file or binding the listener failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding of calculator data failed
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// An environment variable was present but unreadable
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

impl Error {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub(crate) fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub(crate) fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
