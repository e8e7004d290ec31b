//! # Error Types
//!
//! Crate-wide error handling using thiserror for structured error types
//! instead of `Box<dyn Error>` patterns. Database failures carry the numeric
//! engine error code when one could be recovered, so the retry policy can
//! classify them without re-parsing.

use thiserror::Error;

use crate::resilience::{scan_failure_code, FailureCode};

/// Errors produced by the monitoring and operations core.
#[derive(Error, Debug)]
pub enum OpsError {
    #[error("Database error during {operation}: {message}")]
    Database {
        operation: String,
        /// Engine error code recovered from the failure, if any.
        code: Option<i32>,
        message: String,
    },

    #[error("Watermark store error: {message}")]
    StateStore { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Report delivery error: {message}")]
    Delivery { message: String },
}

impl OpsError {
    /// Wrap a database failure, recovering the engine error code from the
    /// driver's structured code or, failing that, from the error text.
    pub fn database(operation: impl Into<String>, source: &sqlx::Error) -> Self {
        let message = source.to_string();
        let code = match source {
            sqlx::Error::Database(db) => db
                .code()
                .and_then(|c| c.parse::<i32>().ok())
                .or_else(|| scan_failure_code(&message)),
            _ => scan_failure_code(&message),
        };
        OpsError::Database {
            operation: operation.into(),
            code,
            message,
        }
    }
}

impl From<rusqlite::Error> for OpsError {
    fn from(err: rusqlite::Error) -> Self {
        OpsError::StateStore {
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for OpsError {
    fn from(err: reqwest::Error) -> Self {
        OpsError::Delivery {
            message: err.to_string(),
        }
    }
}

impl FailureCode for OpsError {
    fn failure_code(&self) -> Option<i32> {
        match self {
            OpsError::Database { code, message, .. } => {
                code.or_else(|| scan_failure_code(message))
            }
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, OpsError>;
