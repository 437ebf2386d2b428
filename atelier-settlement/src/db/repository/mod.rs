//! Repository Module
//!
//! Free-function repositories over `SqlitePool`, one file per table group.
//! All SQL lives here; the settlement engine never builds queries itself.

pub mod creator;
pub mod creator_payment;
pub mod remittance;
pub mod sales;

use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Stored commission schedule cannot be used for arithmetic
    #[error("Creator {creator_id} has invalid commission schedule: {reason}")]
    InvalidCommission { creator_id: i64, reason: String },
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => RepoError::NotFound(err.to_string()),
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepoError::Duplicate(db.message().to_string())
            }
            sqlx::Error::Database(db) if db.is_check_violation() => {
                RepoError::Validation(db.message().to_string())
            }
            _ => RepoError::Database(err.to_string()),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::with_message(ErrorCode::NotFound, msg),
            RepoError::Duplicate(msg) => AppError::with_message(ErrorCode::AlreadyExists, msg),
            RepoError::Database(msg) => {
                tracing::error!(error = %msg, "Repository database error");
                AppError::database(msg)
            }
            RepoError::Validation(msg) => AppError::validation(msg),
            RepoError::InvalidCommission { creator_id, reason } => AppError::with_message(
                ErrorCode::InvalidCommissionSchedule,
                format!("Creator {creator_id} has invalid commission schedule: {reason}"),
            )
            .with_detail("creator_id", creator_id),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;
