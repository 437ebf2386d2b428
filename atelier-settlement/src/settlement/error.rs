//! Settlement engine errors

use atelier_export::ExportError;
use shared::error::{AppError, ErrorCode};
use shared::models::SettlementPeriod;
use thiserror::Error;

use crate::db::repository::RepoError;

#[derive(Debug, Error)]
pub enum SettlementError {
    #[error(transparent)]
    Repo(#[from] RepoError),

    /// Domain validation from the shared models (period, amounts)
    #[error(transparent)]
    App(#[from] AppError),

    #[error("Creator {0} not found")]
    CreatorNotFound(i64),

    #[error("Creator payment {0} not found")]
    PaymentNotFound(i64),

    /// Completed rows are terminal; re-confirming is refused
    #[error("Payment {payment_id} of creator {creator_id} for {period} is already completed")]
    AlreadyCompleted {
        payment_id: i64,
        creator_id: i64,
        period: SettlementPeriod,
    },

    #[error("Creator {creator_id} has no email address")]
    EmailMissing { creator_id: i64 },

    #[error("Creator {creator_id} is missing bank details: {}", .fields.join(", "))]
    BankDetailsMissing {
        creator_id: i64,
        fields: Vec<&'static str>,
    },

    #[error("No exportable payments for {period}")]
    ExportEmpty { period: SettlementPeriod },

    #[error("Unknown export format: {0}")]
    UnknownFormat(String),

    #[error(transparent)]
    Encoding(#[from] ExportError),
}

impl SettlementError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Repo(RepoError::InvalidCommission { .. }) => ErrorCode::InvalidCommissionSchedule,
            Self::Repo(RepoError::NotFound(_)) => ErrorCode::NotFound,
            Self::Repo(RepoError::Duplicate(_)) => ErrorCode::AlreadyExists,
            Self::Repo(RepoError::Validation(_)) => ErrorCode::ValidationFailed,
            Self::Repo(RepoError::Database(_)) => ErrorCode::DatabaseError,
            Self::App(e) => e.code,
            Self::CreatorNotFound(_) => ErrorCode::CreatorNotFound,
            Self::PaymentNotFound(_) => ErrorCode::PaymentNotFound,
            Self::AlreadyCompleted { .. } => ErrorCode::PaymentAlreadyCompleted,
            Self::EmailMissing { .. } => ErrorCode::EmailMissing,
            Self::BankDetailsMissing { .. } => ErrorCode::BankDetailsMissing,
            Self::ExportEmpty { .. } => ErrorCode::ExportEmpty,
            Self::UnknownFormat(_) => ErrorCode::UnknownExportFormat,
            Self::Encoding(_) => ErrorCode::EncodingUnsupported,
        }
    }
}

impl From<SettlementError> for AppError {
    fn from(err: SettlementError) -> Self {
        let code = err.code();
        match err {
            SettlementError::Repo(e) => e.into(),
            SettlementError::App(e) => e,
            SettlementError::CreatorNotFound(id) => {
                AppError::with_message(code, format!("Creator {id} not found"))
                    .with_detail("creator_id", id)
            }
            SettlementError::PaymentNotFound(id) => {
                AppError::with_message(code, format!("Creator payment {id} not found"))
                    .with_detail("payment_id", id)
            }
            SettlementError::AlreadyCompleted {
                payment_id,
                creator_id,
                period,
            } => AppError::with_message(code, err_message(payment_id, creator_id, period))
                .with_detail("payment_id", payment_id)
                .with_detail("creator_id", creator_id)
                .with_detail("period", period.to_string()),
            SettlementError::EmailMissing { creator_id } => AppError::new(code)
                .with_detail("creator_id", creator_id),
            SettlementError::BankDetailsMissing { creator_id, fields } => {
                AppError::with_message(
                    code,
                    format!("Creator {creator_id} is missing bank details: {}", fields.join(", ")),
                )
                .with_detail("creator_id", creator_id)
                .with_detail("fields", fields)
            }
            SettlementError::ExportEmpty { period } => {
                AppError::with_message(code, format!("No exportable payments for {period}"))
                    .with_detail("period", period.to_string())
            }
            SettlementError::UnknownFormat(format) => {
                AppError::with_message(code, format!("Unknown export format: {format}"))
                    .with_detail("format", format)
            }
            SettlementError::Encoding(e) => {
                let err = AppError::with_message(code, e.to_string());
                match e.unencodable_char() {
                    Some(c) => err.with_detail("character", c.to_string()),
                    None => err,
                }
            }
        }
    }
}

fn err_message(payment_id: i64, creator_id: i64, period: SettlementPeriod) -> String {
    format!("Payment {payment_id} of creator {creator_id} for {period} is already completed")
}

/// Result type for settlement engine operations
pub type EngineResult<T> = Result<T, SettlementError>;
