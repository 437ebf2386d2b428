//! Unified error codes for the Atelier settlement stack
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 4xxx: Creator errors
//! - 5xxx: Settlement / remittance errors
//! - 6xxx: Export errors
//! - 8xxx: External gateway errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility with the operator console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 4xxx: Creator ====================
    /// Creator not found
    CreatorNotFound = 4001,
    /// Creator has incomplete bank transfer details
    BankDetailsMissing = 4002,
    /// Creator has no email address
    EmailMissing = 4003,
    /// Creator commission schedule cannot be parsed
    InvalidCommissionSchedule = 4004,

    // ==================== 5xxx: Settlement ====================
    /// Creator payment not found
    PaymentNotFound = 5001,
    /// Creator payment already completed (terminal state)
    PaymentAlreadyCompleted = 5002,
    /// Settlement period is invalid
    InvalidSettlementPeriod = 5003,
    /// Settlement amounts violate an invariant
    InvalidSettlementAmount = 5004,

    // ==================== 6xxx: Export ====================
    /// Text contains characters outside the legacy export encoding
    EncodingUnsupported = 6001,
    /// No exportable rows for the period
    ExportEmpty = 6002,
    /// Unknown export format
    UnknownExportFormat = 6003,

    // ==================== 8xxx: Gateway ====================
    /// Notification delivery failed
    NotificationFailed = 8001,
    /// External gateway did not answer in time
    GatewayTimeout = 8003,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Network error
    NetworkError = 9003,
    /// Operation timed out
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,
    /// Database schema does not match the expected contract
    SchemaMismatch = 9006,
}

impl ErrorCode {
    /// Get the numeric value of this error code
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Creator
            ErrorCode::CreatorNotFound => "Creator not found",
            ErrorCode::BankDetailsMissing => "Creator bank transfer details are incomplete",
            ErrorCode::EmailMissing => "Creator has no email address",
            ErrorCode::InvalidCommissionSchedule => "Creator commission schedule is invalid",

            // Settlement
            ErrorCode::PaymentNotFound => "Creator payment not found",
            ErrorCode::PaymentAlreadyCompleted => "Creator payment has already been completed",
            ErrorCode::InvalidSettlementPeriod => "Settlement period is invalid",
            ErrorCode::InvalidSettlementAmount => "Settlement amounts are inconsistent",

            // Export
            ErrorCode::EncodingUnsupported => {
                "Text contains characters that cannot be encoded for export"
            }
            ErrorCode::ExportEmpty => "No exportable payments for this period",
            ErrorCode::UnknownExportFormat => "Unknown export format",

            // Gateway
            ErrorCode::NotificationFailed => "Notification delivery failed",
            ErrorCode::GatewayTimeout => "External gateway timed out",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::SchemaMismatch => "Database schema does not match the expected version",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Creator
            4001 => Ok(ErrorCode::CreatorNotFound),
            4002 => Ok(ErrorCode::BankDetailsMissing),
            4003 => Ok(ErrorCode::EmailMissing),
            4004 => Ok(ErrorCode::InvalidCommissionSchedule),

            // Settlement
            5001 => Ok(ErrorCode::PaymentNotFound),
            5002 => Ok(ErrorCode::PaymentAlreadyCompleted),
            5003 => Ok(ErrorCode::InvalidSettlementPeriod),
            5004 => Ok(ErrorCode::InvalidSettlementAmount),

            // Export
            6001 => Ok(ErrorCode::EncodingUnsupported),
            6002 => Ok(ErrorCode::ExportEmpty),
            6003 => Ok(ErrorCode::UnknownExportFormat),

            // Gateway
            8001 => Ok(ErrorCode::NotificationFailed),
            8003 => Ok(ErrorCode::GatewayTimeout),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::NetworkError),
            9004 => Ok(ErrorCode::TimeoutError),
            9005 => Ok(ErrorCode::ConfigError),
            9006 => Ok(ErrorCode::SchemaMismatch),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
