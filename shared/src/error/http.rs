//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // Success
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound
            | Self::CreatorNotFound
            | Self::PaymentNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::AlreadyExists | Self::PaymentAlreadyCompleted => StatusCode::CONFLICT,

            // 422 Unprocessable (creator data cannot be used as-is)
            Self::BankDetailsMissing
            | Self::EmailMissing
            | Self::InvalidCommissionSchedule
            | Self::EncodingUnsupported
            | Self::ExportEmpty => StatusCode::UNPROCESSABLE_ENTITY,

            // 502 / 504 (external gateways)
            Self::NotificationFailed => StatusCode::BAD_GATEWAY,
            Self::GatewayTimeout => StatusCode::GATEWAY_TIMEOUT,

            // 503 Service Unavailable (transient errors, client can retry)
            Self::NetworkError | Self::TimeoutError => StatusCode::SERVICE_UNAVAILABLE,

            // 500 Internal Server Error
            Self::InternalError
            | Self::DatabaseError
            | Self::ConfigError
            | Self::SchemaMismatch
            | Self::InvalidSettlementAmount => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request (default for validation/business errors)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}
