//! External side-effect gateways
//!
//! Notification (payment notice email) and archival (notice HTML document).
//! Both are best-effort: the engine commits ledger state first, then calls
//! them through [`with_timeout`], and records the outcome instead of
//! propagating the error.

pub mod archival;
pub mod notification;

pub use archival::{ArchivalGateway, DisabledArchivalGateway, HttpArchivalGateway};
pub use notification::{NotificationGateway, SesNotificationGateway};

use std::future::Future;
use std::time::Duration;

use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Gateway error types
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// The remote side answered with a refusal
    #[error("rejected: {0}")]
    Rejected(String),

    #[error("transport error: {0}")]
    Transport(String),

    /// Gateway not configured for this deployment
    #[error("disabled: {0}")]
    Disabled(String),
}

impl GatewayError {
    pub fn is_disabled(&self) -> bool {
        matches!(self, Self::Disabled(_))
    }
}

impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        let code = match &err {
            GatewayError::Timeout(_) => ErrorCode::GatewayTimeout,
            GatewayError::Rejected(_) | GatewayError::Transport(_) | GatewayError::Disabled(_) => {
                ErrorCode::NotificationFailed
            }
        };
        AppError::with_message(code, err.to_string())
    }
}

/// Bound a gateway call; an elapsed deadline becomes [`GatewayError::Timeout`]
pub async fn with_timeout<T, F>(limit: Duration, call: F) -> Result<T, GatewayError>
where
    F: Future<Output = Result<T, GatewayError>>,
{
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| GatewayError::Timeout(limit))?
}
