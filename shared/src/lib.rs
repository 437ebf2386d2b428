//! Shared types for the Atelier creator marketplace
//!
//! Common types used by the settlement engine, the export crate and the
//! operator API: domain models, the unified error system and small
//! utilities.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
