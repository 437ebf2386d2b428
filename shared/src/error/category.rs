//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// Categories are determined by the leading digit of the error code:
/// - 0xxx: General errors
/// - 4xxx: Creator errors
/// - 5xxx: Settlement errors
/// - 6xxx: Export errors
/// - 8xxx: Gateway errors
/// - 9xxx: System errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Creator errors (4xxx)
    Creator,
    /// Settlement and remittance errors (5xxx)
    Settlement,
    /// Export errors (6xxx)
    Export,
    /// External gateway errors (8xxx)
    Gateway,
    /// System errors (9xxx and anything unassigned)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            4000..5000 => Self::Creator,
            5000..6000 => Self::Settlement,
            6000..7000 => Self::Export,
            8000..9000 => Self::Gateway,
            _ => Self::System,
        }
    }

    /// Get the string name for this category
    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Creator => "creator",
            Self::Settlement => "settlement",
            Self::Export => "export",
            Self::Gateway => "gateway",
            Self::System => "system",
        }
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}
