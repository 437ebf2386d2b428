//! # atelier-export
//!
//! Legacy-encoding file building - low-level export capabilities only.
//!
//! ## Scope
//!
//! This crate handles HOW files are written for receiving bank systems:
//! - UTF-8 → Shift_JIS transcoding that fails on unmappable characters
//! - CSV row building with per-row atomicity and CRLF line endings
//!
//! Business logic (WHAT goes into a file) stays in application code:
//! - Generic payment list and bank transfer layouts → atelier-settlement
//!
//! ## Example
//!
//! ```
//! use atelier_export::{CsvBuilder, ShiftJisEncoder};
//!
//! let mut csv = CsvBuilder::new(ShiftJisEncoder);
//! csv.row(&["振込先", "金額"]).unwrap();
//! csv.row(&["ヤマダ タロウ", "359160"]).unwrap();
//! let bytes = csv.build();
//! assert!(bytes.ends_with(b"\r\n"));
//! ```

mod csv;
mod encoding;
mod error;

// Re-exports
pub use csv::CsvBuilder;
pub use encoding::{LegacyEncoder, ShiftJisEncoder};
pub use error::{ExportError, ExportResult};
