//! Data models
//!
//! Shared between the settlement engine, the export crate and the operator API.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64`; money is `i64` in minor currency units (yen).

pub mod creator;
pub mod payment;
pub mod period;
pub mod remittance;
pub mod sales;
pub mod settlement;

// Re-exports
pub use creator::*;
pub use payment::*;
pub use period::*;
pub use remittance::*;
pub use sales::*;
pub use settlement::*;
