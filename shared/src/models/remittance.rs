//! Withholding Tax Remittance Model (源泉所得税 納付)

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::period::SettlementPeriod;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum RemittanceStatus {
    Unpaid,
    Paid,
}

/// One row per (target_year, target_month)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct WithholdingTaxRemittance {
    pub id: i64,
    pub target_year: i32,
    pub target_month: i32,
    pub total_amount: i64,
    pub due_date: NaiveDate,
    pub paid_date: Option<NaiveDate>,
    pub status: RemittanceStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Withheld total for a period together with its remittance record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemittanceSummary {
    pub period: SettlementPeriod,
    /// Sum of withholding_tax over the period's payment rows
    pub total_withheld: i64,
    /// Payment rows with withholding > 0
    pub withheld_payment_count: i64,
    pub due_date: NaiveDate,
    /// `Unpaid` when no remittance row exists yet
    pub status: RemittanceStatus,
    pub record: Option<WithholdingTaxRemittance>,
}
