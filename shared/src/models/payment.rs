//! Creator Payment Model (月次支払)

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::period::SettlementPeriod;
use super::settlement::{SettlementAmounts, SettlementState};
use crate::error::AppResult;

/// Stored lifecycle status; "unconfirmed" is the absence of a row
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum PaymentStatus {
    Pending,
    Completed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }
}

/// One row per (creator_id, target_year, target_month)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct CreatorPayment {
    pub id: i64,
    pub creator_id: i64,
    pub target_year: i32,
    pub target_month: i32,
    pub gross_sales: i64,
    pub commission_amount: i64,
    pub withholding_tax: i64,
    pub net_payment: i64,
    pub order_count: i64,
    pub item_count: i64,
    pub status: PaymentStatus,
    /// Date of the first confirm
    pub payment_date: NaiveDate,
    /// Date the transfer was marked completed
    pub transfer_date: Option<NaiveDate>,
    /// Last payment notice sent (Unix millis)
    pub notification_sent_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl CreatorPayment {
    pub fn amounts(&self) -> SettlementAmounts {
        SettlementAmounts {
            gross_sales: self.gross_sales,
            commission_amount: self.commission_amount,
            withholding_tax: self.withholding_tax,
            net_payment: self.net_payment,
            order_count: self.order_count,
            item_count: self.item_count,
        }
    }

    pub fn period(&self) -> AppResult<SettlementPeriod> {
        SettlementPeriod::new(self.target_year, self.target_month as u32)
    }

    pub fn is_completed(&self) -> bool {
        self.status == PaymentStatus::Completed
    }

    /// Explicit state view of the stored row
    pub fn state(&self) -> SettlementState {
        match self.status {
            PaymentStatus::Pending => SettlementState::Pending {
                payment_id: self.id,
                amounts: self.amounts(),
                payment_date: self.payment_date,
            },
            PaymentStatus::Completed => SettlementState::Completed {
                payment_id: self.id,
                amounts: self.amounts(),
                // CHECK constraint guarantees transfer_date on completed rows
                transfer_date: self.transfer_date.unwrap_or(self.payment_date),
            },
        }
    }
}
