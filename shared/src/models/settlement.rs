//! Settlement amounts, state and side-effect outcomes

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::sales::SalesBreakdown;
use crate::error::{AppError, AppResult, ErrorCode};

/// The four money fields of a payment plus the counts they were derived from
///
/// Construct through [`SettlementAmounts::new`]: `net_payment` is always
/// `gross_sales - commission_amount - withholding_tax`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SettlementAmounts {
    pub gross_sales: i64,
    pub commission_amount: i64,
    pub withholding_tax: i64,
    pub net_payment: i64,
    pub order_count: i64,
    pub item_count: i64,
}

impl SettlementAmounts {
    pub fn new(
        gross_sales: i64,
        commission_amount: i64,
        withholding_tax: i64,
        order_count: i64,
        item_count: i64,
    ) -> AppResult<Self> {
        if gross_sales < 0
            || commission_amount < 0
            || withholding_tax < 0
            || order_count < 0
            || item_count < 0
        {
            return Err(AppError::with_message(
                ErrorCode::InvalidSettlementAmount,
                "Settlement amounts and counts must be non-negative",
            ));
        }
        let net_payment = gross_sales
            .checked_sub(commission_amount)
            .and_then(|v| v.checked_sub(withholding_tax))
            .filter(|v| *v >= 0)
            .ok_or_else(|| {
                AppError::with_message(
                    ErrorCode::InvalidSettlementAmount,
                    format!(
                        "Deductions exceed gross sales: gross={gross_sales}, commission={commission_amount}, withholding={withholding_tax}"
                    ),
                )
            })?;

        Ok(Self {
            gross_sales,
            commission_amount,
            withholding_tax,
            net_payment,
            order_count,
            item_count,
        })
    }

    pub fn zero() -> Self {
        Self::default()
    }

    /// Net invariant check for values read back from storage
    pub fn is_consistent(&self) -> bool {
        self.net_payment == self.gross_sales - self.commission_amount - self.withholding_tax
            && self.net_payment >= 0
    }
}

/// Ledger state of one (creator, period)
///
/// Storage keeps row absence / `status`; code works with this variant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SettlementState {
    /// No payment row yet
    Unconfirmed,
    /// Confirmed, awaiting bank transfer; may be recomputed
    Pending {
        payment_id: i64,
        amounts: SettlementAmounts,
        payment_date: NaiveDate,
    },
    /// Transferred; terminal
    Completed {
        payment_id: i64,
        amounts: SettlementAmounts,
        transfer_date: NaiveDate,
    },
}

impl SettlementState {
    pub fn payment_id(&self) -> Option<i64> {
        match self {
            Self::Unconfirmed => None,
            Self::Pending { payment_id, .. } | Self::Completed { payment_id, .. } => {
                Some(*payment_id)
            }
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

/// One creator's line in a settlement preview
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatorSettlement {
    pub creator_id: i64,
    pub creator_name: String,
    pub sales: SalesBreakdown,
    /// Freshly computed from current sales
    pub computed: SettlementAmounts,
    /// What the ledger currently holds
    pub state: SettlementState,
}

/// Which external side effect was attempted
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SideEffect {
    Notification,
    Archival,
}

/// Outcome of a best-effort side effect
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SideEffectStatus {
    Delivered { reference: Option<String> },
    Failed { reason: String },
    Skipped { reason: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SideEffectOutcome {
    pub effect: SideEffect,
    #[serde(flatten)]
    pub status: SideEffectStatus,
}

impl SideEffectOutcome {
    pub fn delivered(effect: SideEffect, reference: Option<String>) -> Self {
        Self {
            effect,
            status: SideEffectStatus::Delivered { reference },
        }
    }

    pub fn failed(effect: SideEffect, reason: impl Into<String>) -> Self {
        Self {
            effect,
            status: SideEffectStatus::Failed {
                reason: reason.into(),
            },
        }
    }

    pub fn skipped(effect: SideEffect, reason: impl Into<String>) -> Self {
        Self {
            effect,
            status: SideEffectStatus::Skipped {
                reason: reason.into(),
            },
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.status, SideEffectStatus::Failed { .. })
    }
}

/// Result of a ledger operation with side effects
///
/// `committed` tells whether the ledger write happened; side-effect failures
/// never flip it back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementResult<T> {
    pub committed: bool,
    pub record: T,
    pub side_effects: Vec<SideEffectOutcome>,
}

impl<T> SettlementResult<T> {
    pub fn committed(record: T) -> Self {
        Self {
            committed: true,
            record,
            side_effects: Vec::new(),
        }
    }

    /// Nothing was written (idempotent repeat)
    pub fn unchanged(record: T) -> Self {
        Self {
            committed: false,
            record,
            side_effects: Vec::new(),
        }
    }

    pub fn with_side_effect(mut self, outcome: SideEffectOutcome) -> Self {
        self.side_effects.push(outcome);
        self
    }

    /// Soft warnings for the operator (failed side effects)
    pub fn warnings(&self) -> Vec<String> {
        self.side_effects
            .iter()
            .filter_map(|o| match &o.status {
                SideEffectStatus::Failed { reason } => {
                    let name = match o.effect {
                        SideEffect::Notification => "notification",
                        SideEffect::Archival => "archival",
                    };
                    Some(format!("{name} failed: {reason}"))
                }
                _ => None,
            })
            .collect()
    }
}
