//! Settlement ledger (支払台帳)
//!
//! State machine per (creator, period): absent → pending → completed.
//! - confirm: insert or overwrite a pending row; a completed row is refused
//! - complete: pending → completed; repeating it is a no-op
//! - notification timestamp is independent of status
//!
//! Every transition is a single-row statement, so amounts, net and status
//! are always written together.

use chrono::NaiveDate;
use shared::error::{AppError, ErrorCode};
use shared::models::{
    CreatorPayment, PaymentStatus, SettlementAmounts, SettlementPeriod, SettlementResult,
    SettlementState, WithholdingTaxRemittance,
};
use sqlx::SqlitePool;

use super::error::{EngineResult, SettlementError};
use crate::db::repository::{RepoError, creator_payment, remittance};

#[derive(Clone)]
pub struct SettlementLedger {
    pool: SqlitePool,
}

impl SettlementLedger {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Current state; absence of a row is `Unconfirmed`
    pub async fn state(
        &self,
        creator_id: i64,
        period: SettlementPeriod,
    ) -> EngineResult<SettlementState> {
        let payment = creator_payment::find_by_creator_period(&self.pool, creator_id, period).await?;
        Ok(payment
            .map(|p| p.state())
            .unwrap_or(SettlementState::Unconfirmed))
    }

    pub async fn payment(&self, payment_id: i64) -> EngineResult<CreatorPayment> {
        creator_payment::find_by_id(&self.pool, payment_id)
            .await?
            .ok_or(SettlementError::PaymentNotFound(payment_id))
    }

    pub async fn payments(
        &self,
        period: SettlementPeriod,
        status: Option<PaymentStatus>,
    ) -> EngineResult<Vec<CreatorPayment>> {
        Ok(creator_payment::find_by_period(&self.pool, period, status).await?)
    }

    /// Upsert the period's amounts as pending
    ///
    /// `payment_date` is set on the first confirm only. Confirming a
    /// completed row fails with [`SettlementError::AlreadyCompleted`].
    pub async fn confirm(
        &self,
        creator_id: i64,
        period: SettlementPeriod,
        amounts: &SettlementAmounts,
        today: NaiveDate,
    ) -> EngineResult<SettlementResult<CreatorPayment>> {
        if !amounts.is_consistent() {
            return Err(AppError::with_message(
                ErrorCode::InvalidSettlementAmount,
                format!("Net payment {} does not match its components", amounts.net_payment),
            )
            .into());
        }

        if let Some(payment) =
            creator_payment::upsert_pending(&self.pool, creator_id, period, amounts, today).await?
        {
            tracing::info!(
                payment_id = payment.id,
                creator_id,
                year = period.year(),
                month = period.month(),
                gross_sales = payment.gross_sales,
                net_payment = payment.net_payment,
                "Settlement confirmed"
            );
            return Ok(SettlementResult::committed(payment));
        }

        // The conflict row was not updated: it is completed
        match creator_payment::find_by_creator_period(&self.pool, creator_id, period).await? {
            Some(existing) if existing.is_completed() => {
                tracing::warn!(
                    payment_id = existing.id,
                    creator_id,
                    year = period.year(),
                    month = period.month(),
                    "Refusing to re-confirm a completed payment"
                );
                Err(SettlementError::AlreadyCompleted {
                    payment_id: existing.id,
                    creator_id,
                    period,
                })
            }
            _ => Err(RepoError::Database(format!(
                "Upsert of creator {creator_id} for {period} returned no row"
            ))
            .into()),
        }
    }

    /// pending → completed with `transfer_date = today`
    ///
    /// Completing an already-completed payment returns it unchanged
    /// (`committed = false`), keeping the original transfer date.
    pub async fn complete(
        &self,
        payment_id: i64,
        today: NaiveDate,
    ) -> EngineResult<SettlementResult<CreatorPayment>> {
        if let Some(payment) = creator_payment::mark_completed(&self.pool, payment_id, today).await? {
            tracing::info!(
                payment_id,
                creator_id = payment.creator_id,
                transfer_date = %today,
                "Payment completed"
            );
            return Ok(SettlementResult::committed(payment));
        }

        let existing = self.payment(payment_id).await?;
        if existing.is_completed() {
            tracing::debug!(payment_id, "Payment already completed, nothing to do");
            return Ok(SettlementResult::unchanged(existing));
        }
        Err(RepoError::Database(format!("Payment {payment_id} could not be completed")).into())
    }

    /// Timestamp a delivered payment notice; resending just moves the timestamp
    pub async fn record_notification_sent(
        &self,
        payment_id: i64,
        sent_at: i64,
    ) -> EngineResult<CreatorPayment> {
        creator_payment::set_notification_sent(&self.pool, payment_id, sent_at)
            .await?
            .ok_or(SettlementError::PaymentNotFound(payment_id))
    }

    /// Idempotent: repeated calls keep one row and refresh `paid_date`
    pub async fn mark_remittance_paid(
        &self,
        period: SettlementPeriod,
        total_amount: i64,
        due_date: NaiveDate,
        today: NaiveDate,
    ) -> EngineResult<WithholdingTaxRemittance> {
        let record =
            remittance::upsert_paid(&self.pool, period, total_amount, due_date, today).await?;
        tracing::info!(
            year = period.year(),
            month = period.month(),
            total_amount = record.total_amount,
            paid_date = %today,
            "Withholding tax remittance marked paid"
        );
        Ok(record)
    }
}
