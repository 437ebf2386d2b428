//! Settlement service
//!
//! Orchestrates the engine for one operator action: aggregate → calculate →
//! ledger write, then the best-effort side effects (notice email, notice
//! archival). Ledger state is committed before any gateway is called; a
//! gateway failure is reported as a [`SideEffectOutcome`] and never rolls
//! the ledger back.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::Serialize;
use shared::error::ErrorCode;
use shared::models::{
    Creator, CreatorPayment, CreatorSettlement, PaymentStatus, RemittanceStatus,
    RemittanceSummary, SettlementPeriod, SettlementResult, SideEffect, SideEffectOutcome,
    WithholdingTaxRemittance,
};
use shared::util::now_millis;
use sqlx::SqlitePool;

use super::error::{EngineResult, SettlementError};
use super::export::{ExportFile, ExportFormat, ExportFormatter, ExportRow, SkippedRow};
use super::ledger::SettlementLedger;
use super::notice::{self, PaymentNotice};
use super::{aggregator, calculate};
use crate::db::repository::{RepoError, creator, creator_payment, remittance, sales};
use crate::gateways::{ArchivalGateway, NotificationGateway, with_timeout};
use crate::utils::time;

const DEFAULT_GATEWAY_TIMEOUT: Duration = Duration::from_secs(10);

/// A creator that a bulk operation could not process
#[derive(Debug, Clone, Serialize)]
pub struct CreatorFailure {
    pub creator_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<i64>,
    pub code: ErrorCode,
    pub message: String,
}

impl CreatorFailure {
    fn new(creator_id: i64, payment_id: Option<i64>, err: &SettlementError) -> Self {
        Self {
            creator_id,
            payment_id,
            code: err.code(),
            message: err.to_string(),
        }
    }
}

/// Dry-run lines plus the creators whose data could not be priced
#[derive(Debug, Clone, Serialize)]
pub struct PreviewReport {
    pub period: SettlementPeriod,
    pub lines: Vec<CreatorSettlement>,
    pub failed: Vec<CreatorFailure>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BulkConfirmReport {
    pub period: SettlementPeriod,
    pub confirmed: Vec<CreatorPayment>,
    pub failed: Vec<CreatorFailure>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NotifyReport {
    pub period: SettlementPeriod,
    pub results: Vec<SettlementResult<CreatorPayment>>,
    pub skipped: Vec<CreatorFailure>,
}

impl NotifyReport {
    /// Notices that reached the gateway but were not delivered
    pub fn failed_count(&self) -> usize {
        self.results.iter().filter(|r| !r.committed).count()
    }
}

#[derive(Clone)]
pub struct SettlementService {
    pool: SqlitePool,
    ledger: SettlementLedger,
    timezone: Tz,
    notifier: Arc<dyn NotificationGateway>,
    archive: Arc<dyn ArchivalGateway>,
    gateway_timeout: Duration,
    formatter: ExportFormatter,
}

impl SettlementService {
    pub fn new(
        pool: SqlitePool,
        timezone: Tz,
        notifier: Arc<dyn NotificationGateway>,
        archive: Arc<dyn ArchivalGateway>,
    ) -> Self {
        Self {
            ledger: SettlementLedger::new(pool.clone()),
            pool,
            timezone,
            notifier,
            archive,
            gateway_timeout: DEFAULT_GATEWAY_TIMEOUT,
            formatter: ExportFormatter::default(),
        }
    }

    pub fn with_gateway_timeout(mut self, timeout: Duration) -> Self {
        self.gateway_timeout = timeout;
        self
    }

    pub fn with_memo_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.formatter = ExportFormatter::new(prefix);
        self
    }

    pub fn ledger(&self) -> &SettlementLedger {
        &self.ledger
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    fn today(&self) -> NaiveDate {
        time::today(self.timezone)
    }

    async fn creator(&self, creator_id: i64) -> EngineResult<Creator> {
        creator::find_by_id(&self.pool, creator_id)
            .await?
            .ok_or(SettlementError::CreatorNotFound(creator_id))
    }

    // ========== Computation ==========

    /// Dry run over every active creator; nothing is written
    ///
    /// A creator with an unusable commission schedule is listed in `failed`
    /// and the rest are still priced.
    pub async fn preview(&self, period: SettlementPeriod) -> EngineResult<PreviewReport> {
        let (start, end) = period.bounds_millis(self.timezone);
        let creators = creator::find_active(&self.pool).await?;

        let mut report = PreviewReport {
            period,
            lines: Vec::with_capacity(creators.len()),
            failed: Vec::new(),
        };
        for entry in creators {
            let creator = match entry {
                Ok(creator) => creator,
                Err(RepoError::InvalidCommission { creator_id, reason }) => {
                    let e = SettlementError::from(RepoError::InvalidCommission { creator_id, reason });
                    tracing::warn!(creator_id, period = %period, error = %e, "Preview skipped");
                    report.failed.push(CreatorFailure::new(creator_id, None, &e));
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let sales = aggregator::aggregate(&self.pool, creator.id, start, end).await?;
            let computed = match calculate(&creator, &sales) {
                Ok(computed) => computed,
                Err(e) => {
                    let e = SettlementError::from(e);
                    tracing::warn!(creator_id = creator.id, period = %period, error = %e, "Preview skipped");
                    report.failed.push(CreatorFailure::new(creator.id, None, &e));
                    continue;
                }
            };
            let state = self.ledger.state(creator.id, period).await?;
            report.lines.push(CreatorSettlement {
                creator_id: creator.id,
                creator_name: creator.name,
                sales,
                computed,
                state,
            });
        }
        Ok(report)
    }

    /// Recompute one creator's month and store it as pending
    pub async fn confirm(
        &self,
        creator_id: i64,
        period: SettlementPeriod,
    ) -> EngineResult<SettlementResult<CreatorPayment>> {
        let creator = self.creator(creator_id).await?;
        let (start, end) = period.bounds_millis(self.timezone);
        let sales = aggregator::aggregate(&self.pool, creator.id, start, end).await?;
        let amounts = calculate(&creator, &sales)?;
        self.ledger
            .confirm(creator.id, period, &amounts, self.today())
            .await
    }

    /// Confirm every creator with paid sales in the period
    ///
    /// One creator failing (already completed, bad schedule) does not stop
    /// the others.
    pub async fn confirm_period(&self, period: SettlementPeriod) -> EngineResult<BulkConfirmReport> {
        let (start, end) = period.bounds_millis(self.timezone);
        let creator_ids = sales::find_creators_with_sales(&self.pool, start, end).await?;

        let mut report = BulkConfirmReport {
            period,
            confirmed: Vec::with_capacity(creator_ids.len()),
            failed: Vec::new(),
        };
        for creator_id in creator_ids {
            match self.confirm(creator_id, period).await {
                Ok(result) => report.confirmed.push(result.record),
                Err(e) => {
                    tracing::warn!(creator_id, period = %period, error = %e, "Confirm skipped");
                    report.failed.push(CreatorFailure::new(creator_id, None, &e));
                }
            }
        }

        tracing::info!(
            year = period.year(),
            month = period.month(),
            confirmed = report.confirmed.len(),
            failed = report.failed.len(),
            "Period confirmed"
        );
        Ok(report)
    }

    // ========== Transfer ==========

    /// Mark the transfer done, then archive the payment notice
    ///
    /// A repeat call returns the stored row with no side effects.
    pub async fn complete(&self, payment_id: i64) -> EngineResult<SettlementResult<CreatorPayment>> {
        let result = self.ledger.complete(payment_id, self.today()).await?;
        if !result.committed {
            return Ok(result);
        }

        let outcome = match self.compose_notice(&result.record).await {
            Ok((_, notice)) => self.archive_notice(&notice).await,
            Err(e) => {
                tracing::warn!(payment_id, error = %e, "Cannot build notice for archival");
                SideEffectOutcome::skipped(SideEffect::Archival, e.to_string())
            }
        };
        Ok(result.with_side_effect(outcome))
    }

    /// Pending rows of the period as a Shift-JIS file
    pub async fn export(
        &self,
        period: SettlementPeriod,
        format: ExportFormat,
    ) -> EngineResult<ExportFile> {
        let payments = self
            .ledger
            .payments(period, Some(PaymentStatus::Pending))
            .await?;

        let mut rows = Vec::with_capacity(payments.len());
        let mut unresolved = Vec::new();
        for payment in payments {
            match creator::find_by_id(&self.pool, payment.creator_id).await {
                Ok(Some(creator)) => rows.push(ExportRow { payment, creator }),
                Ok(None) => unresolved.push(SkippedRow {
                    payment_id: payment.id,
                    creator_id: payment.creator_id,
                    creator_name: String::new(),
                    code: ErrorCode::CreatorNotFound,
                    reason: format!("Creator {} not found", payment.creator_id),
                }),
                Err(e @ RepoError::InvalidCommission { .. }) => unresolved.push(SkippedRow {
                    payment_id: payment.id,
                    creator_id: payment.creator_id,
                    creator_name: String::new(),
                    code: ErrorCode::InvalidCommissionSchedule,
                    reason: e.to_string(),
                }),
                Err(e) => return Err(e.into()),
            }
        }

        if !unresolved.is_empty() {
            tracing::warn!(period = %period, count = unresolved.len(), "Payments without a usable creator left out of export");
        }
        let mut file = self.formatter.render(period, &rows, format)?;
        file.skipped.extend(unresolved);
        Ok(file)
    }

    // ========== Notices ==========

    /// Send the payment notice, stamp it, then archive it
    ///
    /// A failed send leaves the ledger untouched and comes back as
    /// `committed = false` with a failed notification outcome.
    pub async fn notify(&self, payment_id: i64) -> EngineResult<SettlementResult<CreatorPayment>> {
        let payment = self.ledger.payment(payment_id).await?;
        let (creator, notice) = self.compose_notice(&payment).await?;
        let recipient = creator
            .contact_email()
            .ok_or(SettlementError::EmailMissing {
                creator_id: creator.id,
            })?;

        let sent = with_timeout(
            self.gateway_timeout,
            self.notifier.send(recipient, &notice.subject, &notice.body),
        )
        .await;

        match sent {
            Ok(reference) => {
                let updated = self
                    .ledger
                    .record_notification_sent(payment.id, now_millis())
                    .await?;
                tracing::info!(payment_id, creator_id = creator.id, "Payment notice sent");
                let archived = self.archive_notice(&notice).await;
                Ok(SettlementResult::committed(updated)
                    .with_side_effect(SideEffectOutcome::delivered(
                        SideEffect::Notification,
                        reference,
                    ))
                    .with_side_effect(archived))
            }
            Err(e) => {
                tracing::warn!(
                    payment_id,
                    creator_id = creator.id,
                    error = %e,
                    "Payment notice delivery failed"
                );
                Ok(SettlementResult::unchanged(payment).with_side_effect(
                    SideEffectOutcome::failed(SideEffect::Notification, e.to_string()),
                ))
            }
        }
    }

    /// Notify every payment row of the period
    ///
    /// Creators without an email address are listed in `skipped`.
    pub async fn notify_period(&self, period: SettlementPeriod) -> EngineResult<NotifyReport> {
        let payments = self.ledger.payments(period, None).await?;
        let mut report = NotifyReport {
            period,
            results: Vec::with_capacity(payments.len()),
            skipped: Vec::new(),
        };

        for payment in payments {
            match self.notify(payment.id).await {
                Ok(result) => report.results.push(result),
                Err(e) => {
                    tracing::debug!(payment_id = payment.id, error = %e, "Notice skipped");
                    report
                        .skipped
                        .push(CreatorFailure::new(payment.creator_id, Some(payment.id), &e));
                }
            }
        }

        tracing::info!(
            year = period.year(),
            month = period.month(),
            sent = report.results.len() - report.failed_count(),
            failed = report.failed_count(),
            skipped = report.skipped.len(),
            "Period notices processed"
        );
        Ok(report)
    }

    async fn compose_notice(
        &self,
        payment: &CreatorPayment,
    ) -> EngineResult<(Creator, PaymentNotice)> {
        let creator = self.creator(payment.creator_id).await?;
        let period = payment.period()?;
        let notice = notice::compose(&creator, payment, period);
        Ok((creator, notice))
    }

    async fn archive_notice(&self, notice: &PaymentNotice) -> SideEffectOutcome {
        let saved = with_timeout(
            self.gateway_timeout,
            self.archive
                .save_document(&notice.html, &notice.filename, &notice.folder),
        )
        .await;

        match saved {
            Ok(document_id) => SideEffectOutcome::delivered(SideEffect::Archival, Some(document_id)),
            Err(e) if e.is_disabled() => {
                tracing::debug!(filename = %notice.filename, "Archival disabled");
                SideEffectOutcome::skipped(SideEffect::Archival, e.to_string())
            }
            Err(e) => {
                tracing::warn!(filename = %notice.filename, error = %e, "Notice archival failed");
                SideEffectOutcome::failed(SideEffect::Archival, e.to_string())
            }
        }
    }

    // ========== Withholding tax remittance ==========

    pub async fn remittance_summary(&self, period: SettlementPeriod) -> EngineResult<RemittanceSummary> {
        let (total_withheld, withheld_payment_count) =
            creator_payment::withheld_total(&self.pool, period).await?;
        let record = remittance::find_by_period(&self.pool, period).await?;

        Ok(RemittanceSummary {
            period,
            total_withheld,
            withheld_payment_count,
            due_date: record
                .as_ref()
                .map(|r| r.due_date)
                .unwrap_or_else(|| period.remittance_due_date()),
            status: record
                .as_ref()
                .map(|r| r.status)
                .unwrap_or(RemittanceStatus::Unpaid),
            record,
        })
    }

    /// Record the period's withheld total as remitted today
    pub async fn mark_remittance_paid(
        &self,
        period: SettlementPeriod,
    ) -> EngineResult<WithholdingTaxRemittance> {
        let (total_withheld, _) = creator_payment::withheld_total(&self.pool, period).await?;
        self.ledger
            .mark_remittance_paid(
                period,
                total_withheld,
                period.remittance_due_date(),
                self.today(),
            )
            .await
    }
}
