//! Withholding Tax Remittance Repository (源泉所得税 納付)

use chrono::NaiveDate;
use shared::models::{SettlementPeriod, WithholdingTaxRemittance};
use sqlx::SqlitePool;

use super::RepoResult;

const COLUMNS: &str = "id, target_year, target_month, total_amount, due_date, paid_date, status, created_at, updated_at";

pub async fn find_by_period(
    pool: &SqlitePool,
    period: SettlementPeriod,
) -> RepoResult<Option<WithholdingTaxRemittance>> {
    let remittance = sqlx::query_as::<_, WithholdingTaxRemittance>(&format!(
        "SELECT {COLUMNS} FROM withholding_tax_remittances WHERE target_year = ? AND target_month = ?"
    ))
    .bind(period.year())
    .bind(period.month() as i32)
    .fetch_optional(pool)
    .await?;
    Ok(remittance)
}

/// Upsert the period's remittance as paid
///
/// A row already marked paid keeps its total and due date; only `paid_date`
/// is refreshed.
pub async fn upsert_paid(
    pool: &SqlitePool,
    period: SettlementPeriod,
    total_amount: i64,
    due_date: NaiveDate,
    paid_date: NaiveDate,
) -> RepoResult<WithholdingTaxRemittance> {
    let now = shared::util::now_millis();
    let remittance = sqlx::query_as::<_, WithholdingTaxRemittance>(&format!(
        "INSERT INTO withholding_tax_remittances (id, target_year, target_month, total_amount, due_date, paid_date, status, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, 'paid', ?, ?) \
         ON CONFLICT (target_year, target_month) DO UPDATE SET \
         total_amount = CASE WHEN withholding_tax_remittances.status = 'paid' THEN withholding_tax_remittances.total_amount ELSE excluded.total_amount END, \
         due_date = CASE WHEN withholding_tax_remittances.status = 'paid' THEN withholding_tax_remittances.due_date ELSE excluded.due_date END, \
         paid_date = excluded.paid_date, status = 'paid', updated_at = excluded.updated_at \
         RETURNING {COLUMNS}"
    ))
    .bind(shared::util::snowflake_id())
    .bind(period.year())
    .bind(period.month() as i32)
    .bind(total_amount)
    .bind(due_date)
    .bind(paid_date)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?;
    Ok(remittance)
}
