//! Creator Payment Repository (月次支払)
//!
//! 一个 (creator_id, target_year, target_month) 只有一行；
//! UNIQUE 索引 + ON CONFLICT 保证并发确认时不会重复插入。

use chrono::NaiveDate;
use shared::models::{CreatorPayment, PaymentStatus, SettlementAmounts, SettlementPeriod};
use sqlx::SqlitePool;

use super::RepoResult;

const COLUMNS: &str = "id, creator_id, target_year, target_month, gross_sales, commission_amount, withholding_tax, net_payment, order_count, item_count, status, payment_date, transfer_date, notification_sent_at, created_at, updated_at";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<CreatorPayment>> {
    let payment = sqlx::query_as::<_, CreatorPayment>(&format!(
        "SELECT {COLUMNS} FROM creator_payments WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(payment)
}

pub async fn find_by_creator_period(
    pool: &SqlitePool,
    creator_id: i64,
    period: SettlementPeriod,
) -> RepoResult<Option<CreatorPayment>> {
    let payment = sqlx::query_as::<_, CreatorPayment>(&format!(
        "SELECT {COLUMNS} FROM creator_payments WHERE creator_id = ? AND target_year = ? AND target_month = ?"
    ))
    .bind(creator_id)
    .bind(period.year())
    .bind(period.month() as i32)
    .fetch_optional(pool)
    .await?;
    Ok(payment)
}

/// Rows of a period, optionally filtered by status, ordered by creator
pub async fn find_by_period(
    pool: &SqlitePool,
    period: SettlementPeriod,
    status: Option<PaymentStatus>,
) -> RepoResult<Vec<CreatorPayment>> {
    let payments = match status {
        Some(status) => {
            sqlx::query_as::<_, CreatorPayment>(&format!(
                "SELECT {COLUMNS} FROM creator_payments WHERE target_year = ? AND target_month = ? AND status = ? ORDER BY creator_id"
            ))
            .bind(period.year())
            .bind(period.month() as i32)
            .bind(status)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, CreatorPayment>(&format!(
                "SELECT {COLUMNS} FROM creator_payments WHERE target_year = ? AND target_month = ? ORDER BY creator_id"
            ))
            .bind(period.year())
            .bind(period.month() as i32)
            .fetch_all(pool)
            .await?
        }
    };
    Ok(payments)
}

/// Insert a pending row, or overwrite the amounts of the existing pending row
///
/// Single statement: amounts, counts and net are written together. Returns
/// `None` when the existing row is completed (left untouched).
/// `payment_date` is only set on insert.
pub async fn upsert_pending(
    pool: &SqlitePool,
    creator_id: i64,
    period: SettlementPeriod,
    amounts: &SettlementAmounts,
    payment_date: NaiveDate,
) -> RepoResult<Option<CreatorPayment>> {
    let now = shared::util::now_millis();
    let payment = sqlx::query_as::<_, CreatorPayment>(&format!(
        "INSERT INTO creator_payments (id, creator_id, target_year, target_month, gross_sales, commission_amount, withholding_tax, net_payment, order_count, item_count, status, payment_date, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 'pending', ?, ?, ?) \
         ON CONFLICT (creator_id, target_year, target_month) DO UPDATE SET \
         gross_sales = excluded.gross_sales, commission_amount = excluded.commission_amount, withholding_tax = excluded.withholding_tax, net_payment = excluded.net_payment, \
         order_count = excluded.order_count, item_count = excluded.item_count, updated_at = excluded.updated_at \
         WHERE creator_payments.status = 'pending' \
         RETURNING {COLUMNS}"
    ))
    .bind(shared::util::snowflake_id())
    .bind(creator_id)
    .bind(period.year())
    .bind(period.month() as i32)
    .bind(amounts.gross_sales)
    .bind(amounts.commission_amount)
    .bind(amounts.withholding_tax)
    .bind(amounts.net_payment)
    .bind(amounts.order_count)
    .bind(amounts.item_count)
    .bind(payment_date)
    .bind(now)
    .bind(now)
    .fetch_optional(pool)
    .await?;
    Ok(payment)
}

/// pending → completed. Returns `None` if the row is missing or not pending.
pub async fn mark_completed(
    pool: &SqlitePool,
    id: i64,
    transfer_date: NaiveDate,
) -> RepoResult<Option<CreatorPayment>> {
    let payment = sqlx::query_as::<_, CreatorPayment>(&format!(
        "UPDATE creator_payments SET status = 'completed', transfer_date = ?, updated_at = ? WHERE id = ? AND status = 'pending' RETURNING {COLUMNS}"
    ))
    .bind(transfer_date)
    .bind(shared::util::now_millis())
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(payment)
}

/// Timestamp the last payment notice; independent of status
pub async fn set_notification_sent(
    pool: &SqlitePool,
    id: i64,
    sent_at: i64,
) -> RepoResult<Option<CreatorPayment>> {
    let payment = sqlx::query_as::<_, CreatorPayment>(&format!(
        "UPDATE creator_payments SET notification_sent_at = ?, updated_at = ? WHERE id = ? RETURNING {COLUMNS}"
    ))
    .bind(sent_at)
    .bind(shared::util::now_millis())
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(payment)
}

/// (withheld total, number of rows with withholding) for a period
pub async fn withheld_total(pool: &SqlitePool, period: SettlementPeriod) -> RepoResult<(i64, i64)> {
    let totals = sqlx::query_as::<_, (i64, i64)>(
        "SELECT COALESCE(SUM(withholding_tax), 0), COUNT(*) FROM creator_payments WHERE target_year = ? AND target_month = ? AND withholding_tax > 0",
    )
    .bind(period.year())
    .bind(period.month() as i32)
    .fetch_one(pool)
    .await?;
    Ok(totals)
}
