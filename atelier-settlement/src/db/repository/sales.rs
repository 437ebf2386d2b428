//! Paid sales read queries
//!
//! 时间范围统一使用半开区间 `[start, end)` (Unix millis)。

use shared::models::PaidOrderLine;
use sqlx::SqlitePool;

use super::RepoResult;

/// Paid order lines for products owned by `creator_id`
pub async fn find_paid_lines(
    pool: &SqlitePool,
    creator_id: i64,
    start_millis: i64,
    end_millis: i64,
) -> RepoResult<Vec<PaidOrderLine>> {
    let lines = sqlx::query_as::<_, PaidOrderLine>(
        "SELECT oi.order_id AS order_id, p.creator_id AS creator_id, oi.product_id AS product_id, p.kind AS kind, oi.quantity AS quantity, oi.subtotal AS subtotal, o.paid_at AS paid_at FROM order_items oi JOIN orders o ON o.id = oi.order_id JOIN products p ON p.id = oi.product_id WHERE p.creator_id = ? AND o.payment_status = 'paid' AND o.paid_at >= ? AND o.paid_at < ? ORDER BY o.paid_at, oi.id",
    )
    .bind(creator_id)
    .bind(start_millis)
    .bind(end_millis)
    .fetch_all(pool)
    .await?;
    Ok(lines)
}

/// Creators with at least one paid line in the range
pub async fn find_creators_with_sales(
    pool: &SqlitePool,
    start_millis: i64,
    end_millis: i64,
) -> RepoResult<Vec<i64>> {
    let ids = sqlx::query_scalar::<_, i64>(
        "SELECT DISTINCT p.creator_id FROM order_items oi JOIN orders o ON o.id = oi.order_id JOIN products p ON p.id = oi.product_id WHERE o.payment_status = 'paid' AND o.paid_at >= ? AND o.paid_at < ? ORDER BY p.creator_id",
    )
    .bind(start_millis)
    .bind(end_millis)
    .fetch_all(pool)
    .await?;
    Ok(ids)
}
