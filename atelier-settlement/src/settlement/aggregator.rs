//! Sales aggregation (売上集計)
//!
//! Pure read over paid order lines. Repeated calls for the same range return
//! the same totals as long as the paid-order data does not change.

use std::collections::HashSet;

use shared::models::{PaidOrderLine, SalesBreakdown, SalesKind, SalesTotals};
use sqlx::SqlitePool;

use crate::db::repository::{RepoResult, sales};

/// Aggregate a creator's paid sales in `[start_millis, end_millis)`
///
/// No paid orders yields all-zero totals.
pub async fn aggregate(
    pool: &SqlitePool,
    creator_id: i64,
    start_millis: i64,
    end_millis: i64,
) -> RepoResult<SalesBreakdown> {
    let lines = sales::find_paid_lines(pool, creator_id, start_millis, end_millis).await?;
    let breakdown = summarize(&lines);
    tracing::debug!(
        creator_id,
        lines = lines.len(),
        gross_sales = breakdown.total.gross_sales,
        order_count = breakdown.total.order_count,
        "Sales aggregated"
    );
    Ok(breakdown)
}

/// Fold order lines into per-kind and combined totals
///
/// Order counts are distinct parent orders; an order holding both goods and
/// services counts once in `total`.
pub fn summarize(lines: &[PaidOrderLine]) -> SalesBreakdown {
    let mut breakdown = SalesBreakdown::default();
    let mut orders_by_kind: [HashSet<i64>; 2] = [HashSet::new(), HashSet::new()];
    let mut all_orders = HashSet::new();

    for line in lines {
        let (totals, orders) = match line.kind {
            SalesKind::Goods => (&mut breakdown.goods, &mut orders_by_kind[0]),
            SalesKind::Service => (&mut breakdown.service, &mut orders_by_kind[1]),
        };
        add_line(totals, line);
        orders.insert(line.order_id);
        add_line(&mut breakdown.total, line);
        all_orders.insert(line.order_id);
    }

    breakdown.goods.order_count = orders_by_kind[0].len() as i64;
    breakdown.service.order_count = orders_by_kind[1].len() as i64;
    breakdown.total.order_count = all_orders.len() as i64;
    breakdown
}

fn add_line(totals: &mut SalesTotals, line: &PaidOrderLine) {
    totals.gross_sales = totals.gross_sales.saturating_add(line.subtotal);
    totals.item_count = totals.item_count.saturating_add(line.quantity);
}
