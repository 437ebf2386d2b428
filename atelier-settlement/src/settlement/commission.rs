//! Platform commission (販売手数料)
//!
//! `floor(gross × rate / 100) + per_item × order_count`, in exact decimal
//! arithmetic. Rates are percentages with fractional precision.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use shared::models::CommissionSchedule;

/// Commission for one schedule
pub fn commission(gross_sales: i64, order_count: i64, schedule: &CommissionSchedule) -> i64 {
    let percentage = Decimal::from(gross_sales.max(0))
        .checked_mul(schedule.rate)
        .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED))
        .map(|v| v.floor())
        .and_then(|v| v.to_i64())
        .unwrap_or(i64::MAX);

    let fixed = schedule.per_item.saturating_mul(order_count.max(0));
    percentage.saturating_add(fixed)
}
