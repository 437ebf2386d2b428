//! Withholding tax on creator fees (源泉徴収)
//!
//! Two brackets on `taxable = gross − commission`:
//! - taxable ≤ 1,000,000: `floor(taxable × 10.21%)`
//! - otherwise: `floor((taxable − 1,000,000) × 20.42%) + 102,100`
//!
//! Every step truncates.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use shared::models::Creator;

/// 10.21%
const LOWER_RATE: Decimal = Decimal::from_parts(1021, 0, 0, false, 4);
/// 20.42%
const UPPER_RATE: Decimal = Decimal::from_parts(2042, 0, 0, false, 4);
const BRACKET_THRESHOLD: i64 = 1_000_000;
/// Tax on the full lower bracket
const BRACKET_BASE: i64 = 102_100;

/// Withholding for a creator's period
///
/// Zero unless the creator is an individual flagged for withholding and the
/// period has positive sales.
pub fn withholding(gross_sales: i64, commission: i64, creator: &Creator) -> i64 {
    if !creator.is_withholding_subject() || gross_sales <= 0 {
        return 0;
    }
    let taxable = gross_sales.saturating_sub(commission).max(0);
    tax_on(taxable)
}

/// Bracket formula on an already-derived taxable amount
pub fn tax_on(taxable: i64) -> i64 {
    if taxable <= 0 {
        return 0;
    }
    if taxable <= BRACKET_THRESHOLD {
        truncate(Decimal::from(taxable) * LOWER_RATE)
    } else {
        truncate(Decimal::from(taxable - BRACKET_THRESHOLD) * UPPER_RATE)
            .saturating_add(BRACKET_BASE)
    }
}

fn truncate(value: Decimal) -> i64 {
    value.floor().to_i64().unwrap_or(i64::MAX)
}
