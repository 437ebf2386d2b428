//! 结算引擎 (売上精算)
//!
//! # 模块结构
//!
//! - [`aggregator`] - 売上集計: paid order lines → totals
//! - [`commission`] - 手数料計算
//! - [`withholding`] - 源泉徴収税計算
//! - [`ledger`] - 支払台帳 state machine
//! - [`notice`] - 支払明細 notice text / HTML
//! - [`export`] - Shift-JIS CSV exports
//! - [`service`] - orchestration + best-effort side effects

pub mod aggregator;
pub mod commission;
pub mod error;
pub mod export;
pub mod ledger;
pub mod notice;
pub mod service;
pub mod withholding;

pub use error::{EngineResult, SettlementError};
pub use export::{ExportFile, ExportFormat, ExportFormatter, ExportRow, SkippedRow};
pub use ledger::SettlementLedger;
pub use service::{
    BulkConfirmReport, CreatorFailure, NotifyReport, PreviewReport, SettlementService,
};

use shared::error::AppResult;
use shared::models::{Creator, SalesBreakdown, SalesKind, SettlementAmounts};

/// Monthly amounts for one creator
///
/// Each sales kind is charged with its own schedule, the results are summed
/// and capped at gross so net never goes negative. Withholding is taken from
/// what remains after commission.
pub fn calculate(creator: &Creator, sales: &SalesBreakdown) -> AppResult<SettlementAmounts> {
    let gross_sales = sales.total.gross_sales;
    let commission_amount = SalesKind::ALL
        .iter()
        .map(|kind| {
            let totals = sales.for_kind(*kind);
            commission::commission(
                totals.gross_sales,
                totals.order_count,
                creator.commission_schedule(*kind),
            )
        })
        .fold(0_i64, i64::saturating_add)
        .min(gross_sales);
    let withholding_tax = withholding::withholding(gross_sales, commission_amount, creator);

    SettlementAmounts::new(
        gross_sales,
        commission_amount,
        withholding_tax,
        sales.total.order_count,
        sales.total.item_count,
    )
}
