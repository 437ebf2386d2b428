//! Remittance API Handlers

use axum::extract::{Path, State};
use shared::error::ApiResponse;
use shared::models::{RemittanceSummary, WithholdingTaxRemittance};

use crate::api::AppResult;
use crate::core::AppState;
use crate::utils::time;

/// GET /api/remittances/:year/:month - 源泉税合计与納付状态
pub async fn summary(
    State(state): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
) -> AppResult<ApiResponse<RemittanceSummary>> {
    let period = time::parse_period(year, month)?;
    let summary = state.settlement.remittance_summary(period).await?;
    Ok(ApiResponse::success(summary))
}

/// POST /api/remittances/:year/:month/paid - 标记已納付
pub async fn mark_paid(
    State(state): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
) -> AppResult<ApiResponse<WithholdingTaxRemittance>> {
    let period = time::parse_period(year, month)?;
    let record = state.settlement.mark_remittance_paid(period).await?;
    Ok(ApiResponse::success(record))
}
