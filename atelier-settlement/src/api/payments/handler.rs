//! Payment API Handlers

use axum::extract::{Path, State};
use shared::error::ApiResponse;
use shared::models::{CreatorPayment, SettlementResult};

use crate::api::{AppResult, settlement_response};
use crate::core::AppState;

/// GET /api/payments/:id - 获取单笔支払
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<CreatorPayment>> {
    let payment = state.settlement.ledger().payment(id).await?;
    Ok(ApiResponse::success(payment))
}

/// POST /api/payments/:id/complete - 振込完了
pub async fn complete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<SettlementResult<CreatorPayment>>> {
    let result = state.settlement.complete(id).await?;
    Ok(settlement_response(result))
}

/// POST /api/payments/:id/notify - 发送支払通知
pub async fn notify(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<SettlementResult<CreatorPayment>>> {
    let result = state.settlement.notify(id).await?;
    Ok(settlement_response(result))
}
