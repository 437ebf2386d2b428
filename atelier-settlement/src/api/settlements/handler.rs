//! Settlement API Handlers

use axum::{
    extract::{Path, State},
    http::{HeaderMap, HeaderName, HeaderValue, header},
    response::{IntoResponse, Response},
};
use shared::error::ApiResponse;
use shared::models::{CreatorPayment, SettlementPeriod, SettlementResult};

use crate::api::{AppError, AppResult, settlement_response};
use crate::core::AppState;
use crate::settlement::{BulkConfirmReport, ExportFormat, NotifyReport, PreviewReport};
use crate::utils::time;

/// GET /api/settlements/default-period - 默认结算月 (上个月)
pub async fn default_period(State(state): State<AppState>) -> ApiResponse<SettlementPeriod> {
    ApiResponse::success(time::default_period(state.config.timezone))
}

/// GET /api/settlements/:year/:month - 精算预览 (不写入)
pub async fn preview(
    State(state): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
) -> AppResult<ApiResponse<PreviewReport>> {
    let period = time::parse_period(year, month)?;
    let report = state.settlement.preview(period).await?;
    if report.failed.is_empty() {
        Ok(ApiResponse::success(report))
    } else {
        let message = format!("{} creator(s) could not be previewed", report.failed.len());
        Ok(ApiResponse::success_with_message(message, report))
    }
}

/// POST /api/settlements/:year/:month/confirm - 批量确定
pub async fn confirm_period(
    State(state): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
) -> AppResult<ApiResponse<BulkConfirmReport>> {
    let period = time::parse_period(year, month)?;
    let report = state.settlement.confirm_period(period).await?;
    if report.failed.is_empty() {
        Ok(ApiResponse::success(report))
    } else {
        let message = format!("{} creator(s) could not be confirmed", report.failed.len());
        Ok(ApiResponse::success_with_message(message, report))
    }
}

/// POST /api/settlements/:year/:month/creators/:creator_id/confirm - 单个确定
pub async fn confirm_creator(
    State(state): State<AppState>,
    Path((year, month, creator_id)): Path<(i32, u32, i64)>,
) -> AppResult<ApiResponse<SettlementResult<CreatorPayment>>> {
    let period = time::parse_period(year, month)?;
    let result = state.settlement.confirm(creator_id, period).await?;
    Ok(settlement_response(result))
}

/// POST /api/settlements/:year/:month/notify - 批量发送支払通知
pub async fn notify_period(
    State(state): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
) -> AppResult<ApiResponse<NotifyReport>> {
    let period = time::parse_period(year, month)?;
    let report = state.settlement.notify_period(period).await?;
    let failed = report.failed_count();
    if failed == 0 {
        Ok(ApiResponse::success(report))
    } else {
        let message = format!("{failed} notice(s) could not be delivered");
        Ok(ApiResponse::success_with_message(message, report))
    }
}

/// GET /api/settlements/:year/:month/export/:format - 下载 CSV (Shift-JIS)
pub async fn export(
    State(state): State<AppState>,
    Path((year, month, format)): Path<(i32, u32, String)>,
) -> AppResult<Response> {
    let period = time::parse_period(year, month)?;
    let format: ExportFormat = format.parse()?;
    let file = state.settlement.export(period, format).await?;

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, header_value(&file.content_type)?);
    headers.insert(
        header::CONTENT_DISPOSITION,
        header_value(&format!("attachment; filename=\"{}\"", file.filename))?,
    );
    headers.insert(
        HeaderName::from_static("x-export-rows"),
        HeaderValue::from(file.row_count),
    );
    headers.insert(
        HeaderName::from_static("x-export-skipped"),
        HeaderValue::from(file.skipped.len()),
    );

    Ok((headers, file.bytes).into_response())
}

fn header_value(value: &str) -> AppResult<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| AppError::internal(format!("Invalid header value {value:?}: {e}")))
}
