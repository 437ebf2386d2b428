//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`settlements`] - 月次精算 (preview / confirm / notify / export)
//! - [`payments`] - 单笔支払 (complete / notify)
//! - [`remittances`] - 源泉所得税 納付
//!
//! 响应统一使用 [`ApiResponse`]，错误经由 [`AppError`] 转换。

pub mod health;
pub mod payments;
pub mod remittances;
pub mod settlements;

use axum::Router;
use shared::error::ApiResponse;
use shared::models::SettlementResult;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::AppState;

pub use shared::error::{AppError, AppResult};

/// All routes without middleware
pub fn build_router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(settlements::router())
        .merge(payments::router())
        .merge(remittances::router())
}

/// Routes + middleware + state, ready for `axum::serve` or `oneshot`
pub fn build_app(state: AppState) -> Router {
    build_router()
        // CORS - operator console runs on another origin
        .layer(CorsLayer::permissive())
        // Trace - request tracing (INFO)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Committed results with failed side effects carry the warnings as message
pub(crate) fn settlement_response<T>(
    result: SettlementResult<T>,
) -> ApiResponse<SettlementResult<T>> {
    let warnings = result.warnings();
    if warnings.is_empty() {
        ApiResponse::success(result)
    } else {
        ApiResponse::success_with_message(warnings.join("; "), result)
    }
}
