//! Remittance API 模块 (源泉所得税 納付)

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/remittances", routes())
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/{year}/{month}", get(handler::summary))
        .route("/{year}/{month}/paid", post(handler::mark_paid))
}
