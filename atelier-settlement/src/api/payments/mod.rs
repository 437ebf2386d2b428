//! Payment API 模块 (支払)

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/payments", routes())
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/complete", post(handler::complete))
        .route("/{id}/notify", post(handler::notify))
}
