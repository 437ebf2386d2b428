//! Settlement API 模块 (月次精算)

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/settlements", routes())
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/default-period", get(handler::default_period))
        .route("/{year}/{month}", get(handler::preview))
        .route("/{year}/{month}/confirm", post(handler::confirm_period))
        .route(
            "/{year}/{month}/creators/{creator_id}/confirm",
            post(handler::confirm_creator),
        )
        .route("/{year}/{month}/notify", post(handler::notify_period))
        .route("/{year}/{month}/export/{format}", get(handler::export))
}
