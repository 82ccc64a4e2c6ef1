//! Settings API Module

mod handler;

use axum::{
    Router,
    routing::{get, put},
};

use crate::core::ServerState;

/// Settings router
pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/settings/{key}", get(handler::get_setting))
        .route("/api/settings/{key}", put(handler::put_setting))
}
