//! History API Module

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

/// History router
pub fn router() -> Router<ServerState> {
    Router::new().route("/api/history", get(handler::history))
}
