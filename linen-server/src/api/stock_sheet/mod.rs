//! Stock Sheet API Module

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

/// Stock-sheet sync router
pub fn router() -> Router<ServerState> {
    Router::new().route("/api/stock-sheet/sync", post(handler::sync))
}
