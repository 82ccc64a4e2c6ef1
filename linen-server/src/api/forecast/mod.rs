//! Forecast API Module

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

/// Forecast router
pub fn router() -> Router<ServerState> {
    Router::new().route("/api/forecast", get(handler::forecast))
}
