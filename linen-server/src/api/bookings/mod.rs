//! Bookings API Module

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

/// Bookings router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/bookings", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/import", post(handler::import))
        .route("/analyze", post(handler::analyze))
        .route("/sync", post(handler::sync))
}
