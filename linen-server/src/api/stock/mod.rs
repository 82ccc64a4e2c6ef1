//! Stock API Module

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

/// Stock router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/stock", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/version", get(handler::version))
        .route("/delta", post(handler::delta))
        .route("/correction", post(handler::correction))
        .route("/batch", post(handler::batch))
}
