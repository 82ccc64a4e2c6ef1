//! Cron API Module

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

/// Scheduled-sync router
pub fn router() -> Router<ServerState> {
    Router::new().route("/api/cron/daily-checkin", get(handler::daily_checkin))
}
