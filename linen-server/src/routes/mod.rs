//! Route assembly

use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::core::ServerState;

/// Build a router with all routes registered (no middleware, no state)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        // Health API - public route
        .merge(api::health::router())
        // Catalog
        .merge(api::items::router())
        // Ledger mutations + revalidation signal
        .merge(api::stock::router())
        // Read-side projections
        .merge(api::forecast::router())
        .merge(api::history::router())
        // Import / sync
        .merge(api::bookings::router())
        .merge(api::stock_sheet::router())
        // Settings
        .merge(api::settings::router())
        // Scheduled sync entrypoint
        .merge(api::cron::router())
}

/// Build a fully configured application with all middleware
pub fn build_app() -> Router<ServerState> {
    build_router()
        // CORS - Handle cross-origin requests
        .layer(CorsLayer::permissive())
        // Compression - Gzip compress responses
        .layer(CompressionLayer::new())
        // Request logging - outermost, executed first
        .layer(TraceLayer::new_for_http())
}
