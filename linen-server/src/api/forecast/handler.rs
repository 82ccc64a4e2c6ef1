//! Forecast API Handlers

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use crate::core::ServerState;
use crate::services::projection;
use crate::utils::AppResult;
use shared::models::ForecastData;

/// Dashboard default horizon
const DEFAULT_DAYS: i64 = 45;
const MAX_DAYS: i64 = 365;

#[derive(Debug, Deserialize)]
pub struct ForecastQuery {
    pub days: Option<i64>,
}

/// Forward stock projection with shortage alerts
pub async fn forecast(
    State(state): State<ServerState>,
    Query(query): Query<ForecastQuery>,
) -> AppResult<Json<ForecastData>> {
    let days = query.days.unwrap_or(DEFAULT_DAYS).clamp(0, MAX_DAYS);
    let data = projection::forecast(&state.pool, days).await?;
    Ok(Json(data))
}
