//! Stock API Handlers
//!
//! Mutations answer with the action-result object (`success`/`error`);
//! errors from the mutation service never surface as HTTP faults.

use axum::{Json, extract::State};
use serde::Serialize;
use serde_json::{Value, json};

use crate::core::{RESOURCE_FORECAST, RESOURCE_STOCK, ServerState};
use crate::db::repository::{item, stock};
use crate::utils::{AppResponse, AppResult};
use shared::models::{
    StockBatchRequest, StockCorrectionRequest, StockDeltaRequest, StockSnapshot,
};

/// Snapshot joined with item display fields
#[derive(Debug, Serialize)]
pub struct StockView {
    pub item_id: String,
    pub name: String,
    pub unit: String,
    pub shelf_count: i64,
    pub updated_at: i64,
}

/// Current shelf stock for every item (missing snapshot rows read as zero)
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<StockView>>> {
    let items = item::find_all(&state.pool).await?;
    let snapshots = stock::find_all_snapshots(&state.pool).await?;

    let views = items
        .into_iter()
        .map(|item| {
            let snapshot = snapshots.iter().find(|s| s.item_id == item.id);
            StockView {
                item_id: item.id,
                name: item.name,
                unit: item.unit,
                shelf_count: snapshot.map(|s| s.shelf_count).unwrap_or(0),
                updated_at: snapshot.map(|s| s.updated_at).unwrap_or(0),
            }
        })
        .collect();
    Ok(Json(views))
}

/// Revalidation signal: clients re-fetch views when a version moves
pub async fn version(State(state): State<ServerState>) -> Json<Value> {
    Json(json!({
        "stock": state.versions.get(RESOURCE_STOCK),
        "forecast": state.versions.get(RESOURCE_FORECAST),
    }))
}

/// Apply a signed delta
pub async fn delta(
    State(state): State<ServerState>,
    Json(payload): Json<StockDeltaRequest>,
) -> Json<AppResponse<()>> {
    let service = state.stock_service();
    match service
        .apply_delta(&payload.item_id, payload.delta, payload.reason, payload.memo)
        .await
    {
        Ok(()) => Json(AppResponse::success(())),
        Err(e) => Json(AppResponse::error(e.to_string())),
    }
}

/// Set an absolute count (physical count verified)
pub async fn correction(
    State(state): State<ServerState>,
    Json(payload): Json<StockCorrectionRequest>,
) -> Json<AppResponse<StockSnapshot>> {
    let service = state.stock_service();
    match service
        .apply_correction(&payload.item_id, payload.absolute_value, payload.memo)
        .await
    {
        Ok(snapshot) => Json(AppResponse::success(snapshot)),
        Err(e) => Json(AppResponse::error(e.to_string())),
    }
}

/// Batch edit — all entries land atomically
pub async fn batch(
    State(state): State<ServerState>,
    Json(payload): Json<StockBatchRequest>,
) -> Json<AppResponse<()>> {
    let service = state.stock_service();
    match service.apply_batch(&payload.updates).await {
        Ok(()) => Json(AppResponse::success(())),
        Err(e) => Json(AppResponse::error(e.to_string())),
    }
}
