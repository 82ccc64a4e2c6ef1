//! Items API Handlers

use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::core::ServerState;
use crate::db::repository::item;
use crate::utils::{AppResponse, AppResult};
use shared::models::Item;

/// List all items
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Item>>> {
    let items = item::find_all(&state.pool).await?;
    Ok(Json(items))
}

/// Administrative re-seed: create the default item set and zero snapshots.
/// Idempotent; existing rows are untouched.
pub async fn seed(State(state): State<ServerState>) -> Json<AppResponse<Value>> {
    match item::seed_defaults(&state.pool).await {
        Ok(created) => Json(AppResponse::success(json!({ "created": created }))),
        Err(e) => Json(AppResponse::error(e.to_string())),
    }
}
