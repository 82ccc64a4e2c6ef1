//! Settings API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::{Value, json};

use crate::core::ServerState;
use crate::utils::{AppResponse, AppResult};
use shared::models::SettingUpdate;

/// Read a setting; unset keys read as the empty string
pub async fn get_setting(
    State(state): State<ServerState>,
    Path(key): Path<String>,
) -> AppResult<Json<Value>> {
    let value = state.settings_service().get(&key).await?;
    Ok(Json(json!({ "key": key, "value": value })))
}

/// Last-write-wins upsert
pub async fn put_setting(
    State(state): State<ServerState>,
    Path(key): Path<String>,
    Json(payload): Json<SettingUpdate>,
) -> Json<AppResponse<()>> {
    match state.settings_service().set(&key, &payload.value).await {
        Ok(()) => Json(AppResponse::success(())),
        Err(e) => Json(AppResponse::error(e.to_string())),
    }
}
