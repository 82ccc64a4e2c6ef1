//! Stock Sheet API Handlers

use axum::{Json, extract::State};

use crate::core::ServerState;
use crate::services::sheet;
use crate::services::settings::STOCK_SHEET_URL;
use crate::services::StockSheetService;
use crate::utils::{AppResponse, AppResult};
use shared::models::{StockChange, SyncRequest};

/// Physical-count reconciliation from the stock sheet's last row
pub async fn sync(
    State(state): State<ServerState>,
    Json(payload): Json<SyncRequest>,
) -> AppResult<Json<AppResponse<Vec<StockChange>>>> {
    let settings = state.settings_service();
    let url = match payload.url.filter(|u| !u.trim().is_empty()) {
        Some(url) => url,
        None => settings.get(STOCK_SHEET_URL).await?,
    };
    if url.is_empty() {
        return Ok(Json(AppResponse::error("URL is required")));
    }

    let rows = match sheet::fetch_rows(&url, state.config.request_timeout_ms).await {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!(error = %e, "Stock sheet sync failed");
            return Ok(Json(AppResponse::error(format!("Sync failed: {e}"))));
        }
    };

    let service = StockSheetService::new(state.pool.clone(), state.stock_service());
    match service.sync(&rows).await {
        Ok(changes) => {
            settings.set(STOCK_SHEET_URL, &url).await?;
            Ok(Json(AppResponse::success(changes)))
        }
        Err(e) => {
            tracing::error!(error = %e, "Stock sheet sync failed");
            Ok(Json(AppResponse::error(format!("Sync failed: {e}"))))
        }
    }
}
