//! Bookings API Handlers
//!
//! CSV uploads arrive as multipart form data under the `file` field; the
//! sync endpoint pulls the published sheet instead.

use std::collections::HashMap;

use axum::{
    Json,
    extract::{Multipart, State},
};

use crate::core::ServerState;
use crate::services::sheet;
use crate::services::settings::GOOGLE_SHEET_URL;
use crate::utils::{AppResponse, AppResult};
use shared::models::{ImportReport, RowCheck, SyncReport, SyncRequest};

/// Pull the uploaded CSV text out of the `file` multipart field
async fn file_rows(mut multipart: Multipart) -> AppResult<Option<Vec<HashMap<String, String>>>> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("file") {
            let data = field.bytes().await?;
            let text = String::from_utf8_lossy(&data).into_owned();
            return Ok(Some(sheet::parse_rows(&text)));
        }
    }
    Ok(None)
}

/// File-upload import
pub async fn import(
    State(state): State<ServerState>,
    multipart: Multipart,
) -> AppResult<Json<AppResponse<ImportReport>>> {
    let Some(rows) = file_rows(multipart).await? else {
        return Ok(Json(AppResponse::error("No file uploaded")));
    };

    match state.importer().import_rows(&rows).await {
        Ok(report) => Ok(Json(AppResponse::success(report))),
        Err(e) => {
            tracing::error!(error = %e, "Import failed");
            Ok(Json(AppResponse::error(format!("Import failed: {e}"))))
        }
    }
}

/// Analysis-only dry run over an uploaded CSV — nothing is written
pub async fn analyze(
    State(_state): State<ServerState>,
    multipart: Multipart,
) -> AppResult<Json<AppResponse<Vec<RowCheck>>>> {
    let Some(rows) = file_rows(multipart).await? else {
        return Ok(Json(AppResponse::error("No file uploaded")));
    };

    let checks = crate::services::BookingImporter::analyze_rows(&rows);
    Ok(Json(AppResponse::success(checks)))
}

/// Sheet-driven full sync (mirror semantics). The URL comes from the
/// request or falls back to the saved setting; a successful explicit sync
/// persists its URL for the periodic re-sync.
pub async fn sync(
    State(state): State<ServerState>,
    Json(payload): Json<SyncRequest>,
) -> AppResult<Json<AppResponse<SyncReport>>> {
    let settings = state.settings_service();
    let url = match payload.url.filter(|u| !u.trim().is_empty()) {
        Some(url) => url,
        None => settings.get(GOOGLE_SHEET_URL).await?,
    };
    if url.is_empty() {
        return Ok(Json(AppResponse::error("URL is required")));
    }

    let rows = match sheet::fetch_rows(&url, state.config.request_timeout_ms).await {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!(error = %e, "Sync failed");
            return Ok(Json(AppResponse::error(format!("Sync failed: {e}"))));
        }
    };

    match state.importer().full_sync(&rows).await {
        Ok(report) => {
            // Auto-save the URL on successful sync so the periodic re-sync
            // picks it up
            settings.set(GOOGLE_SHEET_URL, &url).await?;
            Ok(Json(AppResponse::success(report)))
        }
        Err(e) => {
            tracing::error!(error = %e, "Sync failed");
            Ok(Json(AppResponse::error(format!("Sync failed: {e}"))))
        }
    }
}
