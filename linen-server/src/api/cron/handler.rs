//! Cron API Handlers
//!
//! 毎日 10:00 JST に外部スケジューラから叩かれる想定。予約シートを全量同期
//! した上で、本日チェックインの行をリネン履歴 (webhook) に記録する。

use axum::{Json, extract::State, http::HeaderMap};
use serde_json::{Value, json};

use crate::core::ServerState;
use crate::services::settings::GOOGLE_SHEET_URL;
use crate::services::sheet;
use crate::utils::{AppError, AppResult};

/// Daily check-in entrypoint.
///
/// Requires `Authorization: Bearer <CRON_SECRET>` when the secret is
/// configured; open otherwise. Safe to run repeatedly — both the full sync
/// and the webhook pushes are idempotent from the ledger's point of view.
pub async fn daily_checkin(
    State(state): State<ServerState>,
    headers: HeaderMap,
) -> AppResult<Json<Value>> {
    if let Some(secret) = &state.config.cron_secret {
        let expected = format!("Bearer {secret}");
        let provided = headers
            .get(http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());
        if provided != Some(expected.as_str()) {
            return Err(AppError::Unauthorized);
        }
    }

    let settings = state.settings_service();
    let url = settings.get(GOOGLE_SHEET_URL).await?;
    if url.is_empty() {
        return Err(AppError::validation("GOOGLE_SHEET_URL not configured"));
    }

    let rows = sheet::fetch_rows(&url, state.config.request_timeout_ms).await?;
    let report = state.importer().full_sync(&rows).await?;

    // 本日チェックインの行をリネン履歴に記録
    let today_slash = shared::util::date_slash(shared::util::today());
    let mut recorded = 0;
    for row in &rows {
        let date_cell = row.get("日付").map(String::as_str).unwrap_or("");
        if date_cell.trim().replace('-', "/") != today_slash {
            continue;
        }
        let name = row.get("宿泊者名").map(String::as_str).unwrap_or("");
        let guests = row.get("人数").map(String::as_str).unwrap_or("");
        state
            .notifier
            .notify(format!("{today_slash} {name} {guests}名"));
        recorded += 1;
    }

    Ok(Json(json!({
        "success": true,
        "date": today_slash,
        "synced": report.count,
        "deleted": report.deleted,
        "recorded": recorded,
    })))
}
