//! System Setting Model

use serde::{Deserialize, Serialize};

/// Generic string key/value setting. Last-write-wins, no versioning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct SystemSetting {
    pub key: String,
    pub value: String,
    pub updated_at: i64,
}

/// Update payload for `PUT /api/settings/{key}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingUpdate {
    pub value: String,
}

/// Trigger payload for the sheet sync endpoints. A missing/empty `url`
/// falls back to the saved setting.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncRequest {
    pub url: Option<String>,
}
