//! Settings Service
//!
//! Explicit configuration service handed to the sync adapters and the
//! webhook worker — feature URLs are never looked up ambiently.

use sqlx::SqlitePool;

use crate::db::repository::setting;
use crate::utils::AppResult;

/// 预约管理シート URL
pub const GOOGLE_SHEET_URL: &str = "GOOGLE_SHEET_URL";
/// 棚卸（実盤）シート URL
pub const STOCK_SHEET_URL: &str = "STOCK_SHEET_URL";
/// 履历 Webhook URL
pub const HISTORY_WEBHOOK_URL: &str = "HISTORY_WEBHOOK_URL";

#[derive(Clone)]
pub struct SettingsService {
    pool: SqlitePool,
}

impl SettingsService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Read a setting; unset keys read as the empty string (legacy contract —
    /// callers test emptiness, not presence).
    pub async fn get(&self, key: &str) -> AppResult<String> {
        let setting = setting::get(&self.pool, key).await?;
        Ok(setting.map(|s| s.value).unwrap_or_default())
    }

    /// Last-write-wins upsert
    pub async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        setting::set(&self.pool, key, value).await?;
        Ok(())
    }
}
