//! Stock Sheet Sync — physical-count reconciliation
//!
//! The stock sheet is the webhook's append-only mirror: header plus one row
//! per recorded snapshot, columns keyed by item display name. Only the last
//! (newest) row matters; every item column whose integer differs from the
//! live snapshot becomes a CORRECTION through the normal mutation path.

use std::collections::HashMap;

use sqlx::SqlitePool;

use crate::db::repository::{item, stock};
use crate::services::StockService;
use crate::utils::AppResult;
use shared::models::StockChange;

const DATE_COL: &str = "変更日";
const DETAIL_COL: &str = "詳細";

pub struct StockSheetService {
    pool: SqlitePool,
    stock: StockService,
}

impl StockSheetService {
    pub fn new(pool: SqlitePool, stock: StockService) -> Self {
        Self { pool, stock }
    }

    /// Reconcile the live snapshots against the sheet's last row.
    /// Returns the before/after list of applied corrections.
    pub async fn sync(&self, rows: &[HashMap<String, String>]) -> AppResult<Vec<StockChange>> {
        let Some(row) = rows.last() else {
            tracing::info!("Stock sheet is empty, nothing to reconcile");
            return Ok(Vec::new());
        };

        let changed_at = cell(row, DATE_COL).unwrap_or("-");
        let detail = cell(row, DETAIL_COL).unwrap_or("-");
        let memo = format!("棚卸シート同期 {changed_at} {detail}");

        let items = item::find_all(&self.pool).await?;
        let mut changes = Vec::new();

        for item in &items {
            let Some(raw) = cell(row, &item.name) else {
                continue;
            };
            let Ok(target) = raw.parse::<i64>() else {
                tracing::warn!(item = %item.name, value = %raw, "Non-integer count in stock sheet, skipping column");
                continue;
            };

            let current = stock::find_snapshot(&self.pool, &item.id)
                .await?
                .map(|s| s.shelf_count)
                .unwrap_or(0);
            if target == current {
                continue;
            }

            self.stock
                .apply_correction(&item.id, target, Some(memo.clone()))
                .await?;
            changes.push(StockChange {
                item_id: item.id.clone(),
                item_name: item.name.clone(),
                before: current,
                after: target,
            });
        }

        tracing::info!(changes = changes.len(), "Stock sheet sync finished");
        Ok(changes)
    }
}

/// Non-empty trimmed cell, or None
fn cell<'a>(row: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    row.get(key).map(|v| v.trim()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::StockVersions;
    use crate::db::DbService;
    use crate::services::HistoryNotifier;
    use shared::models::StockReason;
    use std::sync::Arc;

    async fn test_sync_service() -> StockSheetService {
        let pool = DbService::open_in_memory().await;
        item::seed_defaults(&pool).await.unwrap();
        let stock = StockService::new(
            pool.clone(),
            Arc::new(StockVersions::new()),
            HistoryNotifier::new(),
        );
        StockSheetService::new(pool, stock)
    }

    fn row(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_sync_corrects_differing_counts() {
        let service = test_sync_service().await;
        service
            .stock
            .apply_delta("bath-towel", 92, StockReason::Purchase, None)
            .await
            .unwrap();

        let changes = service
            .sync(&[row(&[
                ("変更日", "2026/08/05"),
                ("時刻", "10:00"),
                ("詳細", "定期棚卸"),
                ("バスタオル", "80"),
            ])])
            .await
            .unwrap();

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].before, 92);
        assert_eq!(changes[0].after, 80);

        let snapshot = stock::find_snapshot(&service.pool, "bath-towel")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(snapshot.shelf_count, 80);

        let events = stock::find_events_for_item(&service.pool, "bath-towel")
            .await
            .unwrap();
        let last = events.last().unwrap();
        assert_eq!(last.delta, -12);
        assert_eq!(last.reason, "CORRECTION");
        assert!(last.memo.as_deref().unwrap().contains("定期棚卸"));
    }

    #[tokio::test]
    async fn test_sync_only_reads_last_row() {
        let service = test_sync_service().await;

        let changes = service
            .sync(&[
                row(&[("変更日", "2026/08/01"), ("バスタオル", "50")]),
                row(&[("変更日", "2026/08/05"), ("バスタオル", "64")]),
            ])
            .await
            .unwrap();

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].after, 64);
    }

    #[tokio::test]
    async fn test_sync_skips_matching_and_unparseable_columns() {
        let service = test_sync_service().await;
        service
            .stock
            .apply_delta("face-towel", 40, StockReason::Purchase, None)
            .await
            .unwrap();

        let changes = service
            .sync(&[row(&[
                ("変更日", "2026/08/05"),
                ("フェイスタオル", "40"),
                ("バスタオル", "不明"),
            ])])
            .await
            .unwrap();

        assert!(changes.is_empty());
        // No correction rows were written for the untouched items
        let events = stock::find_events_for_item(&service.pool, "face-towel")
            .await
            .unwrap();
        assert_eq!(events.len(), 1);
    }

    #[tokio::test]
    async fn test_sync_empty_sheet_is_noop() {
        let service = test_sync_service().await;
        let changes = service.sync(&[]).await.unwrap();
        assert!(changes.is_empty());
    }
}
