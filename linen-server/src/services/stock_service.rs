//! Stock Mutation Service
//!
//! Every write to the actual-event ledger goes through here. The event
//! insert and the snapshot upsert-by-delta always share one transaction
//! (batches share one transaction across all entries); after commit the
//! view version is bumped and a webhook notification is enqueued.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::core::{RESOURCE_STOCK, StockVersions};
use crate::db::repository::{item, stock};
use crate::services::HistoryNotifier;
use crate::utils::{AppError, AppResult};
use shared::models::{StockBatchEntry, StockReason, StockSnapshot};

/// 一括操作 batch marker memo
const BATCH_MEMO: &str = "一括操作";

#[derive(Clone)]
pub struct StockService {
    pool: SqlitePool,
    versions: Arc<StockVersions>,
    notifier: HistoryNotifier,
}

impl StockService {
    pub fn new(pool: SqlitePool, versions: Arc<StockVersions>, notifier: HistoryNotifier) -> Self {
        Self {
            pool,
            versions,
            notifier,
        }
    }

    /// General mutation path.
    ///
    /// `delta == 0` outside a correction is a success no-op without a ledger
    /// row — empty audit entries are suppressed.
    pub async fn apply_delta(
        &self,
        item_id: &str,
        delta: i64,
        reason: StockReason,
        memo: Option<String>,
    ) -> AppResult<()> {
        if delta == 0 && reason != StockReason::Correction {
            return Ok(());
        }

        let item = item::find_by_id(&self.pool, item_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Item {item_id}")))?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(e.to_string()))?;
        stock::apply_event(&mut tx, item_id, delta, reason.as_tag(), memo.as_deref()).await?;
        tx.commit()
            .await
            .map_err(|e| AppError::database(e.to_string()))?;

        self.after_commit(format!("{} {:+} {}", item.name, delta, reason.as_tag()));
        Ok(())
    }

    /// Correction: set the count to an absolute target.
    ///
    /// Always writes a ledger row, even when the computed delta is zero —
    /// "a count was verified" is part of the audit trail.
    pub async fn apply_correction(
        &self,
        item_id: &str,
        absolute_value: i64,
        memo: Option<String>,
    ) -> AppResult<StockSnapshot> {
        let item = item::find_by_id(&self.pool, item_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Item {item_id}")))?;

        let current = stock::find_snapshot(&self.pool, item_id)
            .await?
            .map(|s| s.shelf_count)
            .unwrap_or(0);
        let delta = absolute_value - current;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(e.to_string()))?;
        stock::apply_event(
            &mut tx,
            item_id,
            delta,
            StockReason::Correction.as_tag(),
            memo.as_deref(),
        )
        .await?;
        tx.commit()
            .await
            .map_err(|e| AppError::database(e.to_string()))?;

        self.after_commit(format!("{} 棚卸修正 → {}", item.name, absolute_value));

        stock::find_snapshot(&self.pool, item_id)
            .await?
            .ok_or_else(|| AppError::internal("Snapshot missing after correction".to_string()))
    }

    /// Batch edit: every entry in one transaction — the whole batch lands or
    /// none of it does. Zero deltas are still written here (unlike the
    /// single-item path; the batch marker row doubles as the save-all audit
    /// record).
    pub async fn apply_batch(&self, updates: &[StockBatchEntry]) -> AppResult<()> {
        if updates.is_empty() {
            return Ok(());
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(e.to_string()))?;
        for update in updates {
            stock::apply_event(
                &mut tx,
                &update.item_id,
                update.delta,
                StockReason::Other.as_tag(),
                Some(BATCH_MEMO),
            )
            .await?;
        }
        tx.commit()
            .await
            .map_err(|e| AppError::database(e.to_string()))?;

        self.after_commit(BATCH_MEMO.to_string());
        Ok(())
    }

    /// Post-commit hook: invalidate cached views and enqueue the webhook
    /// push. Runs only after the transaction has committed.
    fn after_commit(&self, detail: String) {
        self.versions.increment(RESOURCE_STOCK);
        self.notifier.notify(detail);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;

    async fn test_service() -> StockService {
        let pool = DbService::open_in_memory().await;
        item::seed_defaults(&pool).await.unwrap();
        StockService::new(
            pool,
            Arc::new(StockVersions::new()),
            HistoryNotifier::new(),
        )
    }

    async fn shelf_count(service: &StockService, item_id: &str) -> i64 {
        stock::find_snapshot(&service.pool, item_id)
            .await
            .unwrap()
            .map(|s| s.shelf_count)
            .unwrap_or(0)
    }

    #[tokio::test]
    async fn test_delta_updates_snapshot_and_ledger() {
        let service = test_service().await;

        service
            .apply_delta("bath-towel", -5, StockReason::Laundry, None)
            .await
            .unwrap();
        service
            .apply_delta("bath-towel", 5, StockReason::Purchase, None)
            .await
            .unwrap();

        assert_eq!(shelf_count(&service, "bath-towel").await, 0);
        let events = stock::find_events_for_item(&service.pool, "bath-towel")
            .await
            .unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].delta, -5);
        assert_eq!(events[0].reason, "LAUNDRY");
        assert_eq!(events[1].delta, 5);
        assert_eq!(events[1].reason, "PURCHASE");
    }

    #[tokio::test]
    async fn test_zero_delta_is_suppressed() {
        let service = test_service().await;

        service
            .apply_delta("bath-towel", 0, StockReason::Other, None)
            .await
            .unwrap();

        let events = stock::find_events_for_item(&service.pool, "bath-towel")
            .await
            .unwrap();
        assert!(events.is_empty());
        assert_eq!(service.versions.get(RESOURCE_STOCK), 0);
    }

    #[tokio::test]
    async fn test_unknown_item_is_rejected() {
        let service = test_service().await;
        let result = service
            .apply_delta("no-such-item", 3, StockReason::Purchase, None)
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_correction_sets_absolute_value() {
        let service = test_service().await;
        service
            .apply_delta("bath-towel", 92, StockReason::Purchase, None)
            .await
            .unwrap();

        let snapshot = service
            .apply_correction("bath-towel", 80, Some("実盤".into()))
            .await
            .unwrap();
        assert_eq!(snapshot.shelf_count, 80);

        let events = stock::find_events_for_item(&service.pool, "bath-towel")
            .await
            .unwrap();
        let last = events.last().unwrap();
        assert_eq!(last.delta, -12);
        assert_eq!(last.reason, "CORRECTION");
    }

    #[tokio::test]
    async fn test_zero_delta_correction_is_still_recorded() {
        let service = test_service().await;
        service
            .apply_delta("face-towel", 40, StockReason::Purchase, None)
            .await
            .unwrap();

        service.apply_correction("face-towel", 40, None).await.unwrap();

        let events = stock::find_events_for_item(&service.pool, "face-towel")
            .await
            .unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].delta, 0);
        assert_eq!(events[1].reason, "CORRECTION");
        assert_eq!(shelf_count(&service, "face-towel").await, 40);
    }

    #[tokio::test]
    async fn test_batch_writes_zero_deltas() {
        let service = test_service().await;

        service
            .apply_batch(&[
                StockBatchEntry {
                    item_id: "bath-towel".into(),
                    delta: 3,
                },
                StockBatchEntry {
                    item_id: "face-towel".into(),
                    delta: 0,
                },
            ])
            .await
            .unwrap();

        assert_eq!(shelf_count(&service, "bath-towel").await, 3);
        let events = stock::find_events_for_item(&service.pool, "face-towel")
            .await
            .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].delta, 0);
        assert_eq!(events[0].memo.as_deref(), Some(BATCH_MEMO));
    }

    #[tokio::test]
    async fn test_batch_is_atomic() {
        let service = test_service().await;

        // Second entry violates the item foreign key; nothing may land
        let result = service
            .apply_batch(&[
                StockBatchEntry {
                    item_id: "bath-towel".into(),
                    delta: 7,
                },
                StockBatchEntry {
                    item_id: "no-such-item".into(),
                    delta: 1,
                },
            ])
            .await;

        assert!(result.is_err());
        assert_eq!(shelf_count(&service, "bath-towel").await, 0);
        let events = stock::find_events_for_item(&service.pool, "bath-towel")
            .await
            .unwrap();
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn test_snapshot_equals_initial_plus_sum_of_deltas() {
        let service = test_service().await;

        let deltas = [10, -3, 7, -1, 0, 25, -8];
        for delta in deltas {
            service
                .apply_delta("pillow-cover", delta, StockReason::Other, None)
                .await
                .unwrap();
        }

        let events = stock::find_events_for_item(&service.pool, "pillow-cover")
            .await
            .unwrap();
        let ledger_sum: i64 = events.iter().map(|e| e.delta).sum();
        assert_eq!(shelf_count(&service, "pillow-cover").await, ledger_sum);
        // Zero delta with reason OTHER was suppressed
        assert_eq!(events.len(), deltas.iter().filter(|d| **d != 0).count());
    }

    #[tokio::test]
    async fn test_mutation_bumps_version_and_queues_notification() {
        let service = test_service().await;

        service
            .apply_delta("bath-towel", 4, StockReason::Purchase, None)
            .await
            .unwrap();

        assert_eq!(service.versions.get(RESOURCE_STOCK), 1);
        let mut rx = service.notifier.take_receiver().unwrap();
        let notification = rx.try_recv().unwrap();
        assert!(notification.detail.contains("バスタオル"));
        assert!(notification.detail.contains("+4"));
    }
}
