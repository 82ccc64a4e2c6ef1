//! Stock Repository — snapshot cache and actual-event ledger
//!
//! The composite [`apply_event`] operation is the only write path for both
//! tables: one ActualEvent insert plus the snapshot upsert-by-delta, executed
//! on the caller's transaction so both land or neither does.

use super::RepoResult;
use shared::models::{ActualEvent, StockSnapshot};
use sqlx::{Sqlite, SqlitePool, Transaction};

pub async fn find_all_snapshots(pool: &SqlitePool) -> RepoResult<Vec<StockSnapshot>> {
    let snapshots = sqlx::query_as::<_, StockSnapshot>(
        "SELECT item_id, shelf_count, updated_at FROM stock_snapshot ORDER BY item_id",
    )
    .fetch_all(pool)
    .await?;
    Ok(snapshots)
}

pub async fn find_snapshot(pool: &SqlitePool, item_id: &str) -> RepoResult<Option<StockSnapshot>> {
    let snapshot = sqlx::query_as::<_, StockSnapshot>(
        "SELECT item_id, shelf_count, updated_at FROM stock_snapshot WHERE item_id = ?",
    )
    .bind(item_id)
    .fetch_optional(pool)
    .await?;
    Ok(snapshot)
}

/// Append one ledger entry and move the snapshot by the same delta.
///
/// The snapshot update is the store's atomic increment (`ON CONFLICT .. SET
/// shelf_count = shelf_count + excluded.shelf_count`), never a read-modify-
/// write in application code; a missing snapshot row is created with the
/// delta as its initial count.
pub async fn apply_event(
    tx: &mut Transaction<'_, Sqlite>,
    item_id: &str,
    delta: i64,
    reason: &str,
    memo: Option<&str>,
) -> RepoResult<()> {
    let now = shared::util::now_millis();

    sqlx::query(
        "INSERT INTO actual_event (item_id, delta, reason, memo, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
    )
    .bind(item_id)
    .bind(delta)
    .bind(reason)
    .bind(memo)
    .bind(now)
    .execute(&mut **tx)
    .await?;

    sqlx::query(
        "INSERT INTO stock_snapshot (item_id, shelf_count, updated_at) VALUES (?1, ?2, ?3) ON CONFLICT(item_id) DO UPDATE SET shelf_count = shelf_count + excluded.shelf_count, updated_at = excluded.updated_at",
    )
    .bind(item_id)
    .bind(delta)
    .bind(now)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Actual events with `created_at >= since_millis`, newest first
pub async fn find_events_since(
    pool: &SqlitePool,
    since_millis: i64,
) -> RepoResult<Vec<ActualEvent>> {
    let events = sqlx::query_as::<_, ActualEvent>(
        "SELECT id, item_id, delta, reason, memo, created_at FROM actual_event WHERE created_at >= ? ORDER BY created_at DESC, id DESC",
    )
    .bind(since_millis)
    .fetch_all(pool)
    .await?;
    Ok(events)
}

/// All events for one item, oldest first (ledger audit order)
pub async fn find_events_for_item(
    pool: &SqlitePool,
    item_id: &str,
) -> RepoResult<Vec<ActualEvent>> {
    let events = sqlx::query_as::<_, ActualEvent>(
        "SELECT id, item_id, delta, reason, memo, created_at FROM actual_event WHERE item_id = ? ORDER BY created_at, id",
    )
    .bind(item_id)
    .fetch_all(pool)
    .await?;
    Ok(events)
}
