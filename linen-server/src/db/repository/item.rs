//! Item Repository

use super::RepoResult;
use shared::models::Item;
use sqlx::SqlitePool;

/// Seed set: (id, 表示名, 単位, formula tag)
const DEFAULT_ITEMS: &[(&str, &str, &str, &str)] = &[
    ("box-sheet", "ボックスシーツ", "枚", "SIMPLE"),
    ("duvet-cover", "デュベカバー", "枚", "SIMPLE"),
    ("pillow-cover", "枕カバー", "枚", "SIMPLE"),
    ("bath-towel", "バスタオル", "枚", "TOWEL_B"),
    ("face-towel", "フェイスタオル", "枚", "TOWEL_F"),
];

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Item>> {
    let items = sqlx::query_as::<_, Item>(
        "SELECT id, name, unit, formula_type, created_at, updated_at FROM item ORDER BY created_at, id",
    )
    .fetch_all(pool)
    .await?;
    Ok(items)
}

pub async fn find_by_id(pool: &SqlitePool, id: &str) -> RepoResult<Option<Item>> {
    let item = sqlx::query_as::<_, Item>(
        "SELECT id, name, unit, formula_type, created_at, updated_at FROM item WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(item)
}

/// Seed the default item set and zero snapshots.
///
/// Idempotent: existing items and snapshots are left untouched. Returns the
/// number of newly created items.
pub async fn seed_defaults(pool: &SqlitePool) -> RepoResult<usize> {
    let now = shared::util::now_millis();
    let mut created = 0usize;

    for (id, name, unit, formula_type) in DEFAULT_ITEMS {
        let rows = sqlx::query(
            "INSERT INTO item (id, name, unit, formula_type, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?5) ON CONFLICT(id) DO NOTHING",
        )
        .bind(id)
        .bind(name)
        .bind(unit)
        .bind(formula_type)
        .bind(now)
        .execute(pool)
        .await?;
        created += rows.rows_affected() as usize;

        sqlx::query(
            "INSERT INTO stock_snapshot (item_id, shelf_count, updated_at) VALUES (?1, 0, ?2) ON CONFLICT(item_id) DO NOTHING",
        )
        .bind(id)
        .bind(now)
        .execute(pool)
        .await?;
    }

    Ok(created)
}
