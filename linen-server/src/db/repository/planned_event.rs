//! Planned Event Repository

use super::RepoResult;
use shared::models::{PlannedEvent, PlannedEventCreate};
use sqlx::SqlitePool;

/// Replace-set regeneration: delete every planned event of the booking and
/// bulk-insert the new set in one transaction. Planned events are never
/// patched individually.
pub async fn replace_for_booking(
    pool: &SqlitePool,
    booking_id: &str,
    events: &[PlannedEventCreate],
) -> RepoResult<()> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM planned_event WHERE booking_id = ?")
        .bind(booking_id)
        .execute(&mut *tx)
        .await?;

    for event in events {
        sqlx::query(
            "INSERT INTO planned_event (booking_id, item_id, date, delta, note) VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&event.booking_id)
        .bind(&event.item_id)
        .bind(&event.date)
        .bind(event.delta)
        .bind(&event.note)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

/// Events dated within `[start_date, end_date]` (inclusive day keys),
/// ascending by date
pub async fn find_between(
    pool: &SqlitePool,
    start_date: &str,
    end_date: &str,
) -> RepoResult<Vec<PlannedEvent>> {
    let events = sqlx::query_as::<_, PlannedEvent>(
        "SELECT id, booking_id, item_id, date, delta, note FROM planned_event WHERE date >= ?1 AND date <= ?2 ORDER BY date, id",
    )
    .bind(start_date)
    .bind(end_date)
    .fetch_all(pool)
    .await?;
    Ok(events)
}

pub async fn find_for_booking(
    pool: &SqlitePool,
    booking_id: &str,
) -> RepoResult<Vec<PlannedEvent>> {
    let events = sqlx::query_as::<_, PlannedEvent>(
        "SELECT id, booking_id, item_id, date, delta, note FROM planned_event WHERE booking_id = ? ORDER BY item_id, id",
    )
    .bind(booking_id)
    .fetch_all(pool)
    .await?;
    Ok(events)
}
