//! Booking Repository

use super::RepoResult;
use shared::models::Booking;
use sqlx::{Sqlite, SqlitePool, Transaction};

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Booking>> {
    let bookings = sqlx::query_as::<_, Booking>(
        "SELECT booking_id, check_in, guests, imported_at FROM booking ORDER BY check_in, booking_id",
    )
    .fetch_all(pool)
    .await?;
    Ok(bookings)
}

pub async fn find_by_id(pool: &SqlitePool, booking_id: &str) -> RepoResult<Option<Booking>> {
    let booking = sqlx::query_as::<_, Booking>(
        "SELECT booking_id, check_in, guests, imported_at FROM booking WHERE booking_id = ?",
    )
    .bind(booking_id)
    .fetch_optional(pool)
    .await?;
    Ok(booking)
}

/// Create or refresh a booking; check-in date, guest count and import
/// timestamp are overwritten on conflict.
pub async fn upsert(
    pool: &SqlitePool,
    booking_id: &str,
    check_in: &str,
    guests: i64,
) -> RepoResult<()> {
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO booking (booking_id, check_in, guests, imported_at) VALUES (?1, ?2, ?3, ?4) ON CONFLICT(booking_id) DO UPDATE SET check_in = excluded.check_in, guests = excluded.guests, imported_at = excluded.imported_at",
    )
    .bind(booking_id)
    .bind(check_in)
    .bind(guests)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(())
}

/// Remove a booking together with its planned events (cascade by hand —
/// the planned rows are owned by the booking).
pub async fn delete_with_planned(
    tx: &mut Transaction<'_, Sqlite>,
    booking_id: &str,
) -> RepoResult<()> {
    sqlx::query("DELETE FROM planned_event WHERE booking_id = ?")
        .bind(booking_id)
        .execute(&mut **tx)
        .await?;
    sqlx::query("DELETE FROM booking WHERE booking_id = ?")
        .bind(booking_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}
