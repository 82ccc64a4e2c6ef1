//! Projection Engine — read-side forecast and history views
//!
//! Both walks are pure reads over the ledgers: safe to recompute at any
//! time, tolerant of days without events (counts carry forward) and of
//! items without a snapshot row (treated as zero).

use std::collections::{BTreeMap, HashMap};

use chrono::Duration;
use sqlx::SqlitePool;

use crate::db::repository::{booking, item, planned_event, stock};
use crate::utils::AppResult;
use shared::models::{
    ActualEvent, ForecastData, ForecastDayStatus, ForecastEvent, HistoryData, HistoryDayStatus,
    Shortage, StockInfo,
};
use shared::util::{date_key, day_start_millis, millis_to_date, today};

/// Forward projection: today (inclusive) through `today + days`.
///
/// Running counts start from the live snapshots; each day's planned deltas
/// are applied before the day is recorded, so a day's count is the stock
/// *after* that day's check-ins. Shortages are every (date, item) pair that
/// goes negative, date ascending.
pub async fn forecast(pool: &SqlitePool, days: i64) -> AppResult<ForecastData> {
    let start = today();
    let end = start + Duration::days(days);

    let items = item::find_all(pool).await?;
    let snapshots = stock::find_all_snapshots(pool).await?;
    let planned = planned_event::find_between(pool, &date_key(start), &date_key(end)).await?;

    let stock_map: HashMap<String, StockInfo> = items
        .iter()
        .map(|item| {
            let current = snapshots
                .iter()
                .find(|s| s.item_id == item.id)
                .map(|s| s.shelf_count)
                .unwrap_or(0);
            (
                item.id.clone(),
                StockInfo {
                    name: item.name.clone(),
                    current,
                },
            )
        })
        .collect();

    // Guest counts for event annotation
    let bookings = booking::find_all(pool).await?;
    let guests_by_booking: HashMap<&str, i64> = bookings
        .iter()
        .map(|b| (b.booking_id.as_str(), b.guests))
        .collect();

    let mut running: HashMap<String, i64> = stock_map
        .iter()
        .map(|(id, info)| (id.clone(), info.current))
        .collect();

    let mut forecast = BTreeMap::new();
    for offset in 0..=days {
        let day = start + Duration::days(offset);
        let key = date_key(day);

        let day_events: Vec<_> = planned.iter().filter(|e| e.date == key).collect();
        for event in &day_events {
            *running.entry(event.item_id.clone()).or_insert(0) += event.delta;
        }

        let mut daily: HashMap<String, ForecastDayStatus> = HashMap::new();
        for item in &items {
            let events: Vec<ForecastEvent> = day_events
                .iter()
                .filter(|e| e.item_id == item.id)
                .map(|e| ForecastEvent {
                    id: e.id,
                    booking_id: e.booking_id.clone(),
                    item_id: e.item_id.clone(),
                    date: e.date.clone(),
                    delta: e.delta,
                    note: e.note.clone(),
                    guests: e
                        .booking_id
                        .as_deref()
                        .and_then(|id| guests_by_booking.get(id))
                        .copied(),
                })
                .collect();
            daily.insert(
                item.id.clone(),
                ForecastDayStatus {
                    count: running.get(&item.id).copied().unwrap_or(0),
                    events,
                },
            );
        }
        forecast.insert(key, daily);
    }

    // BTreeMap iteration is date-ascending, so shortages come out ordered
    let mut shortages = Vec::new();
    for (date, statuses) in &forecast {
        for (item_id, status) in statuses {
            if status.count < 0 {
                let item_name = stock_map
                    .get(item_id)
                    .map(|info| info.name.clone())
                    .unwrap_or_else(|| item_id.clone());
                shortages.push(Shortage {
                    date: date.clone(),
                    item_name,
                    count: status.count,
                });
            }
        }
    }

    Ok(ForecastData {
        stock_map,
        forecast,
        shortages,
    })
}

/// Backward reconstruction: today back through `days` days.
///
/// Each day's displayed count is the stock immediately after that day's
/// actual events; the day's deltas are subtracted only after the day is
/// recorded, so today always shows the live snapshot and earlier days show
/// what the snapshot was at the time.
pub async fn history(pool: &SqlitePool, days: i64) -> AppResult<HistoryData> {
    let start = today();
    let window_start = start - Duration::days(days);

    let items = item::find_all(pool).await?;
    let snapshots = stock::find_all_snapshots(pool).await?;
    let events = stock::find_events_since(pool, day_start_millis(window_start)).await?;

    let stock_map: HashMap<String, StockInfo> = items
        .iter()
        .map(|item| {
            let current = snapshots
                .iter()
                .find(|s| s.item_id == item.id)
                .map(|s| s.shelf_count)
                .unwrap_or(0);
            (
                item.id.clone(),
                StockInfo {
                    name: item.name.clone(),
                    current,
                },
            )
        })
        .collect();

    let mut events_by_day: HashMap<String, Vec<ActualEvent>> = HashMap::new();
    for event in events {
        let key = date_key(millis_to_date(event.created_at));
        events_by_day.entry(key).or_default().push(event);
    }

    let mut running: HashMap<String, i64> = stock_map
        .iter()
        .map(|(id, info)| (id.clone(), info.current))
        .collect();

    let mut history = BTreeMap::new();
    for offset in 0..days {
        let day = start - Duration::days(offset);
        let key = date_key(day);
        let day_events = events_by_day.get(&key);

        let mut daily: HashMap<String, HistoryDayStatus> = HashMap::new();
        for item in &items {
            let item_events: Vec<ActualEvent> = day_events
                .map(|events| {
                    events
                        .iter()
                        .filter(|e| e.item_id == item.id)
                        .cloned()
                        .collect()
                })
                .unwrap_or_default();
            daily.insert(
                item.id.clone(),
                HistoryDayStatus {
                    count: running.get(&item.id).copied().unwrap_or(0),
                    events: item_events,
                },
            );
        }
        history.insert(key.clone(), daily);

        // Reverse this day's deltas to step further into the past
        if let Some(events) = day_events {
            for event in events {
                *running.entry(event.item_id.clone()).or_insert(0) -= event.delta;
            }
        }
    }

    Ok(HistoryData { stock_map, history })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::StockVersions;
    use crate::db::DbService;
    use crate::services::{BookingImporter, HistoryNotifier, StockService};
    use shared::models::StockReason;
    use std::collections::HashMap as StdHashMap;
    use std::sync::Arc;

    async fn seeded_pool() -> SqlitePool {
        let pool = DbService::open_in_memory().await;
        item::seed_defaults(&pool).await.unwrap();
        pool
    }

    fn stock_service(pool: &SqlitePool) -> StockService {
        StockService::new(
            pool.clone(),
            Arc::new(StockVersions::new()),
            HistoryNotifier::new(),
        )
    }

    fn sheet_row(date: &str, name: &str, guests: &str) -> StdHashMap<String, String> {
        [("日付", date), ("宿泊者名", name), ("人数", guests)]
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_forecast_today_equals_live_snapshot_without_events() {
        let pool = seeded_pool().await;
        stock_service(&pool)
            .apply_delta("bath-towel", 100, StockReason::Purchase, None)
            .await
            .unwrap();

        let data = forecast(&pool, 14).await.unwrap();
        let today_key = date_key(today());

        assert_eq!(data.stock_map["bath-towel"].current, 100);
        assert_eq!(data.forecast[&today_key]["bath-towel"].count, 100);
        assert!(data.shortages.is_empty());
        // Horizon is inclusive: days + 1 entries
        assert_eq!(data.forecast.len(), 15);
    }

    #[tokio::test]
    async fn test_forecast_applies_booking_consumption() {
        let pool = seeded_pool().await;
        stock_service(&pool)
            .apply_delta("bath-towel", 100, StockReason::Purchase, None)
            .await
            .unwrap();

        // 10 guests checking in tomorrow: bath towel consumption 10+5+8=23
        let tomorrow = today() + Duration::days(1);
        let importer = BookingImporter::new(pool.clone(), Arc::new(StockVersions::new()));
        importer
            .full_sync(&[sheet_row(&date_key(tomorrow), "田中", "10")])
            .await
            .unwrap();

        let data = forecast(&pool, 14).await.unwrap();
        let today_key = date_key(today());
        let tomorrow_key = date_key(tomorrow);

        assert_eq!(data.forecast[&today_key]["bath-towel"].count, 100);
        assert_eq!(data.forecast[&tomorrow_key]["bath-towel"].count, 77);

        let day = &data.forecast[&tomorrow_key]["bath-towel"];
        assert_eq!(day.events.len(), 1);
        assert_eq!(day.events[0].delta, -23);
        assert_eq!(day.events[0].guests, Some(10));
    }

    #[tokio::test]
    async fn test_forecast_shortages_ordered_by_date() {
        let pool = seeded_pool().await;
        // box-sheet snapshot stays 0: any consumption goes negative
        let importer = BookingImporter::new(pool.clone(), Arc::new(StockVersions::new()));
        let d1 = today() + Duration::days(2);
        let d2 = today() + Duration::days(5);
        importer
            .full_sync(&[
                sheet_row(&date_key(d2), "佐藤", "2"),
                sheet_row(&date_key(d1), "田中", "3"),
            ])
            .await
            .unwrap();

        let data = forecast(&pool, 14).await.unwrap();
        assert!(!data.shortages.is_empty());
        let dates: Vec<&str> = data.shortages.iter().map(|s| s.date.as_str()).collect();
        let mut sorted = dates.clone();
        sorted.sort();
        assert_eq!(dates, sorted);
        assert_eq!(data.shortages[0].date, date_key(d1));
        // Shortage names are display names, not ids
        assert!(data.shortages.iter().any(|s| s.item_name == "ボックスシーツ"));
    }

    #[tokio::test]
    async fn test_history_today_equals_live_snapshot() {
        let pool = seeded_pool().await;
        let service = stock_service(&pool);
        service
            .apply_delta("face-towel", 50, StockReason::Purchase, None)
            .await
            .unwrap();
        service
            .apply_delta("face-towel", -8, StockReason::Laundry, None)
            .await
            .unwrap();

        let data = history(&pool, 30).await.unwrap();
        let today_key = date_key(today());

        assert_eq!(data.history.len(), 30);
        assert_eq!(data.stock_map["face-towel"].current, 42);
        let today_status = &data.history[&today_key]["face-towel"];
        assert_eq!(today_status.count, 42);
        // Both of today's events are listed under today
        assert_eq!(today_status.events.len(), 2);
    }

    #[tokio::test]
    async fn test_history_reconstructs_past_counts() {
        let pool = seeded_pool().await;
        let service = stock_service(&pool);
        service
            .apply_delta("duvet-cover", 30, StockReason::Purchase, None)
            .await
            .unwrap();

        let data = history(&pool, 30).await.unwrap();
        let yesterday_key = date_key(today() - Duration::days(1));

        // All events happened today, so yesterday shows the pre-event count
        assert_eq!(data.history[&yesterday_key]["duvet-cover"].count, 0);
        assert!(data.history[&yesterday_key]["duvet-cover"].events.is_empty());
    }

    #[tokio::test]
    async fn test_projections_tolerate_missing_snapshot_rows() {
        let pool = DbService::open_in_memory().await;
        // Item without a snapshot row at all
        sqlx::query(
            "INSERT INTO item (id, name, unit, formula_type, created_at, updated_at) VALUES ('ad-hoc', 'アドホック', '枚', 'SIMPLE', 0, 0)",
        )
        .execute(&pool)
        .await
        .unwrap();

        let data = forecast(&pool, 3).await.unwrap();
        assert_eq!(data.stock_map["ad-hoc"].current, 0);
        let history_data = history(&pool, 3).await.unwrap();
        assert_eq!(history_data.stock_map["ad-hoc"].current, 0);
    }
}
