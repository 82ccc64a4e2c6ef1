//! Booking Importer
//!
//! Upserts bookings from tabular rows and regenerates their planned
//! consumption events through the formula engine. Three modes share the
//! per-row validation: file import (natural `booking_id` column), sheet
//! full sync (composite ids + deletion reconciliation), and an
//! analysis-only dry run.
//!
//! Row-level problems (missing fields, non-numeric guests, unparseable
//! dates) skip the row and continue — they are diagnostics, not failures.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::NaiveDate;
use sqlx::SqlitePool;

use crate::core::{RESOURCE_FORECAST, StockVersions};
use crate::db::repository::{booking, item, planned_event};
use crate::utils::{AppError, AppResult};
use shared::models::{ImportReport, Item, PlannedEventCreate, RowCheck, SyncReport};
use shared::util::{date_key, normalize_date_string, parse_flexible_date};

// File-upload column layout
const FILE_ID_COL: &str = "booking_id";
const FILE_DATE_COL: &str = "checkin_date";
const FILE_GUESTS_COL: &str = "guests";

// Sheet column layout (legacy fallbacks second)
const SHEET_DATE_COL: &str = "日付";
const SHEET_NAME_COL: &str = "宿泊者名";
const SHEET_GUESTS_COL: &str = "人数";
const SHEET_REMARKS_COL: &str = "備考";

#[derive(Clone)]
pub struct BookingImporter {
    pool: SqlitePool,
    versions: Arc<StockVersions>,
}

impl BookingImporter {
    pub fn new(pool: SqlitePool, versions: Arc<StockVersions>) -> Self {
        Self { pool, versions }
    }

    /// File-upload import: upsert each valid row's booking and regenerate
    /// its planned events. Idempotent — re-importing an unchanged row
    /// replaces its events with an identical set.
    pub async fn import_rows(&self, rows: &[HashMap<String, String>]) -> AppResult<ImportReport> {
        let items = item::find_all(&self.pool).await?;
        let mut count = 0;
        let mut diagnostics = Vec::new();

        for (idx, row) in rows.iter().enumerate() {
            let row_no = idx + 1;
            let (Some(booking_id), Some(date_raw), Some(guests_raw)) = (
                field(row, FILE_ID_COL),
                field(row, FILE_DATE_COL),
                field(row, FILE_GUESTS_COL),
            ) else {
                diagnostics.push(format!("row {row_no}: missing required fields"));
                continue;
            };
            let Some(guests) = parse_guests(guests_raw) else {
                diagnostics.push(format!(
                    "row {row_no}: guest count is not numeric: {guests_raw}"
                ));
                continue;
            };
            let Some(check_in) = parse_flexible_date(date_raw) else {
                tracing::warn!(row = row_no, date = %date_raw, "Unparseable check-in date, skipping row");
                diagnostics.push(format!("row {row_no}: unparseable date: {date_raw}"));
                continue;
            };

            let note = format!("Booking #{booking_id} Check-in");
            self.upsert_with_events(&items, booking_id, check_in, guests, &note)
                .await?;
            count += 1;
        }

        self.versions.increment(RESOURCE_FORECAST);
        Ok(ImportReport { count, diagnostics })
    }

    /// Sheet-driven full sync: upsert every valid row, then delete every
    /// previously imported booking whose composite id is absent from the
    /// sheet — the booking set mirrors the sheet, not merely adds to it.
    pub async fn full_sync(&self, rows: &[HashMap<String, String>]) -> AppResult<SyncReport> {
        let items = item::find_all(&self.pool).await?;
        let mut valid_ids: HashSet<String> = HashSet::new();
        let mut count = 0;
        let mut diagnostics = Vec::new();

        for (idx, row) in rows.iter().enumerate() {
            let row_no = idx + 1;
            let fields = SheetFields::extract(row);
            let (Some(date_raw), Some(guests_raw)) = (fields.date, fields.guests) else {
                diagnostics.push(format!("row {row_no}: missing required fields"));
                continue;
            };
            let Some(guests) = parse_guests(guests_raw) else {
                diagnostics.push(format!(
                    "row {row_no}: guest count is not numeric: {guests_raw}"
                ));
                continue;
            };
            let Some(check_in) = parse_flexible_date(date_raw) else {
                tracing::warn!(row = row_no, date = %date_raw, "Unparseable check-in date, skipping row");
                diagnostics.push(format!("row {row_no}: unparseable date: {date_raw}"));
                continue;
            };

            // Sheets carry no stable id; synthesize one from the normalized
            // (unpadded) date string plus the guest name
            let name = fields.name.unwrap_or_default();
            let booking_id = format!("{}-{}", normalize_date_string(date_raw), name);
            valid_ids.insert(booking_id.clone());

            let note = format!("{name}様 Check-in");
            self.upsert_with_events(&items, &booking_id, check_in, guests, &note)
                .await?;
            count += 1;
        }

        // Mirror semantics: drop bookings that vanished from the sheet
        let existing = booking::find_all(&self.pool).await?;
        let stale: Vec<String> = existing
            .into_iter()
            .map(|b| b.booking_id)
            .filter(|id| !valid_ids.contains(id))
            .collect();
        let deleted = stale.len();

        if !stale.is_empty() {
            tracing::info!(count = deleted, ids = ?stale, "Deleting bookings missing from sheet");
            let mut tx = self
                .pool
                .begin()
                .await
                .map_err(|e| AppError::database(e.to_string()))?;
            for booking_id in &stale {
                booking::delete_with_planned(&mut tx, booking_id).await?;
            }
            tx.commit()
                .await
                .map_err(|e| AppError::database(e.to_string()))?;
        }

        self.versions.increment(RESOURCE_FORECAST);
        Ok(SyncReport {
            count,
            deleted,
            diagnostics,
        })
    }

    /// Analysis-only dry run over sheet rows: the same per-row validation,
    /// no writes. Report is sorted by parsed date, unparseable rows last.
    pub fn analyze_rows(rows: &[HashMap<String, String>]) -> Vec<RowCheck> {
        let mut checks: Vec<(Option<NaiveDate>, usize, RowCheck)> = Vec::new();

        for (idx, row) in rows.iter().enumerate() {
            let row_no = idx + 1;
            let fields = SheetFields::extract(row);
            let name = fields.name.unwrap_or_default().to_string();

            let (parsed, check) = match (fields.date, fields.guests) {
                (Some(date_raw), Some(guests_raw)) => {
                    let parsed = parse_flexible_date(date_raw);
                    let guests = parse_guests(guests_raw);
                    let error = if parsed.is_none() {
                        Some(format!("unparseable date: {date_raw}"))
                    } else if guests.is_none() {
                        Some(format!("guest count is not numeric: {guests_raw}"))
                    } else {
                        None
                    };
                    let check = RowCheck {
                        row: row_no,
                        date: parsed.map(date_key).unwrap_or_else(|| date_raw.to_string()),
                        name,
                        guests,
                        valid: error.is_none(),
                        error,
                    };
                    (parsed, check)
                }
                (date, _) => {
                    let check = RowCheck {
                        row: row_no,
                        date: date.unwrap_or_default().to_string(),
                        name,
                        guests: None,
                        valid: false,
                        error: Some("missing required fields".to_string()),
                    };
                    (None, check)
                }
            };
            checks.push((parsed, row_no, check));
        }

        checks.sort_by(|a, b| match (&a.0, &b.0) {
            (Some(da), Some(db)) => da.cmp(db).then(a.1.cmp(&b.1)),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.1.cmp(&b.1),
        });

        checks.into_iter().map(|(_, _, check)| check).collect()
    }

    /// Upsert one booking and atomically replace its planned-event set:
    /// one event per item, dated to the check-in day, consumption negative.
    async fn upsert_with_events(
        &self,
        items: &[Item],
        booking_id: &str,
        check_in: NaiveDate,
        guests: i64,
        note: &str,
    ) -> AppResult<()> {
        let day = date_key(check_in);
        booking::upsert(&self.pool, booking_id, &day, guests).await?;

        let events: Vec<PlannedEventCreate> = items
            .iter()
            .map(|item| PlannedEventCreate {
                booking_id: Some(booking_id.to_string()),
                item_id: item.id.clone(),
                date: day.clone(),
                delta: -item.formula().consumption(guests),
                note: Some(note.to_string()),
            })
            .collect();
        planned_event::replace_for_booking(&self.pool, booking_id, &events).await?;
        Ok(())
    }
}

/// Sheet row fields after applying the legacy column fallbacks
struct SheetFields<'a> {
    date: Option<&'a str>,
    name: Option<&'a str>,
    guests: Option<&'a str>,
}

impl<'a> SheetFields<'a> {
    fn extract(row: &'a HashMap<String, String>) -> Self {
        Self {
            date: field(row, SHEET_DATE_COL),
            // Legacy sheets had no 宿泊者名 column; fall back as the old
            // importer did
            name: field(row, SHEET_NAME_COL).or_else(|| field(row, SHEET_GUESTS_COL)),
            guests: field(row, SHEET_GUESTS_COL).or_else(|| field(row, SHEET_REMARKS_COL)),
        }
    }
}

/// Non-empty trimmed cell, or None
fn field<'a>(row: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    row.get(key).map(|v| v.trim()).filter(|v| !v.is_empty())
}

/// parseInt semantics: leading ASCII digits ("4名" → 4), else None
fn parse_guests(raw: &str) -> Option<i64> {
    let digits: String = raw
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        None
    } else {
        digits.parse().ok()
    }
}
