//! Booking and Planned-Event Models

use serde::{Deserialize, Serialize};

/// A reservation imported from CSV or an external sheet.
///
/// `booking_id` is either a natural CSV field or the synthesized
/// `<normalized-date>-<name>` composite for sheets without stable ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Booking {
    pub booking_id: String,
    /// Check-in date, day granularity (`YYYY-MM-DD`)
    pub check_in: String,
    pub guests: i64,
    pub imported_at: i64,
}

/// Derived, regenerable future-consumption ledger entry.
///
/// All planned events of a booking are replaced as a set whenever the booking
/// is re-imported — never patched individually.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct PlannedEvent {
    pub id: i64,
    /// None for hand-entered events with no originating booking
    pub booking_id: Option<String>,
    pub item_id: String,
    /// Day granularity (`YYYY-MM-DD`)
    pub date: String,
    /// Consumption is negative
    pub delta: i64,
    pub note: Option<String>,
}

/// Insert payload for planned-event regeneration
#[derive(Debug, Clone)]
pub struct PlannedEventCreate {
    pub booking_id: Option<String>,
    pub item_id: String,
    pub date: String,
    pub delta: i64,
    pub note: Option<String>,
}

/// Result of a file import
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportReport {
    /// Rows successfully processed
    pub count: usize,
    /// Human-readable skip reasons, one per rejected row
    pub diagnostics: Vec<String>,
}

/// Result of a sheet-driven full sync (mirror semantics)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncReport {
    pub count: usize,
    /// Bookings removed because they vanished from the sheet
    pub deleted: usize,
    pub diagnostics: Vec<String>,
}

/// One row of the analysis-only import report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowCheck {
    /// 1-based data row number (header excluded)
    pub row: usize,
    /// Canonical parsed date, or the raw cell when unparseable
    pub date: String,
    pub name: String,
    pub guests: Option<i64>,
    pub valid: bool,
    pub error: Option<String>,
}
