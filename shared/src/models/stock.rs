//! Stock Snapshot and Actual-Event Ledger Models

use serde::{Deserialize, Serialize};

/// Cached current on-shelf count, one row per item (1:1).
///
/// Invariant: `shelf_count == initial count + sum of actual-event deltas` for
/// the item. Maintained by the atomic upsert-by-delta path, never recomputed
/// on read. May transiently go negative.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct StockSnapshot {
    pub item_id: String,
    pub shelf_count: i64,
    pub updated_at: i64,
}

/// Append-only ledger entry for a real-world stock change.
/// Never updated or deleted in normal operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ActualEvent {
    pub id: i64,
    pub item_id: String,
    pub delta: i64,
    /// Reason tag as stored (see [`StockReason`])
    pub reason: String,
    pub memo: Option<String>,
    /// Server-assigned, monotonic for ordering
    pub created_at: i64,
}

/// Why a stock count changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockReason {
    Purchase,
    Laundry,
    Lost,
    Discard,
    Correction,
    Other,
}

impl StockReason {
    pub fn as_tag(&self) -> &'static str {
        match self {
            StockReason::Purchase => "PURCHASE",
            StockReason::Laundry => "LAUNDRY",
            StockReason::Lost => "LOST",
            StockReason::Discard => "DISCARD",
            StockReason::Correction => "CORRECTION",
            StockReason::Other => "OTHER",
        }
    }
}

/// Apply a signed delta to one item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockDeltaRequest {
    pub item_id: String,
    pub delta: i64,
    pub reason: StockReason,
    pub memo: Option<String>,
}

/// Set one item's count to an absolute value (physical count verified)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockCorrectionRequest {
    pub item_id: String,
    pub absolute_value: i64,
    pub memo: Option<String>,
}

/// One entry of a batch edit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockBatchEntry {
    pub item_id: String,
    pub delta: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockBatchRequest {
    pub updates: Vec<StockBatchEntry>,
}

/// Before/after pair reported by the stock-sheet sync
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockChange {
    pub item_id: String,
    pub item_name: String,
    pub before: i64,
    pub after: i64,
}
