//! Forecast and History Projection Views

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use super::ActualEvent;

/// Per-item header info shown alongside both projections
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockInfo {
    pub name: String,
    /// Live snapshot count at projection time
    pub current: i64,
}

/// Planned event annotated with the originating booking's guest count
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastEvent {
    pub id: i64,
    pub booking_id: Option<String>,
    pub item_id: String,
    pub date: String,
    pub delta: i64,
    pub note: Option<String>,
    /// None for hand-entered events or vanished bookings
    pub guests: Option<i64>,
}

/// One item's state on one forecast day
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastDayStatus {
    /// Running count after this day's planned events
    pub count: i64,
    pub events: Vec<ForecastEvent>,
}

/// A (date, item) pair whose projected running count is negative
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shortage {
    pub date: String,
    pub item_name: String,
    pub count: i64,
}

/// Forward projection: today through today + horizon days.
/// `forecast` keys are `YYYY-MM-DD`; `BTreeMap` keeps them ascending.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastData {
    pub stock_map: HashMap<String, StockInfo>,
    pub forecast: BTreeMap<String, HashMap<String, ForecastDayStatus>>,
    /// Ordered by date ascending
    pub shortages: Vec<Shortage>,
}

/// One item's state on one history day
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryDayStatus {
    /// Count immediately after this day's actual events were applied
    pub count: i64,
    pub events: Vec<ActualEvent>,
}

/// Backward reconstruction: today back through the window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryData {
    pub stock_map: HashMap<String, StockInfo>,
    pub history: BTreeMap<String, HashMap<String, HistoryDayStatus>>,
}
