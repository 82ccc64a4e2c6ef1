//! Data models
//!
//! Shared between linen-server and frontend (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! Timestamps are `i64` Unix millis; day-granularity dates are `YYYY-MM-DD`
//! strings.

pub mod booking;
pub mod item;
pub mod report;
pub mod setting;
pub mod stock;

// Re-exports
pub use booking::*;
pub use item::*;
pub use report::*;
pub use setting::*;
pub use stock::*;
