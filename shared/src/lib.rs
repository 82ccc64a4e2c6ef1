//! Shared types for Linen Keeper
//!
//! Data models, the consumption formula engine and business-timezone time
//! utilities, shared between linen-server and API consumers.

pub mod models;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};
