//! Data models
//!
//! Shared between market-server and clients (via API).
//! All IDs are `i64` snowflakes, all timestamps UTC epoch millis.
//! JSON field names follow the public API (`_id`, camelCase).

pub mod food_bank;
pub mod listing;
pub mod notification;
pub mod order;
pub mod user;

// Re-exports
pub use food_bank::*;
pub use listing::*;
pub use notification::*;
pub use order::*;
pub use user::*;
