//! market-server: farm-to-consumer produce marketplace
//!
//! Farmers list produce, consumers buy it, and when a listing's remaining
//! stock drops to its donation threshold the remainder is handed to a food
//! bank. The order placement engine ([`orders::PlacementEngine`]) owns that
//! workflow; everything else is the HTTP surface around it.
//!
//! ```text
//! api ──► auth (JWT) ──► orders::PlacementEngine ──► store (memory | postgres)
//!                              │
//!                              └─ MarketEvent ──► notify ──► store + hub ──► WS
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod logger;
pub mod notify;
pub mod orders;
pub mod state;
pub mod store;
pub mod util;

pub use config::Config;
pub use state::AppState;
