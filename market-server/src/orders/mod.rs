//! Order placement and the threshold-triggered donation workflow

mod engine;
mod error;
mod events;

pub use engine::{PlacementEngine, PlacementOutcome};
pub use error::PlacementError;
pub use events::MarketEvent;
