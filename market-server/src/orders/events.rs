//! Post-commit events produced by order placement

use rust_decimal::Decimal;
use shared::models::Unit;

/// Something that happened during a committed placement.
///
/// Events are emitted in the order they must be delivered: threshold first,
/// then the farmer's purchase notice, then the consumer's.
#[derive(Debug, Clone, PartialEq)]
pub enum MarketEvent {
    /// The listing crossed its donation threshold and the remainder went to a food bank
    ThresholdReached {
        farmer_id: i64,
        listing_id: i64,
        produce_type: String,
        unit: Unit,
        remaining: Decimal,
        food_bank_id: i64,
        food_bank_name: String,
        donation_order_id: i64,
    },
    /// Tell the farmer someone bought from them
    PurchaseReceived {
        farmer_id: i64,
        consumer_name: String,
        listing_id: i64,
        order_id: i64,
        produce_type: String,
        unit: Unit,
        quantity: Decimal,
    },
    /// Confirm the purchase to the buyer (pickup contact resolved at delivery)
    PurchaseConfirmed {
        consumer_id: i64,
        farmer_id: i64,
        listing_id: i64,
        order_id: i64,
        produce_type: String,
        unit: Unit,
        quantity: Decimal,
    },
}

impl MarketEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ThresholdReached { .. } => "threshold_reached",
            Self::PurchaseReceived { .. } => "purchase_received",
            Self::PurchaseConfirmed { .. } => "purchase_confirmed",
        }
    }
}
