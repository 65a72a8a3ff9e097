//! Order Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "confirmed" => Some(Self::Confirmed),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Allowed farmer-driven transitions:
    /// pending -> confirmed | cancelled, confirmed -> completed | cancelled
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Confirmed)
                | (Self::Pending, Self::Cancelled)
                | (Self::Confirmed, Self::Completed)
                | (Self::Confirmed, Self::Cancelled)
        )
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order entity
///
/// For donation orders `consumer_id` holds the food bank ID and
/// `total_price` is always zero.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: i64,
    #[serde(rename = "consumer")]
    pub consumer_id: i64,
    #[serde(rename = "produce")]
    pub listing_id: i64,
    #[serde(rename = "farmer")]
    pub farmer_id: i64,
    pub quantity: Decimal,
    pub total_price: Decimal,
    pub status: OrderStatus,
    pub is_donation: bool,
    #[serde(rename = "orderDate")]
    pub created_at: i64,
}

/// Place order payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    #[serde(rename = "produceId")]
    pub listing_id: Option<i64>,
    pub quantity: Option<Decimal>,
}

/// Update order status payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusUpdate {
    pub status: OrderStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_transitions() {
        use OrderStatus::*;
        assert!(Pending.can_transition_to(Confirmed));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Confirmed.can_transition_to(Completed));
        assert!(Confirmed.can_transition_to(Cancelled));

        assert!(!Pending.can_transition_to(Completed));
        assert!(!Pending.can_transition_to(Pending));
        assert!(!Completed.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Confirmed));
    }

    #[test]
    fn order_wire_shape() {
        let order = Order {
            id: 7,
            consumer_id: 2,
            listing_id: 3,
            farmer_id: 4,
            quantity: Decimal::from(85),
            total_price: Decimal::from(170),
            status: OrderStatus::Pending,
            is_donation: false,
            created_at: 1_700_000_000_000,
        };
        let json = serde_json::to_value(&order).unwrap();
        for key in [
            "_id",
            "consumer",
            "produce",
            "farmer",
            "quantity",
            "totalPrice",
            "status",
            "isDonation",
            "orderDate",
        ] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        assert_eq!(json["status"], "pending");
    }

    #[test]
    fn place_order_request_accepts_produce_id() {
        let req: PlaceOrderRequest =
            serde_json::from_str(r#"{"produceId": 42, "quantity": 5}"#).unwrap();
        assert_eq!(req.listing_id, Some(42));
        assert_eq!(req.quantity, Some(Decimal::from(5)));

        let req: PlaceOrderRequest = serde_json::from_str("{}").unwrap();
        assert!(req.listing_id.is_none());
        assert!(req.quantity.is_none());
    }
}
