//! Placement errors and their HTTP mapping

use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum PlacementError {
    #[error("Produce not found: {0}")]
    ListingNotFound(i64),

    #[error("Invalid quantity: {0}")]
    InvalidQuantity(Decimal),

    #[error("Farmer {farmer_id} cannot purchase own listing {listing_id}")]
    SelfPurchase { farmer_id: i64, listing_id: i64 },

    #[error("Insufficient stock: requested {requested}, available {available}")]
    InsufficientStock {
        requested: Decimal,
        available: Decimal,
    },

    #[error("Order total out of range: {quantity} x {price_per_unit}")]
    TotalOutOfRange {
        quantity: Decimal,
        price_per_unit: Decimal,
    },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl From<PlacementError> for AppError {
    fn from(err: PlacementError) -> Self {
        match err {
            PlacementError::ListingNotFound(id) => {
                AppError::new(ErrorCode::ListingNotFound).with_detail("produceId", id)
            }
            PlacementError::InvalidQuantity(_) => AppError::new(ErrorCode::InvalidQuantity),
            PlacementError::SelfPurchase { .. } => AppError::new(ErrorCode::SelfPurchase),
            PlacementError::InsufficientStock {
                requested,
                available,
            } => AppError::insufficient_stock(requested.to_string(), available.to_string()),
            PlacementError::TotalOutOfRange { .. } => {
                AppError::with_message(ErrorCode::InvalidQuantity, "Order total is out of range")
            }
            PlacementError::Store(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    #[test]
    fn maps_to_http_status() {
        let cases = [
            (PlacementError::ListingNotFound(1), StatusCode::NOT_FOUND),
            (
                PlacementError::InvalidQuantity(Decimal::ZERO),
                StatusCode::BAD_REQUEST,
            ),
            (
                PlacementError::SelfPurchase {
                    farmer_id: 1,
                    listing_id: 2,
                },
                StatusCode::FORBIDDEN,
            ),
            (
                PlacementError::InsufficientStock {
                    requested: Decimal::from(60),
                    available: Decimal::from(40),
                },
                StatusCode::CONFLICT,
            ),
            (
                PlacementError::TotalOutOfRange {
                    quantity: Decimal::MAX,
                    price_per_unit: Decimal::TWO,
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                PlacementError::Store(StoreError::Unavailable("down".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(AppError::from(err).http_status(), status);
        }
    }

    #[test]
    fn store_error_message_is_opaque() {
        let app: AppError =
            PlacementError::Store(StoreError::Unavailable("pg at 10.0.0.3 refused".into())).into();
        assert_eq!(app.message, "Database error");
    }
}
