//! Order placement engine
//!
//! ```text
//! find listing ─► validate ─► decrement stock (conditional) ─► threshold CAS
//!                                                                  │
//!                       pick food bank ◄───────────────────────────┘ (winner only)
//!                              │
//!      insert purchase order ─► insert donation order ─► events
//! ```
//!
//! Concurrency: the stock decrement is a conditional update
//! (`amount >= quantity` at write time) and the threshold flag flips through
//! a compare-and-set, so concurrent purchases can neither oversell nor
//! trigger the donation twice.
//!
//! The listing write and the order writes are separate store calls. If the
//! decrement succeeds and an order insert fails, the stock stays decremented
//! without a purchase record; that case is logged at ERROR with the full
//! context and the call fails with a store error.

use std::sync::Arc;

use rust_decimal::Decimal;
use shared::models::{Listing, Order, OrderStatus, UserRole};
use shared::util::{now_millis, snowflake_id};

use super::error::PlacementError;
use super::events::MarketEvent;
use crate::auth::Requester;
use crate::store::{FoodBankDirectory, ListingStore, OrderStore, StoreError, Stores};

/// Result of a committed placement
#[derive(Debug, Clone)]
pub struct PlacementOutcome {
    /// The persisted purchase order
    pub order: Order,
    /// Donation order created when this purchase crossed the threshold
    pub donation: Option<Order>,
    /// Events to deliver after commit, in delivery order
    pub events: Vec<MarketEvent>,
}

pub struct PlacementEngine {
    listings: Arc<dyn ListingStore>,
    orders: Arc<dyn OrderStore>,
    food_banks: Arc<dyn FoodBankDirectory>,
}

impl PlacementEngine {
    pub fn new(stores: &Stores) -> Self {
        Self {
            listings: stores.listings.clone(),
            orders: stores.orders.clone(),
            food_banks: stores.food_banks.clone(),
        }
    }

    /// Place a purchase of `quantity` units of `listing_id` for `requester`.
    ///
    /// Validation is fail-fast and happens before any write:
    /// listing exists, quantity positive, not a self-purchase, enough stock.
    pub async fn place_order(
        &self,
        requester: &Requester,
        listing_id: i64,
        quantity: Decimal,
    ) -> Result<PlacementOutcome, PlacementError> {
        let listing = self
            .listings
            .find_active_by_id(listing_id)
            .await?
            .ok_or(PlacementError::ListingNotFound(listing_id))?;

        if quantity <= Decimal::ZERO {
            return Err(PlacementError::InvalidQuantity(quantity));
        }

        if requester.role == UserRole::Farmer && requester.id == listing.farmer_id {
            return Err(PlacementError::SelfPurchase {
                farmer_id: requester.id,
                listing_id,
            });
        }

        if quantity > listing.amount {
            return Err(PlacementError::InsufficientStock {
                requested: quantity,
                available: listing.amount,
            });
        }

        let total_price = quantity.checked_mul(listing.price_per_unit).ok_or(
            PlacementError::TotalOutOfRange {
                quantity,
                price_per_unit: listing.price_per_unit,
            },
        )?;

        let order = Order {
            id: snowflake_id(),
            consumer_id: requester.id,
            listing_id,
            farmer_id: listing.farmer_id,
            quantity,
            total_price,
            status: OrderStatus::Pending,
            is_donation: false,
            created_at: now_millis(),
        };

        let Some(updated) = self.listings.decrement_stock(listing_id, quantity).await? else {
            return Err(self.lost_race(listing_id, quantity).await?);
        };

        match self.commit(requester, &updated, order).await {
            Ok(outcome) => {
                tracing::info!(
                    order_id = outcome.order.id,
                    listing_id,
                    consumer_id = requester.id,
                    quantity = %quantity,
                    total_price = %outcome.order.total_price,
                    remaining = %updated.amount,
                    donation = outcome.donation.is_some(),
                    "Order placed"
                );
                Ok(outcome)
            }
            Err(e) => {
                tracing::error!(
                    listing_id,
                    consumer_id = requester.id,
                    quantity = %quantity,
                    remaining = %updated.amount,
                    error = %e,
                    "Stock decremented but order placement failed; listing and orders are out of sync"
                );
                Err(e.into())
            }
        }
    }

    /// The conditional decrement failed after validation passed: another
    /// purchase consumed the stock, or the listing was deleted meanwhile.
    async fn lost_race(
        &self,
        listing_id: i64,
        quantity: Decimal,
    ) -> Result<PlacementError, StoreError> {
        let current = self.listings.find_active_by_id(listing_id).await?;
        tracing::debug!(listing_id, quantity = %quantity, "Stock decrement precondition failed");
        Ok(match current {
            Some(listing) => PlacementError::InsufficientStock {
                requested: quantity,
                available: listing.amount,
            },
            None => PlacementError::ListingNotFound(listing_id),
        })
    }

    /// Everything after the stock decrement
    async fn commit(
        &self,
        requester: &Requester,
        listing: &Listing,
        order: Order,
    ) -> Result<PlacementOutcome, StoreError> {
        let mut events = Vec::with_capacity(3);

        let donation = self.evaluate_threshold(listing, order.created_at).await?;

        let order = self.orders.insert(order).await?;

        let donation = match donation {
            Some((donation, food_bank_name)) => {
                let donation = self.orders.insert(donation).await?;
                events.push(MarketEvent::ThresholdReached {
                    farmer_id: listing.farmer_id,
                    listing_id: listing.id,
                    produce_type: listing.produce_type.clone(),
                    unit: listing.unit,
                    remaining: donation.quantity,
                    food_bank_id: donation.consumer_id,
                    food_bank_name,
                    donation_order_id: donation.id,
                });
                Some(donation)
            }
            None => None,
        };

        events.push(MarketEvent::PurchaseReceived {
            farmer_id: listing.farmer_id,
            consumer_name: requester.name.clone(),
            listing_id: listing.id,
            order_id: order.id,
            produce_type: listing.produce_type.clone(),
            unit: listing.unit,
            quantity: order.quantity,
        });
        events.push(MarketEvent::PurchaseConfirmed {
            consumer_id: requester.id,
            farmer_id: listing.farmer_id,
            listing_id: listing.id,
            order_id: order.id,
            produce_type: listing.produce_type.clone(),
            unit: listing.unit,
            quantity: order.quantity,
        });

        Ok(PlacementOutcome {
            order,
            donation,
            events,
        })
    }

    /// Threshold check on the post-decrement listing. Returns the donation
    /// order to persist and the recipient's name, if any.
    async fn evaluate_threshold(
        &self,
        listing: &Listing,
        now: i64,
    ) -> Result<Option<(Order, String)>, StoreError> {
        if !listing.should_trigger_donation() {
            return Ok(None);
        }
        if !self.listings.mark_threshold_reached(listing.id).await? {
            // A concurrent purchase already won the transition
            return Ok(None);
        }

        if listing.amount.is_zero() {
            tracing::info!(listing_id = listing.id, "Threshold reached with no stock left to donate");
            return Ok(None);
        }

        let Some(food_bank) = self.food_banks.pick_random_active().await? else {
            tracing::warn!(
                listing_id = listing.id,
                remaining = %listing.amount,
                "Threshold reached but no active food bank; donation skipped"
            );
            return Ok(None);
        };

        tracing::info!(
            listing_id = listing.id,
            food_bank_id = food_bank.id,
            remaining = %listing.amount,
            "Threshold reached, donating remaining stock"
        );

        let donation = Order {
            id: snowflake_id(),
            consumer_id: food_bank.id,
            listing_id: listing.id,
            farmer_id: listing.farmer_id,
            quantity: listing.amount,
            total_price: Decimal::ZERO,
            status: OrderStatus::Pending,
            is_donation: true,
            created_at: now,
        };
        Ok(Some((donation, food_bank.name)))
    }
}
