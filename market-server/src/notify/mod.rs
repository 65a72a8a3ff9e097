//! Notification fan-out
//!
//! The placement engine returns [`MarketEvent`]s; the [`NotificationDispatcher`]
//! renders them into user-facing messages and hands them to a
//! [`NotificationSink`]. Delivery is best-effort: sink failures are logged
//! and never reach the caller.

pub mod hub;

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::models::{NewNotification, Notification, NotificationKind};
use thiserror::Error;

pub use hub::NotificationHub;

use crate::orders::MarketEvent;
use crate::store::{NotificationStore, StoreError, UserStore};

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification store error: {0}")]
    Store(#[from] StoreError),

    #[error("notification transport error: {0}")]
    Transport(String),
}

/// Destination for rendered notifications
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn emit(&self, notification: NewNotification) -> Result<Notification, NotifyError>;
}

/// Persists every notification, then pushes it to live subscribers
pub struct FanoutSink {
    store: Arc<dyn NotificationStore>,
    hub: NotificationHub,
}

impl FanoutSink {
    pub fn new(store: Arc<dyn NotificationStore>, hub: NotificationHub) -> Self {
        Self { store, hub }
    }
}

#[async_trait]
impl NotificationSink for FanoutSink {
    async fn emit(&self, notification: NewNotification) -> Result<Notification, NotifyError> {
        let stored = self.store.insert(notification).await?;
        let delivered = self.hub.publish(&stored);
        tracing::debug!(
            notification_id = stored.id,
            recipient_id = stored.recipient_id,
            kind = stored.kind.as_str(),
            live = delivered,
            "Notification stored"
        );
        Ok(stored)
    }
}

/// Renders engine events into notifications and emits them in order
pub struct NotificationDispatcher {
    sink: Arc<dyn NotificationSink>,
    users: Arc<dyn UserStore>,
}

impl NotificationDispatcher {
    pub fn new(sink: Arc<dyn NotificationSink>, users: Arc<dyn UserStore>) -> Self {
        Self { sink, users }
    }

    /// Emit one notification per event. Returns how many were accepted by the sink.
    pub async fn dispatch(&self, events: &[MarketEvent]) -> usize {
        let mut sent = 0;
        for event in events {
            let notification = self.render(event).await;
            match self.sink.emit(notification).await {
                Ok(_) => sent += 1,
                Err(e) => {
                    tracing::warn!(event = event.name(), error = %e, "Failed to emit notification");
                }
            }
        }
        sent
    }

    async fn render(&self, event: &MarketEvent) -> NewNotification {
        match event {
            MarketEvent::ThresholdReached {
                farmer_id,
                listing_id,
                produce_type,
                unit,
                remaining,
                food_bank_name,
                donation_order_id,
                ..
            } => NewNotification {
                recipient_id: *farmer_id,
                kind: NotificationKind::Threshold,
                message: format!(
                    "Your produce {produce_type} has reached the donation threshold. \
                     Remaining {} {unit} will be donated to {food_bank_name}.",
                    display(*remaining)
                ),
                related_listing: Some(*listing_id),
                related_order: Some(*donation_order_id),
            },
            MarketEvent::PurchaseReceived {
                farmer_id,
                consumer_name,
                listing_id,
                order_id,
                produce_type,
                unit,
                quantity,
            } => NewNotification {
                recipient_id: *farmer_id,
                kind: NotificationKind::Purchase,
                message: format!(
                    "{consumer_name} has purchased {} {unit} of your {produce_type}.",
                    display(*quantity)
                ),
                related_listing: Some(*listing_id),
                related_order: Some(*order_id),
            },
            MarketEvent::PurchaseConfirmed {
                consumer_id,
                farmer_id,
                listing_id,
                order_id,
                produce_type,
                unit,
                quantity,
            } => {
                let pickup = match self.farmer_email(*farmer_id).await {
                    Some(email) => format!("Contact farmer at {email} to arrange pickup."),
                    None => "Contact the farmer to arrange pickup.".to_string(),
                };
                NewNotification {
                    recipient_id: *consumer_id,
                    kind: NotificationKind::Purchase,
                    message: format!(
                        "Your purchase of {} {unit} of {produce_type} was successful. {pickup}",
                        display(*quantity)
                    ),
                    related_listing: Some(*listing_id),
                    related_order: Some(*order_id),
                }
            }
        }
    }

    async fn farmer_email(&self, farmer_id: i64) -> Option<String> {
        match self.users.find_by_id(farmer_id).await {
            Ok(user) => user.map(|u| u.email),
            Err(e) => {
                tracing::warn!(farmer_id, error = %e, "Farmer lookup failed; sending notification without contact");
                None
            }
        }
    }
}

/// `2.50` reads as `2.5`, `85.0` as `85`
fn display(value: Decimal) -> Decimal {
    value.normalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use shared::models::{Unit, User, UserRole};

    use crate::store::memory::MemoryStore;

    #[derive(Default)]
    struct RecordingSink {
        seen: Mutex<Vec<NewNotification>>,
        fail: bool,
    }

    #[async_trait]
    impl NotificationSink for RecordingSink {
        async fn emit(&self, notification: NewNotification) -> Result<Notification, NotifyError> {
            self.seen.lock().push(notification.clone());
            if self.fail {
                return Err(NotifyError::Transport("sink offline".into()));
            }
            Ok(Notification {
                id: 1,
                recipient_id: notification.recipient_id,
                kind: notification.kind,
                message: notification.message,
                related_listing: notification.related_listing,
                related_order: notification.related_order,
                read: false,
                created_at: 0,
            })
        }
    }

    fn farmer(id: i64) -> User {
        User {
            id,
            email: "fern@farm.test".to_string(),
            hashed_password: String::new(),
            role: UserRole::Farmer,
            name: "Fern".to_string(),
            business_name: None,
            phone_number: None,
            business_type: None,
            farm_name: Some("Green Acre".to_string()),
            farm_location: None,
            farm_size: None,
            certifications: None,
            created_at: 0,
        }
    }

    fn events() -> Vec<MarketEvent> {
        vec![
            MarketEvent::ThresholdReached {
                farmer_id: 10,
                listing_id: 1,
                produce_type: "Apples".to_string(),
                unit: Unit::Kg,
                remaining: Decimal::new(1500, 2),
                food_bank_id: 90,
                food_bank_name: "Harbor Food Bank".to_string(),
                donation_order_id: 7,
            },
            MarketEvent::PurchaseReceived {
                farmer_id: 10,
                consumer_name: "Casey".to_string(),
                listing_id: 1,
                order_id: 6,
                produce_type: "Apples".to_string(),
                unit: Unit::Kg,
                quantity: Decimal::from(85),
            },
            MarketEvent::PurchaseConfirmed {
                consumer_id: 20,
                farmer_id: 10,
                listing_id: 1,
                order_id: 6,
                produce_type: "Apples".to_string(),
                unit: Unit::Kg,
                quantity: Decimal::from(85),
            },
        ]
    }

    #[tokio::test]
    async fn renders_messages_in_event_order() {
        let users = Arc::new(MemoryStore::new());
        UserStore::insert(users.as_ref(), farmer(10)).await.unwrap();
        let sink = Arc::new(RecordingSink::default());
        let dispatcher = NotificationDispatcher::new(sink.clone(), users);

        assert_eq!(dispatcher.dispatch(&events()).await, 3);

        let seen = sink.seen.lock();
        assert_eq!(seen[0].recipient_id, 10);
        assert_eq!(seen[0].kind, NotificationKind::Threshold);
        assert_eq!(seen[0].related_order, Some(7));
        assert_eq!(
            seen[0].message,
            "Your produce Apples has reached the donation threshold. \
             Remaining 15 kg will be donated to Harbor Food Bank."
        );
        assert_eq!(seen[1].message, "Casey has purchased 85 kg of your Apples.");
        assert_eq!(seen[2].recipient_id, 20);
        assert_eq!(
            seen[2].message,
            "Your purchase of 85 kg of Apples was successful. \
             Contact farmer at fern@farm.test to arrange pickup."
        );
    }

    #[tokio::test]
    async fn missing_farmer_falls_back_to_generic_contact() {
        let users = Arc::new(MemoryStore::new());
        let sink = Arc::new(RecordingSink::default());
        let dispatcher = NotificationDispatcher::new(sink.clone(), users);

        dispatcher.dispatch(&events()[2..]).await;

        let seen = sink.seen.lock();
        assert!(seen[0].message.ends_with("Contact the farmer to arrange pickup."));
    }

    #[tokio::test]
    async fn sink_failures_are_swallowed() {
        let users = Arc::new(MemoryStore::new());
        let sink = Arc::new(RecordingSink {
            fail: true,
            ..Default::default()
        });
        let dispatcher = NotificationDispatcher::new(sink.clone(), users);

        assert_eq!(dispatcher.dispatch(&events()).await, 0);
        // Every event was still attempted
        assert_eq!(sink.seen.lock().len(), 3);
    }

    #[tokio::test]
    async fn fanout_persists_then_publishes() {
        let store = Arc::new(MemoryStore::new());
        let hub = NotificationHub::new();
        let mut rx = hub.subscribe(10);
        let sink = FanoutSink::new(store.clone(), hub);

        let stored = sink
            .emit(NewNotification {
                recipient_id: 10,
                kind: NotificationKind::Purchase,
                message: "hi".to_string(),
                related_listing: None,
                related_order: None,
            })
            .await
            .unwrap();

        assert_eq!(rx.recv().await.unwrap(), stored);
        let listed = store.list_for_recipient(10, 50).await.unwrap();
        assert_eq!(listed, vec![stored]);
    }
}
