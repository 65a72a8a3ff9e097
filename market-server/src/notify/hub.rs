//! NotificationHub: live fan-out of stored notifications to connected users
//!
//! ```text
//! FanoutSink ──insert──► NotificationStore
//!     │
//!     └─publish──► NotificationHub
//!                    └── recipients: user_id → broadcast::Sender<Notification>
//!                                            │
//!                                            ▼
//!                                   WS handler (subscribe → push)
//! ```
//!
//! Channels are created lazily on first subscribe and pruned once
//! the last receiver is gone.

use std::sync::Arc;

use dashmap::DashMap;
use shared::models::Notification;
use tokio::sync::broadcast;

/// Enough to absorb a burst while a socket is busy writing
const BROADCAST_CAPACITY: usize = 64;

#[derive(Clone, Default)]
pub struct NotificationHub {
    recipients: Arc<DashMap<i64, broadcast::Sender<Notification>>>,
}

impl NotificationHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, recipient_id: i64) -> broadcast::Receiver<Notification> {
        self.recipients
            .entry(recipient_id)
            .or_insert_with(|| broadcast::channel(BROADCAST_CAPACITY).0)
            .subscribe()
    }

    /// Push to every live subscriber of the recipient. Returns how many received it.
    pub fn publish(&self, notification: &Notification) -> usize {
        let Some(tx) = self.recipients.get(&notification.recipient_id) else {
            return 0;
        };
        // No receivers is not an error
        tx.send(notification.clone()).unwrap_or(0)
    }

    /// Release a receiver and drop the recipient's channel if it was the last one
    pub fn unsubscribe(&self, recipient_id: i64, rx: broadcast::Receiver<Notification>) {
        drop(rx);
        self.prune(recipient_id);
    }

    fn prune(&self, recipient_id: i64) {
        self.recipients
            .remove_if(&recipient_id, |_, tx| tx.receiver_count() == 0);
    }

    pub fn subscriber_count(&self, recipient_id: i64) -> usize {
        self.recipients
            .get(&recipient_id)
            .map(|tx| tx.receiver_count())
            .unwrap_or(0)
    }
}
