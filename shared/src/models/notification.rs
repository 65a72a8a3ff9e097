//! Notification Model

use serde::{Deserialize, Serialize};

/// Kind of user-facing event
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Purchase,
    Threshold,
    Donation,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Purchase => "purchase",
            Self::Threshold => "threshold",
            Self::Donation => "donation",
        }
    }

    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "purchase" => Some(Self::Purchase),
            "threshold" => Some(Self::Threshold),
            "donation" => Some(Self::Donation),
            _ => None,
        }
    }
}

/// Notification entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(rename = "_id")]
    pub id: i64,
    #[serde(rename = "recipient")]
    pub recipient_id: i64,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub message: String,
    #[serde(rename = "relatedProduce")]
    pub related_listing: Option<i64>,
    pub related_order: Option<i64>,
    pub read: bool,
    pub created_at: i64,
}

/// Notification to be stored (ID and timestamp assigned by the store)
#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    pub recipient_id: i64,
    pub kind: NotificationKind,
    pub message: String,
    pub related_listing: Option<i64>,
    pub related_order: Option<i64>,
}

/// Server → client frames on the notification WebSocket
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotificationPush {
    /// Sent on connect and after the client fell behind: latest notifications, newest first
    Ready { notifications: Vec<Notification> },
    /// A notification stored after the connection was established
    Notification { notification: Notification },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_serializes_as_type() {
        let n = Notification {
            id: 1,
            recipient_id: 2,
            kind: NotificationKind::Threshold,
            message: "m".to_string(),
            related_listing: Some(3),
            related_order: None,
            read: false,
            created_at: 0,
        };
        let json = serde_json::to_value(&n).unwrap();
        assert_eq!(json["type"], "threshold");
        assert_eq!(json["recipient"], 2);
        assert_eq!(json["relatedProduce"], 3);
        assert!(json["relatedOrder"].is_null());
    }
}
