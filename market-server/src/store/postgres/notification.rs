//! Notification queries

use async_trait::async_trait;
use shared::models::{NewNotification, Notification, NotificationKind};
use shared::util::{now_millis, snowflake_id};

use super::{PgStore, corrupt};
use crate::store::{NotificationStore, StoreError, StoreResult};

const COLUMNS: &str =
    "id, recipient_id, kind, message, related_listing, related_order, read, created_at";

#[derive(sqlx::FromRow)]
struct NotificationRow {
    id: i64,
    recipient_id: i64,
    kind: String,
    message: String,
    related_listing: Option<i64>,
    related_order: Option<i64>,
    read: bool,
    created_at: i64,
}

impl TryFrom<NotificationRow> for Notification {
    type Error = StoreError;

    fn try_from(row: NotificationRow) -> Result<Self, Self::Error> {
        let kind = NotificationKind::from_db(&row.kind)
            .ok_or_else(|| corrupt("notifications", "kind", &row.kind))?;
        Ok(Notification {
            id: row.id,
            recipient_id: row.recipient_id,
            kind,
            message: row.message,
            related_listing: row.related_listing,
            related_order: row.related_order,
            read: row.read,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl NotificationStore for PgStore {
    async fn insert(&self, notification: NewNotification) -> StoreResult<Notification> {
        let stored = Notification {
            id: snowflake_id(),
            recipient_id: notification.recipient_id,
            kind: notification.kind,
            message: notification.message,
            related_listing: notification.related_listing,
            related_order: notification.related_order,
            read: false,
            created_at: now_millis(),
        };
        sqlx::query(
            r#"
            INSERT INTO notifications (
                id, recipient_id, kind, message, related_listing, related_order, read, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, FALSE, $7)
            "#,
        )
        .bind(stored.id)
        .bind(stored.recipient_id)
        .bind(stored.kind.as_str())
        .bind(&stored.message)
        .bind(stored.related_listing)
        .bind(stored.related_order)
        .bind(stored.created_at)
        .execute(&self.pool)
        .await?;
        Ok(stored)
    }

    async fn list_for_recipient(
        &self,
        recipient_id: i64,
        limit: usize,
    ) -> StoreResult<Vec<Notification>> {
        let rows: Vec<NotificationRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM notifications WHERE recipient_id = $1
             ORDER BY created_at DESC, id DESC LIMIT $2"
        ))
        .bind(recipient_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Notification::try_from).collect()
    }

    async fn mark_read(&self, id: i64, recipient_id: i64) -> StoreResult<Option<Notification>> {
        let row: Option<NotificationRow> = sqlx::query_as(&format!(
            "UPDATE notifications SET read = TRUE WHERE id = $1 AND recipient_id = $2
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(recipient_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Notification::try_from).transpose()
    }
}
