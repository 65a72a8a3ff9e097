//! Order queries

use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::models::{Order, OrderStatus};

use super::{PgStore, corrupt};
use crate::store::{OrderStore, StoreError, StoreResult};

const COLUMNS: &str =
    "id, consumer_id, listing_id, farmer_id, quantity, total_price, status, is_donation, created_at";

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i64,
    consumer_id: i64,
    listing_id: i64,
    farmer_id: i64,
    quantity: Decimal,
    total_price: Decimal,
    status: String,
    is_donation: bool,
    created_at: i64,
}

impl TryFrom<OrderRow> for Order {
    type Error = StoreError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let status = OrderStatus::from_db(&row.status)
            .ok_or_else(|| corrupt("orders", "status", &row.status))?;
        Ok(Order {
            id: row.id,
            consumer_id: row.consumer_id,
            listing_id: row.listing_id,
            farmer_id: row.farmer_id,
            quantity: row.quantity,
            total_price: row.total_price,
            status,
            is_donation: row.is_donation,
            created_at: row.created_at,
        })
    }
}

fn convert(rows: Vec<OrderRow>) -> StoreResult<Vec<Order>> {
    rows.into_iter().map(Order::try_from).collect()
}

#[async_trait]
impl OrderStore for PgStore {
    async fn insert(&self, order: Order) -> StoreResult<Order> {
        sqlx::query(
            r#"
            INSERT INTO orders (
                id, consumer_id, listing_id, farmer_id, quantity, total_price,
                status, is_donation, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(order.id)
        .bind(order.consumer_id)
        .bind(order.listing_id)
        .bind(order.farmer_id)
        .bind(order.quantity)
        .bind(order.total_price)
        .bind(order.status.as_str())
        .bind(order.is_donation)
        .bind(order.created_at)
        .execute(&self.pool)
        .await?;
        Ok(order)
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<Order>> {
        let row: Option<OrderRow> =
            sqlx::query_as(&format!("SELECT {COLUMNS} FROM orders WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        row.map(Order::try_from).transpose()
    }

    async fn list_by_consumer(&self, consumer_id: i64) -> StoreResult<Vec<Order>> {
        let rows: Vec<OrderRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM orders WHERE consumer_id = $1 ORDER BY created_at DESC, id DESC"
        ))
        .bind(consumer_id)
        .fetch_all(&self.pool)
        .await?;
        convert(rows)
    }

    async fn list_by_farmer(&self, farmer_id: i64) -> StoreResult<Vec<Order>> {
        let rows: Vec<OrderRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM orders WHERE farmer_id = $1 ORDER BY created_at DESC, id DESC"
        ))
        .bind(farmer_id)
        .fetch_all(&self.pool)
        .await?;
        convert(rows)
    }

    async fn update_status(
        &self,
        id: i64,
        from: OrderStatus,
        to: OrderStatus,
    ) -> StoreResult<Option<Order>> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "UPDATE orders SET status = $3 WHERE id = $1 AND status = $2 RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(from.as_str())
        .bind(to.as_str())
        .fetch_optional(&self.pool)
        .await?;
        row.map(Order::try_from).transpose()
    }
}
