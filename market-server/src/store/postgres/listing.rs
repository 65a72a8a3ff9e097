//! Listing queries

use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::models::{Grade, Listing, Unit};
use shared::util::now_millis;

use super::{PgStore, corrupt};
use crate::store::{ListingStore, StoreResult};

const COLUMNS: &str = "id, farmer_id, produce_type, amount, original_amount, unit, grade, \
    location, price_per_unit, threshold_percentage, threshold_reached, available, \
    is_deleted, deleted_at, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct ListingRow {
    id: i64,
    farmer_id: i64,
    produce_type: String,
    amount: Decimal,
    original_amount: Decimal,
    unit: String,
    grade: String,
    location: Option<String>,
    price_per_unit: Decimal,
    threshold_percentage: Decimal,
    threshold_reached: bool,
    available: bool,
    is_deleted: bool,
    deleted_at: Option<i64>,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<ListingRow> for Listing {
    type Error = crate::store::StoreError;

    fn try_from(row: ListingRow) -> Result<Self, Self::Error> {
        let unit = Unit::from_db(&row.unit).ok_or_else(|| corrupt("listings", "unit", &row.unit))?;
        let grade =
            Grade::from_db(&row.grade).ok_or_else(|| corrupt("listings", "grade", &row.grade))?;
        Ok(Listing {
            id: row.id,
            farmer_id: row.farmer_id,
            produce_type: row.produce_type,
            amount: row.amount,
            original_amount: row.original_amount,
            unit,
            grade,
            location: row.location,
            price_per_unit: row.price_per_unit,
            threshold_percentage: row.threshold_percentage,
            threshold_reached: row.threshold_reached,
            available: row.available,
            is_deleted: row.is_deleted,
            deleted_at: row.deleted_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn convert(rows: Vec<ListingRow>) -> StoreResult<Vec<Listing>> {
    rows.into_iter().map(Listing::try_from).collect()
}

#[async_trait]
impl ListingStore for PgStore {
    async fn insert(&self, listing: Listing) -> StoreResult<Listing> {
        sqlx::query(
            r#"
            INSERT INTO listings (
                id, farmer_id, produce_type, amount, original_amount, unit, grade,
                location, price_per_unit, threshold_percentage, threshold_reached,
                available, is_deleted, deleted_at, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(listing.id)
        .bind(listing.farmer_id)
        .bind(&listing.produce_type)
        .bind(listing.amount)
        .bind(listing.original_amount)
        .bind(listing.unit.as_str())
        .bind(listing.grade.as_str())
        .bind(&listing.location)
        .bind(listing.price_per_unit)
        .bind(listing.threshold_percentage)
        .bind(listing.threshold_reached)
        .bind(listing.available)
        .bind(listing.is_deleted)
        .bind(listing.deleted_at)
        .bind(listing.created_at)
        .bind(listing.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(listing)
    }

    async fn find_active_by_id(&self, id: i64) -> StoreResult<Option<Listing>> {
        let row: Option<ListingRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM listings WHERE id = $1 AND NOT is_deleted"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Listing::try_from).transpose()
    }

    async fn save(&self, listing: &Listing) -> StoreResult<Option<Listing>> {
        let row: Option<ListingRow> = sqlx::query_as(&format!(
            r#"
            UPDATE listings SET
                produce_type = $2, unit = $3, grade = $4, location = $5,
                price_per_unit = $6, threshold_percentage = $7,
                available = $8, updated_at = $9
            WHERE id = $1 AND NOT is_deleted
            RETURNING {COLUMNS}
            "#
        ))
        .bind(listing.id)
        .bind(&listing.produce_type)
        .bind(listing.unit.as_str())
        .bind(listing.grade.as_str())
        .bind(&listing.location)
        .bind(listing.price_per_unit)
        .bind(listing.threshold_percentage)
        .bind(listing.available)
        .bind(listing.updated_at)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Listing::try_from).transpose()
    }

    async fn set_amount(
        &self,
        id: i64,
        expected: Decimal,
        amount: Decimal,
    ) -> StoreResult<Option<Listing>> {
        let row: Option<ListingRow> = sqlx::query_as(&format!(
            r#"
            UPDATE listings SET amount = $3, updated_at = $4
            WHERE id = $1 AND amount = $2 AND NOT is_deleted
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(expected)
        .bind(amount)
        .bind(now_millis())
        .fetch_optional(&self.pool)
        .await?;
        row.map(Listing::try_from).transpose()
    }

    async fn decrement_stock(&self, id: i64, quantity: Decimal) -> StoreResult<Option<Listing>> {
        let row: Option<ListingRow> = sqlx::query_as(&format!(
            r#"
            UPDATE listings SET amount = amount - $2, updated_at = $3
            WHERE id = $1 AND amount >= $2 AND NOT is_deleted
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(quantity)
        .bind(now_millis())
        .fetch_optional(&self.pool)
        .await?;
        row.map(Listing::try_from).transpose()
    }

    async fn mark_threshold_reached(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE listings SET threshold_reached = TRUE, updated_at = $2
             WHERE id = $1 AND NOT threshold_reached",
        )
        .bind(id)
        .bind(now_millis())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn list_available(&self) -> StoreResult<Vec<Listing>> {
        let rows: Vec<ListingRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM listings WHERE available AND NOT is_deleted
             ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        convert(rows)
    }

    async fn list_by_farmer(&self, farmer_id: i64) -> StoreResult<Vec<Listing>> {
        let rows: Vec<ListingRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM listings WHERE farmer_id = $1 AND NOT is_deleted
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(farmer_id)
        .fetch_all(&self.pool)
        .await?;
        convert(rows)
    }

    async fn list_deleted_by_farmer(&self, farmer_id: i64) -> StoreResult<Vec<Listing>> {
        let rows: Vec<ListingRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM listings WHERE farmer_id = $1 AND is_deleted
             ORDER BY deleted_at DESC, id DESC"
        ))
        .bind(farmer_id)
        .fetch_all(&self.pool)
        .await?;
        convert(rows)
    }

    async fn soft_delete(&self, id: i64, now: i64) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE listings SET is_deleted = TRUE, available = FALSE, deleted_at = $2, updated_at = $2
             WHERE id = $1 AND NOT is_deleted",
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}
