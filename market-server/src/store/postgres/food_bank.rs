//! Food bank queries

use async_trait::async_trait;
use shared::models::FoodBank;

use super::PgStore;
use crate::store::{FoodBankDirectory, StoreResult};

#[derive(sqlx::FromRow)]
struct FoodBankRow {
    id: i64,
    name: String,
    location: String,
    email: String,
    phone: String,
    active: bool,
}

impl From<FoodBankRow> for FoodBank {
    fn from(row: FoodBankRow) -> Self {
        FoodBank {
            id: row.id,
            name: row.name,
            location: row.location,
            email: row.email,
            phone: row.phone,
            active: row.active,
        }
    }
}

#[async_trait]
impl FoodBankDirectory for PgStore {
    async fn pick_random_active(&self) -> StoreResult<Option<FoodBank>> {
        let row: Option<FoodBankRow> = sqlx::query_as(
            "SELECT id, name, location, email, phone, active FROM food_banks
             WHERE active ORDER BY random() LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(FoodBank::from))
    }

    async fn insert(&self, food_bank: FoodBank) -> StoreResult<FoodBank> {
        sqlx::query(
            "INSERT INTO food_banks (id, name, location, email, phone, active)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(food_bank.id)
        .bind(&food_bank.name)
        .bind(&food_bank.location)
        .bind(&food_bank.email)
        .bind(&food_bank.phone)
        .bind(food_bank.active)
        .execute(&self.pool)
        .await?;
        Ok(food_bank)
    }

    async fn list(&self) -> StoreResult<Vec<FoodBank>> {
        let rows: Vec<FoodBankRow> = sqlx::query_as(
            "SELECT id, name, location, email, phone, active FROM food_banks ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(FoodBank::from).collect())
    }
}
