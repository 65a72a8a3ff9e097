//! PostgreSQL backend
//!
//! Runtime-checked `sqlx::query` / `query_as` over the schema in
//! `migrations/`. Enums are stored as TEXT and mapped back with `from_db`;
//! an unknown value surfaces as [`StoreError::Corrupt`].

mod food_bank;
mod listing;
mod notification;
mod order;
mod user;

use sqlx::PgPool;

use super::{StoreError, StoreResult};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Connect and run embedded migrations
pub async fn connect(database_url: &str) -> StoreResult<PgPool> {
    let pool = PgPool::connect(database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    Ok(pool)
}

fn corrupt(table: &str, column: &str, value: &str) -> StoreError {
    StoreError::Corrupt(format!("{table}.{column} = {value:?}"))
}
