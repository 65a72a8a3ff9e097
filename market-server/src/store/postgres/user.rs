//! User queries

use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::models::{BusinessType, User, UserRole};

use super::{PgStore, corrupt};
use crate::store::{StoreError, StoreResult, UserStore};

const COLUMNS: &str = "id, email, hashed_password, role, name, business_name, phone_number, \
    business_type, farm_name, farm_location, farm_size, certifications, created_at";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    email: String,
    hashed_password: String,
    role: String,
    name: String,
    business_name: Option<String>,
    phone_number: Option<String>,
    business_type: Option<String>,
    farm_name: Option<String>,
    farm_location: Option<String>,
    farm_size: Option<Decimal>,
    certifications: Option<String>,
    created_at: i64,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = UserRole::from_db(&row.role).ok_or_else(|| corrupt("users", "role", &row.role))?;
        let business_type = match row.business_type {
            Some(ref s) => Some(
                BusinessType::from_db(s).ok_or_else(|| corrupt("users", "business_type", s))?,
            ),
            None => None,
        };
        Ok(User {
            id: row.id,
            email: row.email,
            hashed_password: row.hashed_password,
            role,
            name: row.name,
            business_name: row.business_name,
            phone_number: row.phone_number,
            business_type,
            farm_name: row.farm_name,
            farm_location: row.farm_location,
            farm_size: row.farm_size,
            certifications: row.certifications,
            created_at: row.created_at,
        })
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[async_trait]
impl UserStore for PgStore {
    async fn insert(&self, user: User) -> StoreResult<User> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (
                id, email, hashed_password, role, name, business_name, phone_number,
                business_type, farm_name, farm_location, farm_size, certifications, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(user.id)
        .bind(user.email.to_lowercase())
        .bind(&user.hashed_password)
        .bind(user.role.as_str())
        .bind(&user.name)
        .bind(&user.business_name)
        .bind(&user.phone_number)
        .bind(user.business_type.map(|t| t.as_str()))
        .bind(&user.farm_name)
        .bind(&user.farm_location)
        .bind(user.farm_size)
        .bind(&user.certifications)
        .bind(user.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(user),
            Err(e) if is_unique_violation(&e) => Err(StoreError::Duplicate("email")),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {COLUMNS} FROM users WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        row.map(User::try_from).transpose()
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {COLUMNS} FROM users WHERE email = $1"))
                .bind(email.to_lowercase())
                .fetch_optional(&self.pool)
                .await?;
        row.map(User::try_from).transpose()
    }
}
