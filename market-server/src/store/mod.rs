//! Storage layer
//!
//! Each collaborator of the order placement engine is a narrow async trait:
//!
//! ```text
//! ListingStore        produce listings (conditional stock decrement, threshold CAS)
//! OrderStore          purchase + donation orders
//! FoodBankDirectory   donation recipients
//! NotificationStore   per-recipient notifications
//! UserStore           accounts
//! ```
//!
//! Two backends implement all five: [`memory::MemoryStore`] (DashMap, used in
//! development and tests) and [`postgres::PgStore`] (sqlx).

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::models::{
    FoodBank, Listing, NewNotification, Notification, Order, OrderStatus, User,
};
use thiserror::Error;

/// Storage backend error
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("duplicate {0}")]
    Duplicate(&'static str),

    #[error("corrupt row: {0}")]
    Corrupt(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Duplicate(what) => {
                AppError::with_message(ErrorCode::AlreadyExists, format!("Duplicate {what}"))
            }
            other => {
                tracing::error!(error = %other, "Store error");
                AppError::new(ErrorCode::DatabaseError)
            }
        }
    }
}

#[async_trait]
pub trait ListingStore: Send + Sync {
    async fn insert(&self, listing: Listing) -> StoreResult<Listing>;

    /// Non-deleted listing by ID
    async fn find_active_by_id(&self, id: i64) -> StoreResult<Option<Listing>>;

    /// Write the owner-editable descriptive fields of an active listing.
    ///
    /// Stock, the threshold flag and the soft-delete fields are left as
    /// stored. Returns the listing as persisted, or `None` if it is missing
    /// or deleted.
    async fn save(&self, listing: &Listing) -> StoreResult<Option<Listing>>;

    /// Set `amount` only if the active listing still holds `expected`.
    /// `None` means a purchase (or delete) got there first.
    async fn set_amount(
        &self,
        id: i64,
        expected: Decimal,
        amount: Decimal,
    ) -> StoreResult<Option<Listing>>;

    /// Decrement `amount` by `quantity` only if the listing is active and
    /// `amount >= quantity` at write time. Returns the updated listing, or
    /// `None` when the precondition failed.
    async fn decrement_stock(&self, id: i64, quantity: Decimal) -> StoreResult<Option<Listing>>;

    /// Flip `threshold_reached` false -> true. Returns `true` only for the
    /// caller that performed the transition.
    async fn mark_threshold_reached(&self, id: i64) -> StoreResult<bool>;

    /// Available, non-deleted listings, newest first
    async fn list_available(&self) -> StoreResult<Vec<Listing>>;

    /// A farmer's non-deleted listings, newest first
    async fn list_by_farmer(&self, farmer_id: i64) -> StoreResult<Vec<Listing>>;

    /// A farmer's soft-deleted listings, most recently deleted first
    async fn list_deleted_by_farmer(&self, farmer_id: i64) -> StoreResult<Vec<Listing>>;

    /// Flag a listing deleted. Returns `false` if it was missing or already deleted.
    async fn soft_delete(&self, id: i64, now: i64) -> StoreResult<bool>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn insert(&self, order: Order) -> StoreResult<Order>;
    async fn find_by_id(&self, id: i64) -> StoreResult<Option<Order>>;
    /// Orders placed by a consumer (or received by a food bank), newest first
    async fn list_by_consumer(&self, consumer_id: i64) -> StoreResult<Vec<Order>>;
    /// Orders against a farmer's listings, newest first
    async fn list_by_farmer(&self, farmer_id: i64) -> StoreResult<Vec<Order>>;
    /// Set `status = to` only while the order is still in `from`
    async fn update_status(
        &self,
        id: i64,
        from: OrderStatus,
        to: OrderStatus,
    ) -> StoreResult<Option<Order>>;
}

#[async_trait]
pub trait FoodBankDirectory: Send + Sync {
    /// Uniform random pick among active food banks
    async fn pick_random_active(&self) -> StoreResult<Option<FoodBank>>;
    async fn insert(&self, food_bank: FoodBank) -> StoreResult<FoodBank>;
    async fn list(&self) -> StoreResult<Vec<FoodBank>>;
}

#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn insert(&self, notification: NewNotification) -> StoreResult<Notification>;
    /// Newest first
    async fn list_for_recipient(&self, recipient_id: i64, limit: usize)
    -> StoreResult<Vec<Notification>>;
    /// Mark read, scoped to the recipient. `None` if not found for them.
    async fn mark_read(&self, id: i64, recipient_id: i64) -> StoreResult<Option<Notification>>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with [`StoreError::Duplicate`] when the email is taken
    async fn insert(&self, user: User) -> StoreResult<User>;
    async fn find_by_id(&self, id: i64) -> StoreResult<Option<User>>;
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;
}

/// Bundle of store handles shared by the engine and the API
#[derive(Clone)]
pub struct Stores {
    pub listings: Arc<dyn ListingStore>,
    pub orders: Arc<dyn OrderStore>,
    pub food_banks: Arc<dyn FoodBankDirectory>,
    pub notifications: Arc<dyn NotificationStore>,
    pub users: Arc<dyn UserStore>,
}

impl Stores {
    pub fn in_memory() -> Self {
        let store = Arc::new(memory::MemoryStore::new());
        Self {
            listings: store.clone(),
            orders: store.clone(),
            food_banks: store.clone(),
            notifications: store.clone(),
            users: store,
        }
    }

    pub fn postgres(pool: sqlx::PgPool) -> Self {
        let store = Arc::new(postgres::PgStore::new(pool));
        Self {
            listings: store.clone(),
            orders: store.clone(),
            food_banks: store.clone(),
            notifications: store.clone(),
            users: store,
        }
    }
}
