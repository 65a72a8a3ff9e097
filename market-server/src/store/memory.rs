//! In-memory backend
//!
//! Every trait of the storage layer over DashMap. Conditional updates run
//! under the shard write lock of the affected key, which gives the same
//! all-or-nothing guarantee as the SQL `UPDATE ... WHERE` statements.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use rand::seq::SliceRandom;
use rust_decimal::Decimal;
use shared::models::{
    FoodBank, Listing, NewNotification, Notification, Order, OrderStatus, User,
};
use shared::util::{now_millis, snowflake_id};

use super::{
    FoodBankDirectory, ListingStore, NotificationStore, OrderStore, StoreError, StoreResult,
    UserStore,
};

/// Record plus insertion sequence (tie-breaker for equal timestamps)
struct Seq<T> {
    seq: u64,
    value: T,
}

#[derive(Default)]
pub struct MemoryStore {
    seq: AtomicU64,
    listings: DashMap<i64, Seq<Listing>>,
    orders: DashMap<i64, Seq<Order>>,
    food_banks: DashMap<i64, FoodBank>,
    notifications: DashMap<i64, Seq<Notification>>,
    users: DashMap<i64, User>,
    /// lower-cased email -> user id
    emails: DashMap<String, i64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::Relaxed)
    }
}

/// Newest first by `(timestamp, seq)`
fn newest_first<T: Clone>(mut rows: Vec<(i64, u64, T)>) -> Vec<T> {
    rows.sort_by(|a, b| (b.0, b.1).cmp(&(a.0, a.1)));
    rows.into_iter().map(|(_, _, v)| v).collect()
}

#[async_trait]
impl ListingStore for MemoryStore {
    async fn insert(&self, listing: Listing) -> StoreResult<Listing> {
        let seq = self.next_seq();
        self.listings.insert(
            listing.id,
            Seq {
                seq,
                value: listing.clone(),
            },
        );
        Ok(listing)
    }

    async fn find_active_by_id(&self, id: i64) -> StoreResult<Option<Listing>> {
        Ok(self
            .listings
            .get(&id)
            .filter(|e| !e.value.is_deleted)
            .map(|e| e.value.clone()))
    }

    async fn save(&self, listing: &Listing) -> StoreResult<Option<Listing>> {
        let Some(mut entry) = self.listings.get_mut(&listing.id) else {
            return Ok(None);
        };
        let current = &mut entry.value;
        if current.is_deleted {
            return Ok(None);
        }
        current.produce_type = listing.produce_type.clone();
        current.unit = listing.unit;
        current.grade = listing.grade;
        current.location = listing.location.clone();
        current.price_per_unit = listing.price_per_unit;
        current.threshold_percentage = listing.threshold_percentage;
        current.available = listing.available;
        current.updated_at = listing.updated_at;
        Ok(Some(current.clone()))
    }

    async fn set_amount(
        &self,
        id: i64,
        expected: Decimal,
        amount: Decimal,
    ) -> StoreResult<Option<Listing>> {
        let Some(mut entry) = self.listings.get_mut(&id) else {
            return Ok(None);
        };
        let listing = &mut entry.value;
        if listing.is_deleted || listing.amount != expected {
            return Ok(None);
        }
        listing.amount = amount;
        listing.updated_at = now_millis();
        Ok(Some(listing.clone()))
    }

    async fn decrement_stock(&self, id: i64, quantity: Decimal) -> StoreResult<Option<Listing>> {
        let Some(mut entry) = self.listings.get_mut(&id) else {
            return Ok(None);
        };
        let listing = &mut entry.value;
        if listing.is_deleted || listing.amount < quantity {
            return Ok(None);
        }
        listing.amount -= quantity;
        listing.updated_at = now_millis();
        Ok(Some(listing.clone()))
    }

    async fn mark_threshold_reached(&self, id: i64) -> StoreResult<bool> {
        let Some(mut entry) = self.listings.get_mut(&id) else {
            return Ok(false);
        };
        if entry.value.threshold_reached {
            return Ok(false);
        }
        entry.value.threshold_reached = true;
        entry.value.updated_at = now_millis();
        Ok(true)
    }

    async fn list_available(&self) -> StoreResult<Vec<Listing>> {
        let rows = self
            .listings
            .iter()
            .filter(|e| e.value.available && !e.value.is_deleted)
            .map(|e| (e.value.created_at, e.seq, e.value.clone()))
            .collect();
        Ok(newest_first(rows))
    }

    async fn list_by_farmer(&self, farmer_id: i64) -> StoreResult<Vec<Listing>> {
        let rows = self
            .listings
            .iter()
            .filter(|e| e.value.farmer_id == farmer_id && !e.value.is_deleted)
            .map(|e| (e.value.created_at, e.seq, e.value.clone()))
            .collect();
        Ok(newest_first(rows))
    }

    async fn list_deleted_by_farmer(&self, farmer_id: i64) -> StoreResult<Vec<Listing>> {
        let rows = self
            .listings
            .iter()
            .filter(|e| e.value.farmer_id == farmer_id && e.value.is_deleted)
            .map(|e| (e.value.deleted_at.unwrap_or(0), e.seq, e.value.clone()))
            .collect();
        Ok(newest_first(rows))
    }

    async fn soft_delete(&self, id: i64, now: i64) -> StoreResult<bool> {
        let Some(mut entry) = self.listings.get_mut(&id) else {
            return Ok(false);
        };
        let listing = &mut entry.value;
        if listing.is_deleted {
            return Ok(false);
        }
        listing.is_deleted = true;
        listing.available = false;
        listing.deleted_at = Some(now);
        listing.updated_at = now;
        Ok(true)
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn insert(&self, order: Order) -> StoreResult<Order> {
        let seq = self.next_seq();
        self.orders.insert(
            order.id,
            Seq {
                seq,
                value: order.clone(),
            },
        );
        Ok(order)
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<Order>> {
        Ok(self.orders.get(&id).map(|e| e.value.clone()))
    }

    async fn list_by_consumer(&self, consumer_id: i64) -> StoreResult<Vec<Order>> {
        let rows = self
            .orders
            .iter()
            .filter(|e| e.value.consumer_id == consumer_id)
            .map(|e| (e.value.created_at, e.seq, e.value.clone()))
            .collect();
        Ok(newest_first(rows))
    }

    async fn list_by_farmer(&self, farmer_id: i64) -> StoreResult<Vec<Order>> {
        let rows = self
            .orders
            .iter()
            .filter(|e| e.value.farmer_id == farmer_id)
            .map(|e| (e.value.created_at, e.seq, e.value.clone()))
            .collect();
        Ok(newest_first(rows))
    }

    async fn update_status(
        &self,
        id: i64,
        from: OrderStatus,
        to: OrderStatus,
    ) -> StoreResult<Option<Order>> {
        let Some(mut entry) = self.orders.get_mut(&id) else {
            return Ok(None);
        };
        if entry.value.status != from {
            return Ok(None);
        }
        entry.value.status = to;
        Ok(Some(entry.value.clone()))
    }
}

#[async_trait]
impl FoodBankDirectory for MemoryStore {
    async fn pick_random_active(&self) -> StoreResult<Option<FoodBank>> {
        let active: Vec<FoodBank> = self
            .food_banks
            .iter()
            .filter(|e| e.active)
            .map(|e| e.value().clone())
            .collect();
        Ok(active.choose(&mut rand::thread_rng()).cloned())
    }

    async fn insert(&self, food_bank: FoodBank) -> StoreResult<FoodBank> {
        self.food_banks.insert(food_bank.id, food_bank.clone());
        Ok(food_bank)
    }

    async fn list(&self) -> StoreResult<Vec<FoodBank>> {
        let mut all: Vec<FoodBank> = self.food_banks.iter().map(|e| e.value().clone()).collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
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
        let seq = self.next_seq();
        self.notifications.insert(
            stored.id,
            Seq {
                seq,
                value: stored.clone(),
            },
        );
        Ok(stored)
    }

    async fn list_for_recipient(
        &self,
        recipient_id: i64,
        limit: usize,
    ) -> StoreResult<Vec<Notification>> {
        let rows = self
            .notifications
            .iter()
            .filter(|e| e.value.recipient_id == recipient_id)
            .map(|e| (e.value.created_at, e.seq, e.value.clone()))
            .collect();
        let mut list = newest_first(rows);
        list.truncate(limit);
        Ok(list)
    }

    async fn mark_read(&self, id: i64, recipient_id: i64) -> StoreResult<Option<Notification>> {
        let Some(mut entry) = self.notifications.get_mut(&id) else {
            return Ok(None);
        };
        if entry.value.recipient_id != recipient_id {
            return Ok(None);
        }
        entry.value.read = true;
        Ok(Some(entry.value.clone()))
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert(&self, user: User) -> StoreResult<User> {
        match self.emails.entry(user.email.to_lowercase()) {
            Entry::Occupied(_) => return Err(StoreError::Duplicate("email")),
            Entry::Vacant(slot) => {
                slot.insert(user.id);
            }
        }
        self.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        Ok(self.users.get(&id).map(|u| u.clone()))
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let Some(id) = self.emails.get(&email.to_lowercase()).map(|e| *e) else {
            return Ok(None);
        };
        Ok(self.users.get(&id).map(|u| u.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{Grade, NotificationKind, Unit, UserRole};

    fn listing(id: i64, farmer_id: i64, amount: i64, created_at: i64) -> Listing {
        Listing {
            id,
            farmer_id,
            produce_type: "Carrots".to_string(),
            amount: Decimal::from(amount),
            original_amount: Decimal::from(amount),
            unit: Unit::Kg,
            grade: Grade::A,
            location: None,
            price_per_unit: Decimal::ONE,
            threshold_percentage: Decimal::from(20),
            threshold_reached: false,
            available: true,
            is_deleted: false,
            deleted_at: None,
            created_at,
            updated_at: created_at,
        }
    }

    #[tokio::test]
    async fn decrement_respects_available_amount() {
        let store = MemoryStore::new();
        ListingStore::insert(&store, listing(1, 10, 100, 0)).await.unwrap();

        let updated = store.decrement_stock(1, Decimal::from(60)).await.unwrap();
        assert_eq!(updated.unwrap().amount, Decimal::from(40));

        assert!(store.decrement_stock(1, Decimal::from(41)).await.unwrap().is_none());
        let current = store.find_active_by_id(1).await.unwrap().unwrap();
        assert_eq!(current.amount, Decimal::from(40));

        assert!(store.decrement_stock(99, Decimal::ONE).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn threshold_flag_flips_once() {
        let store = MemoryStore::new();
        ListingStore::insert(&store, listing(1, 10, 100, 0)).await.unwrap();

        assert!(store.mark_threshold_reached(1).await.unwrap());
        assert!(!store.mark_threshold_reached(1).await.unwrap());

        // save never clears the flag
        let mut stale = listing(1, 10, 100, 0);
        stale.threshold_reached = false;
        let saved = store.save(&stale).await.unwrap().unwrap();
        assert!(saved.threshold_reached);
    }

    #[tokio::test]
    async fn save_leaves_stock_and_deletion_alone() {
        let store = MemoryStore::new();
        ListingStore::insert(&store, listing(1, 10, 100, 0)).await.unwrap();
        let mut stale = store.find_active_by_id(1).await.unwrap().unwrap();

        store.decrement_stock(1, Decimal::from(30)).await.unwrap();
        stale.price_per_unit = Decimal::TWO;
        let saved = store.save(&stale).await.unwrap().unwrap();
        assert_eq!(saved.amount, Decimal::from(70));
        assert_eq!(saved.price_per_unit, Decimal::TWO);

        assert!(store.soft_delete(1, 50).await.unwrap());
        assert!(store.save(&stale).await.unwrap().is_none());
        assert!(store.find_active_by_id(1).await.unwrap().is_none());
        assert_eq!(store.list_deleted_by_farmer(10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn set_amount_requires_the_read_amount() {
        let store = MemoryStore::new();
        ListingStore::insert(&store, listing(1, 10, 100, 0)).await.unwrap();

        let lowered = store
            .set_amount(1, Decimal::from(100), Decimal::from(80))
            .await
            .unwrap();
        assert_eq!(lowered.unwrap().amount, Decimal::from(80));

        // Stale expectation
        assert!(store
            .set_amount(1, Decimal::from(100), Decimal::from(90))
            .await
            .unwrap()
            .is_none());
        assert_eq!(store.find_active_by_id(1).await.unwrap().unwrap().amount, Decimal::from(80));

        store.soft_delete(1, 5).await.unwrap();
        assert!(store
            .set_amount(1, Decimal::from(80), Decimal::from(70))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn soft_delete_hides_listing() {
        let store = MemoryStore::new();
        ListingStore::insert(&store, listing(1, 10, 5, 1)).await.unwrap();
        ListingStore::insert(&store, listing(2, 10, 5, 2)).await.unwrap();

        assert!(store.soft_delete(1, 50).await.unwrap());
        assert!(!store.soft_delete(1, 60).await.unwrap());

        assert!(store.find_active_by_id(1).await.unwrap().is_none());
        assert!(store.decrement_stock(1, Decimal::ONE).await.unwrap().is_none());

        let active: Vec<i64> = ListingStore::list_by_farmer(&store, 10)
            .await
            .unwrap()
            .iter()
            .map(|l| l.id)
            .collect();
        assert_eq!(active, vec![2]);
        let history = store.list_deleted_by_farmer(10).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].deleted_at, Some(50));
        assert!(store.list_available().await.unwrap().iter().all(|l| l.id != 1));
    }

    #[tokio::test]
    async fn status_update_is_conditional() {
        let store = MemoryStore::new();
        let order = Order {
            id: 5,
            consumer_id: 1,
            listing_id: 2,
            farmer_id: 3,
            quantity: Decimal::ONE,
            total_price: Decimal::ONE,
            status: OrderStatus::Pending,
            is_donation: false,
            created_at: 0,
        };
        OrderStore::insert(&store, order).await.unwrap();

        let confirmed = store
            .update_status(5, OrderStatus::Pending, OrderStatus::Confirmed)
            .await
            .unwrap();
        assert_eq!(confirmed.unwrap().status, OrderStatus::Confirmed);

        let stale = store
            .update_status(5, OrderStatus::Pending, OrderStatus::Cancelled)
            .await
            .unwrap();
        assert!(stale.is_none());
    }

    #[tokio::test]
    async fn random_pick_only_returns_active() {
        let store = MemoryStore::new();
        assert!(store.pick_random_active().await.unwrap().is_none());

        for (id, active) in [(1, false), (2, true)] {
            FoodBankDirectory::insert(
                &store,
                FoodBank {
                    id,
                    name: format!("Bank {id}"),
                    location: "Town".to_string(),
                    email: "bank@example.org".to_string(),
                    phone: "555".to_string(),
                    active,
                },
            )
            .await
            .unwrap();
        }

        for _ in 0..10 {
            assert_eq!(store.pick_random_active().await.unwrap().unwrap().id, 2);
        }
    }

    #[tokio::test]
    async fn notifications_are_recipient_scoped() {
        let store = MemoryStore::new();
        let mut ids = Vec::new();
        for i in 0..3 {
            let n = NotificationStore::insert(
                &store,
                NewNotification {
                    recipient_id: 7,
                    kind: NotificationKind::Purchase,
                    message: format!("n{i}"),
                    related_listing: None,
                    related_order: None,
                },
            )
            .await
            .unwrap();
            ids.push(n.id);
        }

        let list = store.list_for_recipient(7, 2).await.unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].message, "n2");
        assert_eq!(list[1].message, "n1");

        assert!(store.mark_read(ids[0], 8).await.unwrap().is_none());
        assert!(store.mark_read(ids[0], 7).await.unwrap().unwrap().read);
    }

    #[tokio::test]
    async fn duplicate_email_rejected() {
        let store = MemoryStore::new();
        let user = |id: i64, email: &str| User {
            id,
            email: email.to_string(),
            hashed_password: String::new(),
            role: UserRole::Consumer,
            name: "C".to_string(),
            business_name: None,
            phone_number: None,
            business_type: None,
            farm_name: None,
            farm_location: None,
            farm_size: None,
            certifications: None,
            created_at: 0,
        };
        UserStore::insert(&store, user(1, "a@x.org")).await.unwrap();
        let err = UserStore::insert(&store, user(2, "A@x.org")).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate("email")));
        assert_eq!(store.find_by_email("A@X.ORG").await.unwrap().unwrap().id, 1);
    }
}
