//! Application state for market-server

use std::sync::Arc;

use shared::models::{User, UserRole};
use shared::util::{now_millis, snowflake_id};

use crate::auth::JwtService;
use crate::config::Config;
use crate::notify::{FanoutSink, NotificationDispatcher, NotificationHub, NotificationSink};
use crate::orders::PlacementEngine;
use crate::store::{self, Stores};
use crate::util::hash_password;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Store handles (PostgreSQL or in-memory)
    pub stores: Stores,
    /// Order placement engine
    pub engine: Arc<PlacementEngine>,
    /// Renders placement events into notifications
    pub notifier: Arc<NotificationDispatcher>,
    /// Live notification fan-out for WebSocket clients
    pub hub: NotificationHub,
    pub jwt: JwtService,
}

impl AppState {
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let stores = match &config.database_url {
            Some(url) => {
                let pool = store::postgres::connect(url).await?;
                tracing::info!("Connected to PostgreSQL, migrations applied");
                Stores::postgres(pool)
            }
            None => {
                tracing::warn!("DATABASE_URL not set, using in-memory stores");
                Stores::in_memory()
            }
        };

        let state = Self::from_stores(stores, &config.jwt_secret);

        if let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) {
            state.seed_admin(email, password).await?;
        }

        Ok(state)
    }

    /// Wire every component on top of existing stores
    pub fn from_stores(stores: Stores, jwt_secret: &str) -> Self {
        let hub = NotificationHub::new();
        let sink = Arc::new(FanoutSink::new(stores.notifications.clone(), hub.clone()));
        Self {
            engine: Arc::new(PlacementEngine::new(&stores)),
            notifier: Arc::new(NotificationDispatcher::new(sink, stores.users.clone())),
            hub,
            jwt: JwtService::new(jwt_secret),
            stores,
        }
    }

    /// Replace the notification sink (fault injection, alternative transports)
    pub fn with_sink(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.notifier = Arc::new(NotificationDispatcher::new(sink, self.stores.users.clone()));
        self
    }

    /// Create the bootstrap administrator if the email is not registered yet
    async fn seed_admin(&self, email: &str, password: &str) -> Result<(), BoxError> {
        if self.stores.users.find_by_email(email).await?.is_some() {
            tracing::debug!(email, "Admin account already present");
            return Ok(());
        }

        let admin = User {
            id: snowflake_id(),
            email: email.to_lowercase(),
            hashed_password: hash_password(password).map_err(|e| e.to_string())?,
            role: UserRole::Admin,
            name: "Administrator".to_string(),
            business_name: None,
            phone_number: None,
            business_type: None,
            farm_name: None,
            farm_location: None,
            farm_size: None,
            certifications: None,
            created_at: now_millis(),
        };
        self.stores.users.insert(admin).await?;
        tracing::info!(email, "Seeded admin account");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn seeds_admin_once() {
        let mut config = Config::in_memory("state-test-secret");
        config.admin_email = Some("Admin@Market.test".to_string());
        config.admin_password = Some("changeme".to_string());

        let state = AppState::new(&config).await.unwrap();
        let admin = state
            .stores
            .users
            .find_by_email("admin@market.test")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(admin.role, UserRole::Admin);

        // Second run is a no-op
        state.seed_admin("admin@market.test", "changeme").await.unwrap();
    }
}
