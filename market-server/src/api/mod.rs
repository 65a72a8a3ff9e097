//! HTTP API for market-server
//!
//! Every `/api/` route except the public ones listed in
//! [`crate::auth::is_public_route`] passes through [`crate::auth::require_auth`].

pub mod auth;
pub mod food_banks;
pub mod health;
pub mod notifications;
pub mod orders;
pub mod produce;
pub mod ws;

use axum::routing::{get, patch, post};
use axum::{Json, Router, middleware};
use http::StatusCode;
use shared::error::AppError;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub type ApiResult<T> = Result<Json<T>, AppError>;

/// `201 Created` with a JSON body
pub type Created<T> = Result<(StatusCode, Json<T>), AppError>;

pub fn create_router(state: AppState) -> Router {
    let auth = Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login));

    let produce = Router::new()
        .route("/api/produce", get(produce::list).post(produce::create))
        .route(
            "/api/produce/{id}",
            get(produce::get).put(produce::update).delete(produce::delete),
        )
        .route("/api/produce/farmer/my-listings", get(produce::my_listings))
        .route("/api/produce/farmer/history", get(produce::history));

    let orders = Router::new()
        .route("/api/orders", post(orders::place))
        .route("/api/orders/my-orders", get(orders::my_orders))
        .route("/api/orders/received-orders", get(orders::received_orders))
        .route("/api/orders/{id}/status", patch(orders::update_status));

    let notifications = Router::new()
        .route(
            "/api/notifications/my-notifications",
            get(notifications::my_notifications),
        )
        .route("/api/notifications/{id}/read", patch(notifications::mark_read))
        .route("/api/notifications/ws", get(ws::notifications_ws));

    let food_banks = Router::new()
        .route("/api/foodbanks", get(food_banks::list).post(food_banks::create))
        .route("/api/foodbanks/random", get(food_banks::random));

    Router::new()
        .route("/health", get(health::health_check))
        .merge(auth)
        .merge(produce)
        .merge(orders)
        .merge(notifications)
        .merge(food_banks)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            crate::auth::require_auth,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
