//! Order endpoints

use axum::{
    Json,
    extract::{Path, State},
};
use http::StatusCode;
use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::models::{Order, OrderStatusUpdate, PlaceOrderRequest};

use super::{ApiResult, Created};
use crate::auth::Requester;
use crate::state::AppState;

/// POST /api/orders
///
/// Places the order, then delivers notifications. Notification failures
/// never change the response.
pub async fn place(
    State(state): State<AppState>,
    requester: Requester,
    Json(req): Json<PlaceOrderRequest>,
) -> Created<Order> {
    let listing_id = req.listing_id.ok_or_else(|| {
        AppError::with_message(ErrorCode::RequiredField, "Produce ID is required")
    })?;
    let quantity = req
        .quantity
        .filter(|q| *q > Decimal::ZERO)
        .ok_or_else(|| AppError::new(ErrorCode::InvalidQuantity))?;

    let outcome = state
        .engine
        .place_order(&requester, listing_id, quantity)
        .await
        .inspect_err(|e| {
            tracing::debug!(listing_id, requester_id = requester.id, error = %e, "Order rejected");
        })?;

    state.notifier.dispatch(&outcome.events).await;

    Ok((StatusCode::CREATED, Json(outcome.order)))
}

/// GET /api/orders/my-orders
pub async fn my_orders(
    State(state): State<AppState>,
    requester: Requester,
) -> ApiResult<Vec<Order>> {
    Ok(Json(state.stores.orders.list_by_consumer(requester.id).await?))
}

/// GET /api/orders/received-orders
pub async fn received_orders(
    State(state): State<AppState>,
    requester: Requester,
) -> ApiResult<Vec<Order>> {
    requester.require_farmer()?;
    Ok(Json(state.stores.orders.list_by_farmer(requester.id).await?))
}

/// PATCH /api/orders/{id}/status
///
/// Only the farmer who received the order may move it along
/// `pending → confirmed | cancelled`, `confirmed → completed | cancelled`.
pub async fn update_status(
    State(state): State<AppState>,
    requester: Requester,
    Path(id): Path<i64>,
    Json(req): Json<OrderStatusUpdate>,
) -> ApiResult<Order> {
    let order = state
        .stores
        .orders
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;

    if order.farmer_id != requester.id {
        tracing::warn!(order_id = id, requester_id = requester.id, "Order owner mismatch");
        return Err(AppError::new(ErrorCode::NotOrderOwner));
    }

    if !order.status.can_transition_to(req.status) {
        return Err(transition_error(order.status.as_str(), req.status.as_str()));
    }

    // Conditional on the status we validated against
    match state
        .stores
        .orders
        .update_status(id, order.status, req.status)
        .await?
    {
        Some(updated) => {
            tracing::info!(order_id = id, from = %order.status, to = %updated.status, "Order status updated");
            Ok(Json(updated))
        }
        None => Err(transition_error(order.status.as_str(), req.status.as_str())),
    }
}

fn transition_error(from: &str, to: &str) -> AppError {
    AppError::new(ErrorCode::InvalidStatusTransition)
        .with_detail("from", from)
        .with_detail("to", to)
}
