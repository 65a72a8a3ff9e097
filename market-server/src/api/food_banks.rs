//! Food bank endpoints

use axum::{Json, extract::State};
use http::StatusCode;
use shared::error::{AppError, ErrorCode};
use shared::models::{FoodBank, FoodBankCreate};
use shared::util::snowflake_id;

use super::{ApiResult, Created};
use crate::auth::Requester;
use crate::state::AppState;

/// GET /api/foodbanks/random
pub async fn random(State(state): State<AppState>, _requester: Requester) -> ApiResult<FoodBank> {
    state
        .stores
        .food_banks
        .pick_random_active()
        .await?
        .map(Json)
        .ok_or_else(|| AppError::new(ErrorCode::NoActiveFoodBank))
}

/// GET /api/foodbanks (admin)
pub async fn list(State(state): State<AppState>, requester: Requester) -> ApiResult<Vec<FoodBank>> {
    requester.require_admin()?;
    Ok(Json(state.stores.food_banks.list().await?))
}

/// POST /api/foodbanks (admin)
pub async fn create(
    State(state): State<AppState>,
    requester: Requester,
    Json(req): Json<FoodBankCreate>,
) -> Created<FoodBank> {
    requester.require_admin()?;
    if req.name.trim().is_empty() {
        return Err(AppError::with_message(
            ErrorCode::RequiredField,
            "Food bank name is required",
        ));
    }

    let food_bank = state
        .stores
        .food_banks
        .insert(FoodBank {
            id: snowflake_id(),
            name: req.name.trim().to_string(),
            location: req.location,
            email: req.email,
            phone: req.phone,
            active: req.active.unwrap_or(true),
        })
        .await?;
    tracing::info!(food_bank_id = food_bank.id, active = food_bank.active, "Food bank added");
    Ok((StatusCode::CREATED, Json(food_bank)))
}
