//! Produce listing endpoints

use axum::{
    Json,
    extract::{Path, State},
};
use http::StatusCode;
use rust_decimal::Decimal;
use shared::error::{ApiResponse, AppError, ErrorCode};
use shared::models::{Listing, ListingCreate, ListingUpdate};
use shared::util::{now_millis, snowflake_id};

use super::{ApiResult, Created};
use crate::auth::Requester;
use crate::state::AppState;

/// Largest stock a listing may carry
const MAX_AMOUNT: i64 = 1_000_000_000;
/// Largest unit price; with [`MAX_AMOUNT`] the order total stays far inside `Decimal`
const MAX_PRICE_PER_UNIT: i64 = 1_000_000_000;

/// Price, threshold and stock bounds shared by create and update
fn validate(listing: &Listing) -> Result<(), AppError> {
    if listing.produce_type.trim().is_empty() {
        return Err(AppError::with_message(
            ErrorCode::RequiredField,
            "Produce type is required",
        ));
    }
    if listing.price_per_unit.is_sign_negative() {
        return Err(AppError::new(ErrorCode::ListingInvalidPrice));
    }
    if listing.price_per_unit > Decimal::from(MAX_PRICE_PER_UNIT) {
        return Err(AppError::with_message(
            ErrorCode::ListingInvalidPrice,
            "Price per unit is too large",
        )
        .with_detail("max", MAX_PRICE_PER_UNIT));
    }
    if listing.threshold_percentage < Decimal::ZERO
        || listing.threshold_percentage > Decimal::ONE_HUNDRED
    {
        return Err(AppError::new(ErrorCode::ListingInvalidThreshold));
    }
    if listing.original_amount > Decimal::from(MAX_AMOUNT) {
        return Err(AppError::with_message(
            ErrorCode::ListingInvalidAmount,
            "Amount is too large",
        )
        .with_detail("max", MAX_AMOUNT));
    }
    if listing.amount.is_sign_negative() || listing.amount > listing.original_amount {
        return Err(AppError::new(ErrorCode::ListingInvalidAmount)
            .with_detail("originalAmount", listing.original_amount.to_string()));
    }
    Ok(())
}

fn apply(listing: &mut Listing, update: ListingUpdate) {
    if let Some(v) = update.produce_type {
        listing.produce_type = v.trim().to_string();
    }
    if let Some(v) = update.amount {
        listing.amount = v;
    }
    if let Some(v) = update.unit {
        listing.unit = v;
    }
    if let Some(v) = update.grade {
        listing.grade = v;
    }
    if let Some(v) = update.location {
        listing.location = Some(v);
    }
    if let Some(v) = update.price_per_unit {
        listing.price_per_unit = v;
    }
    if let Some(v) = update.threshold_percentage {
        listing.threshold_percentage = v;
    }
    if let Some(v) = update.available {
        listing.available = v;
    }
}

/// Active listing owned by the requester
async fn owned_listing(state: &AppState, requester: &Requester, id: i64) -> Result<Listing, AppError> {
    requester.require_farmer()?;
    let listing = state
        .stores
        .listings
        .find_active_by_id(id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ListingNotFound))?;
    if listing.farmer_id != requester.id {
        tracing::warn!(listing_id = id, requester_id = requester.id, "Listing owner mismatch");
        return Err(AppError::new(ErrorCode::NotListingOwner));
    }
    Ok(listing)
}

/// POST /api/produce
pub async fn create(
    State(state): State<AppState>,
    requester: Requester,
    Json(req): Json<ListingCreate>,
) -> Created<Listing> {
    requester.require_farmer()?;

    let now = now_millis();
    let listing = Listing {
        id: snowflake_id(),
        farmer_id: requester.id,
        produce_type: req.produce_type.trim().to_string(),
        amount: req.amount,
        original_amount: req.amount,
        unit: req.unit,
        grade: req.grade,
        location: req.location.filter(|l| !l.trim().is_empty()),
        price_per_unit: req.price_per_unit,
        threshold_percentage: req.threshold_percentage.unwrap_or(Decimal::ZERO),
        threshold_reached: false,
        available: true,
        is_deleted: false,
        deleted_at: None,
        created_at: now,
        updated_at: now,
    };
    validate(&listing)?;

    let listing = state.stores.listings.insert(listing).await?;
    tracing::info!(
        listing_id = listing.id,
        farmer_id = listing.farmer_id,
        amount = %listing.amount,
        threshold = %listing.threshold_percentage,
        "Listing created"
    );
    Ok((StatusCode::CREATED, Json(listing)))
}

/// GET /api/produce
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Listing>> {
    Ok(Json(state.stores.listings.list_available().await?))
}

/// GET /api/produce/{id}
pub async fn get(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Listing> {
    state
        .stores
        .listings
        .find_active_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::new(ErrorCode::ListingNotFound))
}

/// PUT /api/produce/{id}
///
/// Descriptive fields are written as sent. A new `amount` may only lower
/// stock and is applied against the amount read here, so a purchase that
/// commits in between turns the edit into a 409 instead of restoring the
/// sold stock.
pub async fn update(
    State(state): State<AppState>,
    requester: Requester,
    Path(id): Path<i64>,
    Json(update): Json<ListingUpdate>,
) -> ApiResult<Listing> {
    let current = owned_listing(&state, &requester, id).await?;
    let new_amount = update.amount.filter(|a| *a != current.amount);

    let mut listing = current.clone();
    apply(&mut listing, update);
    validate(&listing)?;
    listing.updated_at = now_millis();

    if let Some(amount) = new_amount {
        if amount > current.amount {
            return Err(AppError::with_message(
                ErrorCode::ListingInvalidAmount,
                "Amount can only be lowered",
            )
            .with_detail("currentAmount", current.amount.to_string()));
        }
        if state
            .stores
            .listings
            .set_amount(id, current.amount, amount)
            .await?
            .is_none()
        {
            return Err(stock_changed(&state, id, current.amount).await?);
        }
    }

    let saved = state
        .stores
        .listings
        .save(&listing)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ListingNotFound))?;
    tracing::info!(listing_id = id, amount = %saved.amount, "Listing updated");
    Ok(Json(saved))
}

/// The conditional amount write failed: stock moved or the listing is gone
async fn stock_changed(state: &AppState, id: i64, read: Decimal) -> Result<AppError, AppError> {
    let Some(listing) = state.stores.listings.find_active_by_id(id).await? else {
        return Ok(AppError::new(ErrorCode::ListingNotFound));
    };
    tracing::warn!(
        listing_id = id,
        read = %read,
        current = %listing.amount,
        "Listing amount edit lost a race"
    );
    Ok(AppError::new(ErrorCode::ListingStockChanged)
        .with_detail("available", listing.amount.to_string()))
}

/// DELETE /api/produce/{id}
pub async fn delete(
    State(state): State<AppState>,
    requester: Requester,
    Path(id): Path<i64>,
) -> ApiResult<ApiResponse<()>> {
    owned_listing(&state, &requester, id).await?;
    if !state.stores.listings.soft_delete(id, now_millis()).await? {
        return Err(AppError::new(ErrorCode::ListingNotFound));
    }
    tracing::info!(listing_id = id, "Listing deleted");
    Ok(Json(ApiResponse::ok_with_message("Produce listing deleted")))
}

/// GET /api/produce/farmer/my-listings
pub async fn my_listings(
    State(state): State<AppState>,
    requester: Requester,
) -> ApiResult<Vec<Listing>> {
    requester.require_farmer()?;
    Ok(Json(state.stores.listings.list_by_farmer(requester.id).await?))
}

/// GET /api/produce/farmer/history
pub async fn history(
    State(state): State<AppState>,
    requester: Requester,
) -> ApiResult<Vec<Listing>> {
    requester.require_farmer()?;
    Ok(Json(
        state
            .stores
            .listings
            .list_deleted_by_farmer(requester.id)
            .await?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{Grade, Unit};

    use crate::store::Stores;

    fn listing() -> Listing {
        Listing {
            id: 1,
            farmer_id: 2,
            produce_type: "Kale".to_string(),
            amount: Decimal::from(40),
            original_amount: Decimal::from(50),
            unit: Unit::Bushels,
            grade: Grade::B,
            location: None,
            price_per_unit: Decimal::from(4),
            threshold_percentage: Decimal::from(10),
            threshold_reached: true,
            available: true,
            is_deleted: false,
            deleted_at: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn update_cannot_exceed_original_amount() {
        let mut l = listing();
        apply(
            &mut l,
            ListingUpdate {
                amount: Some(Decimal::from(51)),
                ..Default::default()
            },
        );
        assert_eq!(validate(&l).unwrap_err().code, ErrorCode::ListingInvalidAmount);
    }

    #[test]
    fn bounds() {
        let mut l = listing();
        l.threshold_percentage = Decimal::from(101);
        assert_eq!(validate(&l).unwrap_err().code, ErrorCode::ListingInvalidThreshold);

        let mut l = listing();
        l.price_per_unit = Decimal::from(-1);
        assert_eq!(validate(&l).unwrap_err().code, ErrorCode::ListingInvalidPrice);

        let mut l = listing();
        l.produce_type = "  ".to_string();
        assert_eq!(validate(&l).unwrap_err().code, ErrorCode::RequiredField);

        let mut l = listing();
        l.price_per_unit = Decimal::from(MAX_PRICE_PER_UNIT) + Decimal::ONE;
        assert_eq!(validate(&l).unwrap_err().code, ErrorCode::ListingInvalidPrice);

        let mut l = listing();
        l.original_amount = Decimal::from(10_000_000_000_000_000_000u64);
        l.amount = l.original_amount;
        assert_eq!(validate(&l).unwrap_err().code, ErrorCode::ListingInvalidAmount);
    }

    #[tokio::test]
    async fn lost_amount_edit_reports_current_stock() {
        let state = AppState::from_stores(Stores::in_memory(), "produce-test-secret");
        let mut l = listing();
        l.amount = Decimal::from(50);
        state.stores.listings.insert(l).await.unwrap();
        state
            .stores
            .listings
            .decrement_stock(1, Decimal::from(20))
            .await
            .unwrap();

        let err = stock_changed(&state, 1, Decimal::from(50)).await.unwrap();
        assert_eq!(err.code, ErrorCode::ListingStockChanged);
        assert_eq!(err.http_status(), StatusCode::CONFLICT);
        assert_eq!(err.details.unwrap().get("available").unwrap(), "30");

        state.stores.listings.soft_delete(1, 9).await.unwrap();
        let err = stock_changed(&state, 1, Decimal::from(30)).await.unwrap();
        assert_eq!(err.code, ErrorCode::ListingNotFound);
    }

    #[test]
    fn apply_leaves_threshold_flag_alone() {
        let mut l = listing();
        apply(
            &mut l,
            ListingUpdate {
                price_per_unit: Some(Decimal::from(5)),
                available: Some(false),
                ..Default::default()
            },
        );
        assert!(l.threshold_reached);
        assert!(!l.available);
        assert_eq!(l.price_per_unit, Decimal::from(5));
        assert!(validate(&l).is_ok());
    }
}
