//! Register and login

use axum::{Json, extract::State};
use http::StatusCode;
use shared::error::{AppError, ErrorCode};
use shared::models::{AuthResponse, LoginRequest, RegisterRequest, User, UserRole, UserSummary};
use shared::util::{now_millis, snowflake_id};

use super::{ApiResult, Created};
use crate::state::AppState;
use crate::store::StoreError;
use crate::util::{hash_password, verify_password};

const MIN_PASSWORD_LEN: usize = 6;

fn required(field: &Option<String>, name: &str) -> Result<String, AppError> {
    match field.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(AppError::with_message(
            ErrorCode::RequiredField,
            format!("{name} is required"),
        )),
    }
}

/// Validate a registration and build the account (without password hash)
fn build_user(req: &RegisterRequest) -> Result<User, AppError> {
    let email = req.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::validation("A valid email is required"));
    }
    if req.password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::new(ErrorCode::PasswordTooShort));
    }
    let name = req.name.trim();
    if name.is_empty() {
        return Err(AppError::with_message(ErrorCode::RequiredField, "Name is required"));
    }

    let mut user = User {
        id: snowflake_id(),
        email,
        hashed_password: String::new(),
        role: req.role,
        name: name.to_string(),
        business_name: None,
        phone_number: None,
        business_type: None,
        farm_name: None,
        farm_location: None,
        farm_size: None,
        certifications: None,
        created_at: now_millis(),
    };

    match req.role {
        UserRole::Admin => {
            return Err(AppError::permission_denied("Admin accounts cannot self-register"));
        }
        UserRole::Consumer => {
            user.business_name = Some(required(&req.business_name, "Business name")?);
            user.phone_number = Some(required(&req.phone_number, "Phone number")?);
            user.business_type = Some(req.business_type.ok_or_else(|| {
                AppError::with_message(ErrorCode::RequiredField, "Business type is required")
            })?);
        }
        UserRole::Farmer => {
            user.farm_name = Some(required(&req.farm_name, "Farm name")?);
            user.farm_location = Some(required(&req.farm_location, "Farm location")?);
            let size = req.farm_size.ok_or_else(|| {
                AppError::with_message(ErrorCode::RequiredField, "Farm size is required")
            })?;
            if size.is_sign_negative() {
                return Err(AppError::with_message(
                    ErrorCode::ValueOutOfRange,
                    "Farm size cannot be negative",
                ));
            }
            user.farm_size = Some(size);
            user.certifications = req
                .certifications
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string);
        }
    }

    Ok(user)
}

fn issue_token(state: &AppState, user: &User) -> Result<AuthResponse, AppError> {
    let token = state.jwt.generate_token(user).map_err(|e| {
        tracing::error!(user_id = user.id, error = %e, "Failed to issue token");
        AppError::internal("Failed to issue token")
    })?;
    Ok(AuthResponse {
        token,
        user: UserSummary::from(user),
    })
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Created<AuthResponse> {
    let mut user = build_user(&req)?;
    user.hashed_password = hash_password(&req.password).map_err(|e| {
        tracing::error!(error = %e, "Password hashing failed");
        AppError::internal("Password hashing failed")
    })?;

    let user = match state.stores.users.insert(user).await {
        Ok(user) => user,
        Err(StoreError::Duplicate(_)) => {
            return Err(AppError::new(ErrorCode::EmailAlreadyRegistered));
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!(user_id = user.id, role = user.role.as_str(), "User registered");
    Ok((StatusCode::CREATED, Json(issue_token(&state, &user)?)))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<AuthResponse> {
    let user = state
        .stores
        .users
        .find_by_email(req.email.trim())
        .await?
        .filter(|u| verify_password(&req.password, &u.hashed_password));

    let Some(user) = user else {
        tracing::warn!(email = %req.email, "Login failed");
        return Err(AppError::invalid_credentials());
    };

    Ok(Json(issue_token(&state, &user)?))
}
