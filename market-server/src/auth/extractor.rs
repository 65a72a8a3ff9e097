//! Requester extractor
//!
//! Reuses the [`Requester`] injected by the middleware, falling back to
//! validating the `Authorization` header itself.

use axum::{extract::FromRequestParts, http::request::Parts};
use shared::error::AppError;

use super::{JwtService, Requester, rejection};
use crate::state::AppState;

impl FromRequestParts<AppState> for Requester {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(requester) = parts.extensions.get::<Requester>() {
            return Ok(requester.clone());
        }

        let header = parts
            .headers
            .get(http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(AppError::not_authenticated)?;
        let token = JwtService::extract_from_header(header)
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?;

        let requester = state.jwt.authenticate(token).map_err(|e| {
            tracing::warn!(uri = %parts.uri, error = %e, "Authentication failed");
            rejection(e)
        })?;
        parts.extensions.insert(requester.clone());
        Ok(requester)
    }
}
