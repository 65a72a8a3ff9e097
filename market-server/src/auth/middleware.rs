//! Authentication middleware
//!
//! Validates `Authorization: Bearer <token>` on every protected route and
//! injects the resolved [`Requester`] into request extensions.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use http::Method;
use shared::error::AppError;

use super::{JwtService, Requester, rejection};
use crate::state::AppState;

/// Routes reachable without a token
///
/// - `OPTIONS *` (CORS preflight)
/// - non-`/api/` paths (health, unknown routes fall through to 404)
/// - `POST /api/auth/register`, `POST /api/auth/login`
/// - `GET /api/produce`, `GET /api/produce/{id}`
/// - `GET /api/notifications/ws` (authenticates with `?token=`)
pub fn is_public_route(method: &Method, path: &str) -> bool {
    if method == Method::OPTIONS || !path.starts_with("/api/") {
        return true;
    }
    if method == Method::POST {
        return path == "/api/auth/register" || path == "/api/auth/login";
    }
    if method == Method::GET {
        if path == "/api/produce" || path == "/api/notifications/ws" {
            return true;
        }
        if let Some(id) = path.strip_prefix("/api/produce/") {
            return !id.is_empty() && !id.contains('/');
        }
    }
    false
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if is_public_route(req.method(), req.uri().path()) {
        return Ok(next.run(req).await);
    }

    let token = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(|header| {
            JwtService::extract_from_header(header)
                .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))
        });

    let token = match token {
        Some(token) => token?,
        None => {
            tracing::warn!(uri = %req.uri(), "Missing authorization header");
            return Err(AppError::not_authenticated());
        }
    };

    let requester: Requester = state.jwt.authenticate(token).map_err(|e| {
        tracing::warn!(uri = %req.uri(), error = %e, "Authentication failed");
        rejection(e)
    })?;

    req.extensions_mut().insert(requester);
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_routes() {
        let public = [
            (Method::GET, "/health"),
            (Method::POST, "/api/auth/register"),
            (Method::POST, "/api/auth/login"),
            (Method::GET, "/api/produce"),
            (Method::GET, "/api/produce/123"),
            (Method::GET, "/api/notifications/ws"),
            (Method::OPTIONS, "/api/orders"),
        ];
        for (method, path) in public {
            assert!(is_public_route(&method, path), "{method} {path}");
        }
    }

    #[test]
    fn protected_routes() {
        let protected = [
            (Method::POST, "/api/produce"),
            (Method::PUT, "/api/produce/123"),
            (Method::DELETE, "/api/produce/123"),
            (Method::GET, "/api/produce/farmer/my-listings"),
            (Method::GET, "/api/produce/farmer/history"),
            (Method::POST, "/api/orders"),
            (Method::GET, "/api/orders/my-orders"),
            (Method::GET, "/api/notifications/my-notifications"),
            (Method::GET, "/api/foodbanks/random"),
            (Method::GET, "/api/auth/login"),
        ];
        for (method, path) in protected {
            assert!(!is_public_route(&method, path), "{method} {path}");
        }
    }
}
