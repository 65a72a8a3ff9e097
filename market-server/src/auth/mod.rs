//! Authentication and role checks

mod extractor;
mod jwt;
mod middleware;

pub use jwt::{Claims, JwtError, JwtService, Requester};
pub use middleware::{is_public_route, require_auth};

use shared::error::{AppError, ErrorCode};
use shared::models::UserRole;

/// Map a token failure to the API error returned to the client
pub(crate) fn rejection(err: JwtError) -> AppError {
    match err {
        JwtError::ExpiredToken => AppError::new(ErrorCode::TokenExpired),
        _ => AppError::invalid_token("Invalid token"),
    }
}

impl Requester {
    pub fn require_farmer(&self) -> Result<(), AppError> {
        if self.role != UserRole::Farmer {
            return Err(AppError::new(ErrorCode::FarmerRequired));
        }
        Ok(())
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        if !self.is_admin() {
            return Err(AppError::new(ErrorCode::AdminRequired));
        }
        Ok(())
    }
}
