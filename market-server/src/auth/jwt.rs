//! JWT token service
//!
//! Issues and validates HS256 access tokens. A token carries the user ID,
//! role and display name so handlers never need a user lookup to authorize.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use shared::models::{User, UserRole};
use thiserror::Error;

/// Default token lifetime: 24 hours
pub const DEFAULT_EXPIRATION_MINUTES: i64 = 24 * 60;

/// Claims stored in the token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID (Subject)
    pub sub: String,
    /// `farmer` | `consumer` | `admin`
    pub role: String,
    /// Display name, used in purchase notifications
    pub name: String,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Error, Debug)]
pub enum JwtError {
    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("token expired")]
    ExpiredToken,

    #[error("invalid signature")]
    InvalidSignature,

    #[error("token generation failed: {0}")]
    GenerationFailed(String),

    #[error("malformed claims: {0}")]
    MalformedClaims(String),
}

#[derive(Clone)]
pub struct JwtService {
    expiration_minutes: i64,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    pub fn new(secret: &str) -> Self {
        Self::with_expiration(secret, DEFAULT_EXPIRATION_MINUTES)
    }

    pub fn with_expiration(secret: &str, expiration_minutes: i64) -> Self {
        Self {
            expiration_minutes,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn generate_token(&self, user: &User) -> Result<String, JwtError> {
        let now = Utc::now();
        let expiration = now + Duration::minutes(self.expiration_minutes);

        let claims = Claims {
            sub: user.id.to_string(),
            role: user.role.as_str().to_string(),
            name: user.name.clone(),
            exp: expiration.timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| JwtError::GenerationFailed(e.to_string()))
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["sub", "exp", "iat"]);
        // Expiry is exact; the default 60s leeway would keep expired tokens alive
        validation.leeway = 0;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
                ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                _ => JwtError::InvalidToken(e.to_string()),
            }
        })?;

        Ok(token_data.claims)
    }

    /// Validate and resolve the caller in one step
    pub fn authenticate(&self, token: &str) -> Result<Requester, JwtError> {
        Requester::try_from(self.validate_token(token)?)
    }

    /// Token from an `Authorization` header value
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header.strip_prefix("Bearer ")
    }
}

/// Authenticated caller, resolved from JWT claims
///
/// Injected into request extensions by [`super::require_auth`] and
/// extractable in any handler:
///
/// ```ignore
/// async fn handler(requester: Requester) -> ApiResult<Vec<Order>> {
///     requester.require_role(UserRole::Farmer)?;
///     // ...
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Requester {
    pub id: i64,
    pub role: UserRole,
    pub name: String,
}

impl TryFrom<Claims> for Requester {
    type Error = JwtError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let id = claims
            .sub
            .parse()
            .map_err(|_| JwtError::MalformedClaims(format!("sub: {}", claims.sub)))?;
        let role = UserRole::from_db(&claims.role)
            .ok_or_else(|| JwtError::MalformedClaims(format!("role: {}", claims.role)))?;
        Ok(Self {
            id,
            role,
            name: claims.name,
        })
    }
}

impl Requester {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: UserRole) -> User {
        User {
            id: 4242,
            email: "casey@example.com".to_string(),
            hashed_password: String::new(),
            role,
            name: "Casey".to_string(),
            business_name: None,
            phone_number: None,
            business_type: None,
            farm_name: None,
            farm_location: None,
            farm_size: None,
            certifications: None,
            created_at: 0,
        }
    }

    #[test]
    fn token_round_trip_resolves_requester() {
        let service = JwtService::new("unit-test-secret");
        let token = service.generate_token(&user(UserRole::Farmer)).unwrap();

        let requester = service.authenticate(&token).unwrap();
        assert_eq!(
            requester,
            Requester {
                id: 4242,
                role: UserRole::Farmer,
                name: "Casey".to_string(),
            }
        );
    }

    #[test]
    fn rejects_token_signed_with_other_secret() {
        let token = JwtService::new("secret-a")
            .generate_token(&user(UserRole::Consumer))
            .unwrap();
        let err = JwtService::new("secret-b").validate_token(&token).unwrap_err();
        assert!(matches!(err, JwtError::InvalidSignature));
    }

    #[test]
    fn rejects_expired_token() {
        let service = JwtService::with_expiration("unit-test-secret", -5);
        let token = service.generate_token(&user(UserRole::Consumer)).unwrap();
        assert!(matches!(
            service.validate_token(&token),
            Err(JwtError::ExpiredToken)
        ));
    }

    #[test]
    fn rejects_garbage() {
        let service = JwtService::new("unit-test-secret");
        assert!(matches!(
            service.validate_token("not.a.jwt"),
            Err(JwtError::InvalidToken(_))
        ));
    }

    #[test]
    fn malformed_claims() {
        let claims = Claims {
            sub: "abc".to_string(),
            role: "consumer".to_string(),
            name: "x".to_string(),
            exp: 0,
            iat: 0,
        };
        assert!(matches!(
            Requester::try_from(claims),
            Err(JwtError::MalformedClaims(_))
        ));
    }

    #[test]
    fn bearer_prefix() {
        assert_eq!(JwtService::extract_from_header("Bearer abc"), Some("abc"));
        assert_eq!(JwtService::extract_from_header("Basic abc"), None);
    }
}
