//! Unified error codes for the farm market
//!
//! This module defines all error codes returned by market-server and consumed
//! by the web frontend. Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 4xxx: Order errors
//! - 6xxx: Listing errors
//! - 7xxx: Food bank errors
//! - 8xxx: User errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (email/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Password too short
    PasswordTooShort = 1008,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Farmer role required
    FarmerRequired = 2002,
    /// Admin role required
    AdminRequired = 2003,
    /// Farmer attempted to buy their own listing
    SelfPurchase = 2101,
    /// Listing belongs to another farmer
    NotListingOwner = 2102,
    /// Order belongs to another farmer
    NotOrderOwner = 2103,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Quantity must be a positive number
    InvalidQuantity = 4002,
    /// Requested quantity exceeds remaining stock
    InsufficientStock = 4003,
    /// Status transition is not allowed
    InvalidStatusTransition = 4004,

    // ==================== 6xxx: Listing ====================
    /// Listing not found
    ListingNotFound = 6001,
    /// Listing has invalid price
    ListingInvalidPrice = 6002,
    /// Threshold percentage outside 0..=100
    ListingInvalidThreshold = 6003,
    /// Listing amount is invalid
    ListingInvalidAmount = 6004,
    /// Stock changed between read and write of an owner edit
    ListingStockChanged = 6005,

    // ==================== 7xxx: Food bank ====================
    /// No active food bank available
    NoActiveFoodBank = 7002,

    // ==================== 8xxx: User ====================
    /// Email already registered
    EmailAlreadyRegistered = 8002,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid email or password",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",
            ErrorCode::PasswordTooShort => "Password is too short",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::FarmerRequired => "Access denied. Farmers only.",
            ErrorCode::AdminRequired => "Administrator role is required",
            ErrorCode::SelfPurchase => "Cannot purchase your own produce",
            ErrorCode::NotListingOwner => "Not authorized to modify this listing",
            ErrorCode::NotOrderOwner => "Not authorized to modify this order",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::InvalidQuantity => "Valid quantity is required",
            ErrorCode::InsufficientStock => "Not enough quantity available",
            ErrorCode::InvalidStatusTransition => "Order status transition is not allowed",

            // Listing
            ErrorCode::ListingNotFound => "Produce not found",
            ErrorCode::ListingInvalidPrice => "Price per unit must not be negative",
            ErrorCode::ListingInvalidThreshold => "Threshold percentage must be within 0-100",
            ErrorCode::ListingInvalidAmount => "Listing amount is invalid",
            ErrorCode::ListingStockChanged => "Stock changed since the listing was read",

            // Food bank
            ErrorCode::NoActiveFoodBank => "No food banks available",

            // User
            ErrorCode::EmailAlreadyRegistered => "User already exists",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),
            1008 => Ok(ErrorCode::PasswordTooShort),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2002 => Ok(ErrorCode::FarmerRequired),
            2003 => Ok(ErrorCode::AdminRequired),
            2101 => Ok(ErrorCode::SelfPurchase),
            2102 => Ok(ErrorCode::NotListingOwner),
            2103 => Ok(ErrorCode::NotOrderOwner),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4002 => Ok(ErrorCode::InvalidQuantity),
            4003 => Ok(ErrorCode::InsufficientStock),
            4004 => Ok(ErrorCode::InvalidStatusTransition),

            // Listing
            6001 => Ok(ErrorCode::ListingNotFound),
            6002 => Ok(ErrorCode::ListingInvalidPrice),
            6003 => Ok(ErrorCode::ListingInvalidThreshold),
            6004 => Ok(ErrorCode::ListingInvalidAmount),
            6005 => Ok(ErrorCode::ListingStockChanged),

            // Food bank
            7002 => Ok(ErrorCode::NoActiveFoodBank),

            // User
            8002 => Ok(ErrorCode::EmailAlreadyRegistered),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::ValidationFailed.code(), 2);
        assert_eq!(ErrorCode::NotFound.code(), 3);

        assert_eq!(ErrorCode::NotAuthenticated.code(), 1001);
        assert_eq!(ErrorCode::InvalidCredentials.code(), 1002);

        assert_eq!(ErrorCode::PermissionDenied.code(), 2001);
        assert_eq!(ErrorCode::SelfPurchase.code(), 2101);

        assert_eq!(ErrorCode::OrderNotFound.code(), 4001);
        assert_eq!(ErrorCode::InsufficientStock.code(), 4003);
        assert_eq!(ErrorCode::ListingNotFound.code(), 6001);
        assert_eq!(ErrorCode::NoActiveFoodBank.code(), 7002);
        assert_eq!(ErrorCode::EmailAlreadyRegistered.code(), 8002);
        assert_eq!(ErrorCode::InternalError.code(), 9001);
    }

    #[test]
    fn test_is_success() {
        assert!(ErrorCode::Success.is_success());
        assert!(!ErrorCode::InternalError.is_success());
        assert!(!ErrorCode::InsufficientStock.is_success());
    }

    #[test]
    fn test_try_from_covers_every_code() {
        let codes = [
            ErrorCode::Success,
            ErrorCode::ValidationFailed,
            ErrorCode::NotFound,
            ErrorCode::AlreadyExists,
            ErrorCode::RequiredField,
            ErrorCode::ValueOutOfRange,
            ErrorCode::NotAuthenticated,
            ErrorCode::InvalidCredentials,
            ErrorCode::TokenExpired,
            ErrorCode::TokenInvalid,
            ErrorCode::PasswordTooShort,
            ErrorCode::PermissionDenied,
            ErrorCode::FarmerRequired,
            ErrorCode::AdminRequired,
            ErrorCode::SelfPurchase,
            ErrorCode::NotListingOwner,
            ErrorCode::NotOrderOwner,
            ErrorCode::OrderNotFound,
            ErrorCode::InvalidQuantity,
            ErrorCode::InsufficientStock,
            ErrorCode::InvalidStatusTransition,
            ErrorCode::ListingNotFound,
            ErrorCode::ListingInvalidPrice,
            ErrorCode::ListingInvalidThreshold,
            ErrorCode::ListingInvalidAmount,
            ErrorCode::ListingStockChanged,
            ErrorCode::NoActiveFoodBank,
            ErrorCode::EmailAlreadyRegistered,
            ErrorCode::InternalError,
            ErrorCode::DatabaseError,
        ];

        for code in codes {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(999), Err(InvalidErrorCode(999)));
        assert_eq!(ErrorCode::try_from(10000), Err(InvalidErrorCode(10000)));
        assert_eq!(ErrorCode::try_from(6), Err(InvalidErrorCode(6)));
        assert_eq!(ErrorCode::try_from(1), Err(InvalidErrorCode(1)));
    }

    #[test]
    fn test_serialize_as_number() {
        assert_eq!(serde_json::to_string(&ErrorCode::NotFound).unwrap(), "3");
        assert_eq!(
            serde_json::to_string(&ErrorCode::InsufficientStock).unwrap(),
            "4003"
        );
    }

    #[test]
    fn test_deserialize_invalid() {
        let result: Result<ErrorCode, _> = serde_json::from_str("999");
        assert!(result.is_err());
    }

    #[test]
    fn test_message() {
        assert_eq!(ErrorCode::ListingNotFound.message(), "Produce not found");
        assert_eq!(
            ErrorCode::SelfPurchase.message(),
            "Cannot purchase your own produce"
        );
        assert_eq!(
            ErrorCode::InsufficientStock.message(),
            "Not enough quantity available"
        );
    }

    #[test]
    fn test_invalid_error_code_display() {
        let err = InvalidErrorCode(999);
        assert_eq!(format!("{}", err), "invalid error code: 999");
    }
}
