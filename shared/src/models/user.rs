//! User Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Account role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Farmer,
    Consumer,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Farmer => "farmer",
            Self::Consumer => "consumer",
            Self::Admin => "admin",
        }
    }

    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "farmer" => Some(Self::Farmer),
            "consumer" => Some(Self::Consumer),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Consumer business type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BusinessType {
    Restaurant,
    #[serde(rename = "Grocery Store")]
    GroceryStore,
    #[serde(rename = "Food Processing")]
    FoodProcessing,
    #[serde(rename = "Food Bank/Shelter")]
    FoodBankShelter,
    Other,
}

impl BusinessType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Restaurant => "Restaurant",
            Self::GroceryStore => "Grocery Store",
            Self::FoodProcessing => "Food Processing",
            Self::FoodBankShelter => "Food Bank/Shelter",
            Self::Other => "Other",
        }
    }

    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "Restaurant" => Some(Self::Restaurant),
            "Grocery Store" => Some(Self::GroceryStore),
            "Food Processing" => Some(Self::FoodProcessing),
            "Food Bank/Shelter" => Some(Self::FoodBankShelter),
            "Other" => Some(Self::Other),
            _ => None,
        }
    }
}

/// User entity (password hash never leaves the server)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub hashed_password: String,
    #[serde(rename = "userType")]
    pub role: UserRole,
    pub name: String,
    // Consumer
    pub business_name: Option<String>,
    pub phone_number: Option<String>,
    pub business_type: Option<BusinessType>,
    // Farmer
    pub farm_name: Option<String>,
    pub farm_location: Option<String>,
    pub farm_size: Option<Decimal>,
    pub certifications: Option<String>,
    pub created_at: i64,
}

/// Registration payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    #[serde(rename = "userType")]
    pub role: UserRole,
    pub business_name: Option<String>,
    pub phone_number: Option<String>,
    pub business_type: Option<BusinessType>,
    pub farm_name: Option<String>,
    pub farm_location: Option<String>,
    pub farm_size: Option<Decimal>,
    pub certifications: Option<String>,
}

/// Login payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Public user summary returned with a token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserSummary {
    pub id: i64,
    pub email: String,
    pub name: String,
    #[serde(rename = "userType")]
    pub role: UserRole,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
        }
    }
}

/// Token response for register and login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_is_not_serialized() {
        let user = User {
            id: 1,
            email: "a@b.c".to_string(),
            hashed_password: "$argon2id$secret".to_string(),
            role: UserRole::Farmer,
            name: "Ann".to_string(),
            business_name: None,
            phone_number: None,
            business_type: None,
            farm_name: Some("Green Acres".to_string()),
            farm_location: Some("Valley".to_string()),
            farm_size: Some(Decimal::from(12)),
            certifications: None,
            created_at: 0,
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2"));
        assert!(json.contains("\"userType\":\"farmer\""));
    }

    #[test]
    fn business_type_display_names() {
        let t: BusinessType = serde_json::from_str("\"Food Bank/Shelter\"").unwrap();
        assert_eq!(t, BusinessType::FoodBankShelter);
        assert_eq!(BusinessType::from_db(t.as_str()), Some(t));
    }
}
