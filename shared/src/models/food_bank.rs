//! Food Bank Model

use serde::{Deserialize, Serialize};

/// Food bank entity (donation recipient)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FoodBank {
    #[serde(rename = "_id")]
    pub id: i64,
    pub name: String,
    pub location: String,
    pub email: String,
    pub phone: String,
    pub active: bool,
}

/// Create food bank payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodBankCreate {
    pub name: String,
    pub location: String,
    pub email: String,
    pub phone: String,
    pub active: Option<bool>,
}
