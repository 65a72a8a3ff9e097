//! Produce Listing Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Unit a listing is measured in
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Kg,
    Lbs,
    Units,
    Boxes,
    Bushels,
    Tons,
    Quintals,
}

impl Unit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Kg => "kg",
            Self::Lbs => "lbs",
            Self::Units => "units",
            Self::Boxes => "boxes",
            Self::Bushels => "bushels",
            Self::Tons => "tons",
            Self::Quintals => "quintals",
        }
    }

    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "kg" => Some(Self::Kg),
            "lbs" => Some(Self::Lbs),
            "units" => Some(Self::Units),
            "boxes" => Some(Self::Boxes),
            "bushels" => Some(Self::Bushels),
            "tons" => Some(Self::Tons),
            "quintals" => Some(Self::Quintals),
            _ => None,
        }
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Produce grade
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Grade {
    A,
    B,
}

impl Grade {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
        }
    }

    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "A" | "a" => Some(Self::A),
            "B" | "b" => Some(Self::B),
            _ => None,
        }
    }
}

/// Donation threshold state of a listing
///
/// `NotReached -> Reached` is the only transition; `Reached` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdState {
    NotReached,
    Reached,
}

/// Produce listing entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    #[serde(rename = "_id")]
    pub id: i64,
    /// Owning farmer (User ID)
    #[serde(rename = "farmer")]
    pub farmer_id: i64,
    pub produce_type: String,
    /// Remaining stock
    pub amount: Decimal,
    /// Stock at creation; denominator for the threshold percentage
    pub original_amount: Decimal,
    #[serde(rename = "measurement")]
    pub unit: Unit,
    pub grade: Grade,
    pub location: Option<String>,
    #[serde(rename = "pricePerMeasurement")]
    pub price_per_unit: Decimal,
    /// Percentage of `original_amount` at or below which the remainder is donated
    pub threshold_percentage: Decimal,
    pub threshold_reached: bool,
    pub available: bool,
    pub is_deleted: bool,
    pub deleted_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Listing {
    /// Remaining stock as a percentage of the original amount.
    ///
    /// Returns `None` when `original_amount` is zero.
    pub fn remaining_percentage(&self) -> Option<Decimal> {
        if self.original_amount.is_zero() {
            return None;
        }
        Some(self.amount / self.original_amount * Decimal::ONE_HUNDRED)
    }

    pub fn threshold_state(&self) -> ThresholdState {
        if self.threshold_reached {
            ThresholdState::Reached
        } else {
            ThresholdState::NotReached
        }
    }

    /// Whether the current stock level should trigger the donation workflow
    pub fn should_trigger_donation(&self) -> bool {
        if self.threshold_state() == ThresholdState::Reached {
            return false;
        }
        match self.remaining_percentage() {
            Some(pct) => pct <= self.threshold_percentage,
            None => false,
        }
    }
}

/// Create listing payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingCreate {
    pub produce_type: String,
    pub amount: Decimal,
    #[serde(rename = "measurement")]
    pub unit: Unit,
    pub grade: Grade,
    pub location: Option<String>,
    #[serde(rename = "pricePerMeasurement")]
    pub price_per_unit: Decimal,
    pub threshold_percentage: Option<Decimal>,
}

/// Update listing payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingUpdate {
    pub produce_type: Option<String>,
    pub amount: Option<Decimal>,
    #[serde(rename = "measurement")]
    pub unit: Option<Unit>,
    pub grade: Option<Grade>,
    pub location: Option<String>,
    #[serde(rename = "pricePerMeasurement")]
    pub price_per_unit: Option<Decimal>,
    pub threshold_percentage: Option<Decimal>,
    pub available: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(amount: i64, original: i64, threshold: i64) -> Listing {
        Listing {
            id: 1,
            farmer_id: 10,
            produce_type: "Tomatoes".to_string(),
            amount: Decimal::from(amount),
            original_amount: Decimal::from(original),
            unit: Unit::Kg,
            grade: Grade::A,
            location: None,
            price_per_unit: Decimal::from(2),
            threshold_percentage: Decimal::from(threshold),
            threshold_reached: false,
            available: true,
            is_deleted: false,
            deleted_at: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn remaining_percentage_of_original() {
        assert_eq!(
            listing(15, 100, 20).remaining_percentage(),
            Some(Decimal::from(15))
        );
        assert_eq!(listing(5, 0, 20).remaining_percentage(), None);
    }

    #[test]
    fn trigger_at_or_below_threshold() {
        assert!(listing(20, 100, 20).should_trigger_donation());
        assert!(listing(15, 100, 20).should_trigger_donation());
        assert!(!listing(21, 100, 20).should_trigger_donation());
    }

    #[test]
    fn reached_threshold_never_triggers_again() {
        let mut l = listing(10, 100, 20);
        l.threshold_reached = true;
        assert_eq!(l.threshold_state(), ThresholdState::Reached);
        assert!(!l.should_trigger_donation());
    }

    #[test]
    fn zero_original_amount_never_triggers() {
        assert!(!listing(0, 0, 100).should_trigger_donation());
    }

    #[test]
    fn serializes_with_wire_names() {
        let json = serde_json::to_value(listing(100, 100, 20)).unwrap();
        assert_eq!(json["_id"], 1);
        assert_eq!(json["farmer"], 10);
        assert_eq!(json["measurement"], "kg");
        assert_eq!(json["grade"], "A");
        assert!(json.get("pricePerMeasurement").is_some());
        assert_eq!(json["thresholdReached"], false);
    }

    #[test]
    fn unit_db_names() {
        for unit in [Unit::Kg, Unit::Lbs, Unit::Quintals] {
            assert_eq!(Unit::from_db(unit.as_str()), Some(unit));
        }
        assert_eq!(Unit::from_db("gallons"), None);
        assert_eq!(Grade::from_db("b"), Some(Grade::B));
    }
}
