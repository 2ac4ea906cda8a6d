//! Listing Model
//!
//! A listing is one property offered for sale or rent, with structured
//! attributes, address and optional map coordinates.

use super::serde_helpers;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Listing ID type
pub type ListingId = RecordId;

/// sale | rent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationType {
    Sale,
    Rent,
}

impl OperationType {
    /// Parse a query parameter; values outside the enumerated set are
    /// ignored (treated as no filter), never rejected.
    pub fn parse_param(value: &str) -> Option<Self> {
        match value {
            "sale" => Some(Self::Sale),
            "rent" => Some(Self::Rent),
            _ => None,
        }
    }
}

/// cash | credit | either
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinancingType {
    Cash,
    Credit,
    Either,
}

impl FinancingType {
    pub fn parse_param(value: &str) -> Option<Self> {
        match value {
            "cash" => Some(Self::Cash),
            "credit" => Some(Self::Credit),
            "either" => Some(Self::Either),
            _ => None,
        }
    }
}

impl Default for FinancingType {
    fn default() -> Self {
        Self::Either
    }
}

/// available | in_negotiation | closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    Available,
    InNegotiation,
    Closed,
}

impl ListingStatus {
    pub fn parse_param(value: &str) -> Option<Self> {
        match value {
            "available" => Some(Self::Available),
            "in_negotiation" => Some(Self::InNegotiation),
            "closed" => Some(Self::Closed),
            _ => None,
        }
    }
}

impl Default for ListingStatus {
    fn default() -> Self {
        Self::Available
    }
}

/// Listing record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<ListingId>,
    /// Owning user
    #[serde(with = "serde_helpers::record_id")]
    pub owner: RecordId,

    pub title: String,
    #[serde(default)]
    pub description: String,

    pub price: Decimal,
    pub operation: OperationType,

    // ── House attributes ────────────────────────────────────────────
    #[serde(default)]
    pub bedrooms: u32,
    /// Half bathrooms allowed (1.5, 2.5, ...)
    #[serde(default)]
    pub bathrooms: f32,
    #[serde(default)]
    pub parking: u32,
    #[serde(default)]
    pub built_area: u32,
    #[serde(default)]
    pub lot_area: u32,

    #[serde(default)]
    pub financing: FinancingType,

    // ── Address ─────────────────────────────────────────────────────
    pub street: String,
    #[serde(default)]
    pub number: String,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,

    // ── Map coordinates ─────────────────────────────────────────────
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,

    #[serde(default)]
    pub status: ListingStatus,

    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

impl Listing {
    /// "street #number, neighborhood, city, state, CP postal_code"
    pub fn full_address(&self) -> String {
        let num = if self.number.is_empty() {
            String::new()
        } else {
            format!(" #{}", self.number)
        };
        format!(
            "{}{}, {}, {}, {}, CP {}",
            self.street, num, self.neighborhood, self.city, self.state, self.postal_code
        )
    }

    pub fn has_coordinates(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }
}

/// Create listing payload (photos handled separately, see `PhotoInput`)
#[derive(Debug, Clone, Deserialize)]
pub struct ListingCreate {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    pub operation: OperationType,
    #[serde(default)]
    pub bedrooms: u32,
    #[serde(default)]
    pub bathrooms: f32,
    #[serde(default)]
    pub parking: u32,
    #[serde(default)]
    pub built_area: u32,
    #[serde(default)]
    pub lot_area: u32,
    #[serde(default)]
    pub financing: FinancingType,
    pub street: String,
    #[serde(default)]
    pub number: String,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Update listing payload; absent fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListingUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<OperationType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bedrooms: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bathrooms: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parking: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub built_area: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lot_area: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub financing: Option<FinancingType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub neighborhood: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_address_with_and_without_number() {
        let mut listing = Listing {
            id: None,
            owner: "user:abc".parse().unwrap(),
            title: "Casa en venta".to_string(),
            description: String::new(),
            price: Decimal::new(1_500_000, 0),
            operation: OperationType::Sale,
            bedrooms: 3,
            bathrooms: 2.5,
            parking: 2,
            built_area: 180,
            lot_area: 200,
            financing: FinancingType::Either,
            street: "Av. Universidad".to_string(),
            number: "123".to_string(),
            neighborhood: "Centro".to_string(),
            city: "Chihuahua".to_string(),
            state: "Chihuahua".to_string(),
            postal_code: "31000".to_string(),
            latitude: Some(28.63),
            longitude: Some(-106.07),
            status: ListingStatus::Available,
            created_at: 0,
            updated_at: 0,
        };

        assert_eq!(
            listing.full_address(),
            "Av. Universidad #123, Centro, Chihuahua, Chihuahua, CP 31000"
        );

        listing.number = String::new();
        assert_eq!(
            listing.full_address(),
            "Av. Universidad, Centro, Chihuahua, Chihuahua, CP 31000"
        );
    }

    #[test]
    fn enum_params_outside_set_are_ignored() {
        assert_eq!(OperationType::parse_param("sale"), Some(OperationType::Sale));
        assert_eq!(OperationType::parse_param("lease"), None);
        assert_eq!(
            FinancingType::parse_param("credit"),
            Some(FinancingType::Credit)
        );
        assert_eq!(FinancingType::parse_param("loan"), None);
        assert_eq!(ListingStatus::parse_param("closed"), Some(ListingStatus::Closed));
        assert_eq!(ListingStatus::parse_param("sold"), None);
    }
}
