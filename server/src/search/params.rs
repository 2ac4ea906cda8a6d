//! Lenient search parameter parsing.
//!
//! Every parameter arrives as an optional raw string; values that fail
//! to parse act as if the parameter was absent.

use super::text::{contains_folded, tokenize};
use crate::db::models::{FinancingType, Listing, OperationType};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;

/// Raw query-string parameters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub operation: Option<String>,
    pub financing: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub min_bedrooms: Option<String>,
    pub min_bathrooms: Option<String>,
    pub min_parking: Option<String>,
    pub min_built_area: Option<String>,
    pub min_lot_area: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub page: Option<String>,
}

/// Parsed filter set
#[derive(Debug, Clone, Default)]
pub struct SearchFilters {
    pub tokens: Vec<String>,
    pub operation: Option<OperationType>,
    pub financing: Option<FinancingType>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub min_bedrooms: Option<u32>,
    pub min_bathrooms: Option<f32>,
    pub min_parking: Option<u32>,
    pub min_built_area: Option<u32>,
    pub min_lot_area: Option<u32>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub page: usize,
}

fn parse_num<T: FromStr>(value: &Option<String>) -> Option<T> {
    value.as_deref().and_then(|v| v.trim().parse().ok())
}

impl SearchParams {
    pub fn parse(&self) -> SearchFilters {
        SearchFilters {
            tokens: self.q.as_deref().map(tokenize).unwrap_or_default(),
            operation: self
                .operation
                .as_deref()
                .and_then(OperationType::parse_param),
            financing: self
                .financing
                .as_deref()
                .and_then(FinancingType::parse_param),
            min_price: parse_num(&self.min_price),
            max_price: parse_num(&self.max_price),
            min_bedrooms: parse_num(&self.min_bedrooms),
            min_bathrooms: parse_num(&self.min_bathrooms),
            min_parking: parse_num(&self.min_parking),
            min_built_area: parse_num(&self.min_built_area),
            min_lot_area: parse_num(&self.min_lot_area),
            state: self
                .state
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            city: self
                .city
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            page: parse_num::<usize>(&self.page).unwrap_or(1),
        }
    }
}

impl SearchFilters {
    /// Numeric/enum/location filters, AND-combined. Token matching is
    /// handled separately because of the accent fallback pass.
    pub fn matches_structured(&self, listing: &Listing) -> bool {
        if let Some(op) = self.operation
            && listing.operation != op
        {
            return false;
        }
        if let Some(fin) = self.financing
            && listing.financing != fin
        {
            return false;
        }
        if let Some(min) = self.min_price
            && listing.price < min
        {
            return false;
        }
        if let Some(max) = self.max_price
            && listing.price > max
        {
            return false;
        }
        if let Some(min) = self.min_bedrooms
            && listing.bedrooms < min
        {
            return false;
        }
        if let Some(min) = self.min_bathrooms
            && listing.bathrooms < min
        {
            return false;
        }
        if let Some(min) = self.min_parking
            && listing.parking < min
        {
            return false;
        }
        if let Some(min) = self.min_built_area
            && listing.built_area < min
        {
            return false;
        }
        if let Some(min) = self.min_lot_area
            && listing.lot_area < min
        {
            return false;
        }
        if let Some(ref state) = self.state
            && !contains_folded(&listing.state, state)
        {
            return false;
        }
        if let Some(ref city) = self.city
            && !contains_folded(&listing.city, city)
        {
            return false;
        }
        true
    }
}
