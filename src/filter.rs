//! Filter query construction.
//!
//! A [`FilterRequest`] is what clients send to `POST /api/filter-listings`
//! (or pass as `catalog list` flags). [`build_query`] turns it into a
//! store-agnostic [`ListingQuery`] predicate; each store backend translates
//! that predicate into its own query language. [`ListingQuery::matches`] is
//! the reference evaluation used by the in-memory store.
//!
//! Semantics (all active constraints are ANDed):
//!
//! | Request field | Constraint |
//! |---------------|------------|
//! | `minPrice` | `PricePerPiece >= minPrice` |
//! | `maxPrice` | `PricePerPiece <= maxPrice` |
//! | `vendors` | `Vendor Name` is one of the values |
//! | `categories` | `Category` is one of the values |
//! | `tags` | `Tags` contains **every** value |
//!
//! Absent or empty fields impose no constraint.

use serde::Deserialize;

use crate::models::Listing;

/// Client-supplied filter, as received in the JSON body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterRequest {
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub vendors: Option<Vec<String>>,
    pub categories: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
}

/// Inclusive price bounds. At least one side is set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl PriceRange {
    pub fn contains(&self, price: f64) -> bool {
        self.min.map_or(true, |min| price >= min) && self.max.map_or(true, |max| price <= max)
    }
}

/// A predicate over listings. `ListingQuery::default()` matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingQuery {
    pub price: Option<PriceRange>,
    /// Vendor names, any of which may match.
    pub vendors: Vec<String>,
    /// Categories, any of which may match.
    pub categories: Vec<String>,
    /// Tags, all of which must be present on a listing.
    pub tags: Vec<String>,
}

impl ListingQuery {
    /// True when no constraint is active.
    pub fn is_unconstrained(&self) -> bool {
        self.price.is_none()
            && self.vendors.is_empty()
            && self.categories.is_empty()
            && self.tags.is_empty()
    }

    pub fn matches(&self, listing: &Listing) -> bool {
        if let Some(range) = &self.price {
            if !range.contains(listing.price_per_unit) {
                return false;
            }
        }
        if !self.vendors.is_empty() && !self.vendors.contains(&listing.vendor_name) {
            return false;
        }
        if !self.categories.is_empty() && !self.categories.contains(&listing.category) {
            return false;
        }
        self.tags.iter().all(|tag| listing.tags.contains(tag))
    }
}

/// Builds the store predicate for a filter request. Pure and deterministic.
pub fn build_query(request: &FilterRequest) -> ListingQuery {
    let price = match (request.min_price, request.max_price) {
        (None, None) => None,
        (min, max) => Some(PriceRange { min, max }),
    };

    ListingQuery {
        price,
        vendors: dedup(request.vendors.as_deref()),
        categories: dedup(request.categories.as_deref()),
        tags: dedup(request.tags.as_deref()),
    }
}

/// Removes repeated values, keeping the first occurrence.
fn dedup(values: Option<&[String]>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for v in values.unwrap_or_default() {
        if !out.contains(v) {
            out.push(v.clone());
        }
    }
    out
}
