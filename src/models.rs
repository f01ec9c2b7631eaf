//! Core data models used throughout the catalog.
//!
//! A [`Listing`] is the only entity. Its JSON shape uses the upload-format CSV
//! header spellings as keys, so a listing serializes exactly as the
//! frontend pages expect it.

use serde::{Deserialize, Serialize};

/// One product listing, as normalized from a CSV row and stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    /// Store-assigned identifier. `None` until the listing has been inserted.
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "Model No")]
    pub model_number: String,
    #[serde(rename = "Model Name")]
    pub model_name: String,
    #[serde(rename = "Vendor Name")]
    pub vendor_name: String,
    #[serde(rename = "Category")]
    pub category: String,
    /// Comma-split, trimmed tag tokens. Duplicates and empty tokens are kept.
    #[serde(rename = "Tags")]
    pub tags: Vec<String>,
    /// Always finite; `0.0` when the source value was missing or unparsable.
    #[serde(rename = "PricePerPiece")]
    pub price_per_unit: f64,
    #[serde(rename = "Pictures")]
    pub picture_reference: String,
}

/// A filterable field whose distinct values can be enumerated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingField {
    VendorName,
    Category,
    /// Individual tag tokens, flattened across all listings.
    Tag,
}

/// Distinct values currently present for each filterable field.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Facets {
    pub vendors: Vec<String>,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
}
