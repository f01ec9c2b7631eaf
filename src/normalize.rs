//! Record normalization: one raw CSV row in, one [`Listing`] out.
//!
//! Rows are looked up by trimmed header name. Every text field is trimmed,
//! `Tags` is split on `,` with each piece trimmed (no dedup, no filtering of
//! empty pieces), and `PricePerPiece` falls back to `0` whenever it cannot be
//! parsed. A missing non-price field fails the row with
//! [`CatalogError::MalformedRow`].

use std::collections::HashMap;

use crate::error::{CatalogError, Result};
use crate::models::Listing;

pub const MODEL_NO: &str = "Model No";
pub const MODEL_NAME: &str = "Model Name";
pub const VENDOR_NAME: &str = "Vendor Name";
pub const CATEGORY: &str = "Category";
pub const TAGS: &str = "Tags";
pub const PRICE_PER_PIECE: &str = "PricePerPiece";
pub const PICTURES: &str = "Pictures";

/// All headers a well-formed upload carries, in canonical order.
pub const EXPECTED_HEADERS: [&str; 7] = [
    MODEL_NO,
    MODEL_NAME,
    VENDOR_NAME,
    CATEGORY,
    TAGS,
    PRICE_PER_PIECE,
    PICTURES,
];

/// A raw CSV row keyed by trimmed header name. Values are untouched.
#[derive(Debug, Clone, Default)]
pub struct RawRow {
    line: u64,
    fields: HashMap<String, String>,
}

impl RawRow {
    /// Pairs trimmed headers with the row's values. A row shorter than the
    /// header simply lacks the trailing fields.
    pub fn from_record<'a, H, V>(line: u64, headers: H, values: V) -> Self
    where
        H: IntoIterator<Item = &'a str>,
        V: IntoIterator<Item = &'a str>,
    {
        let fields = headers
            .into_iter()
            .zip(values)
            .map(|(h, v)| (h.trim().to_string(), v.to_string()))
            .collect();
        Self { line, fields }
    }

    pub fn get(&self, header: &str) -> Option<&str> {
        self.fields.get(header).map(String::as_str)
    }

    fn require(&self, header: &'static str) -> Result<&str> {
        self.get(header).ok_or(CatalogError::MalformedRow {
            line: self.line,
            field: header,
        })
    }
}

/// Converts one raw row into a [`Listing`].
pub fn normalize_row(row: &RawRow) -> Result<Listing> {
    let model_number = row.require(MODEL_NO)?.trim().to_string();
    let model_name = row.require(MODEL_NAME)?.trim().to_string();
    let vendor_name = row.require(VENDOR_NAME)?.trim().to_string();
    let category = row.require(CATEGORY)?.trim().to_string();
    let tags = split_tags(row.require(TAGS)?);
    let picture_reference = row.require(PICTURES)?.trim().to_string();
    let price_per_unit = row.get(PRICE_PER_PIECE).map(parse_price).unwrap_or(0.0);

    Ok(Listing {
        id: None,
        model_number,
        model_name,
        vendor_name,
        category,
        tags,
        price_per_unit,
        picture_reference,
    })
}

/// Splits a raw `Tags` value on commas and trims every piece.
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',').map(|tag| tag.trim().to_string()).collect()
}

/// Parses a raw price. Anything that is not a finite number becomes `0.0`.
pub fn parse_price(raw: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(price) if price.is_finite() => price,
        _ => 0.0,
    }
}
