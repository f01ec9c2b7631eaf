//! Listing retrieval: list-all and filtered search.
//!
//! Used by `GET /api/listings`, `POST /api/filter-listings`, and the
//! `catalog list` command.

use anyhow::Result;

use crate::config::Config;
use crate::error;
use crate::filter::{build_query, FilterRequest, ListingQuery};
use crate::models::Listing;
use crate::store::{ListingStore, SqliteStore};

/// Every listing in the catalog, in store order.
pub async fn all_listings(store: &dyn ListingStore) -> error::Result<Vec<Listing>> {
    store.find(&ListingQuery::default()).await
}

/// Listings matching a client filter, in store order.
pub async fn search_listings(
    store: &dyn ListingStore,
    request: &FilterRequest,
) -> error::Result<Vec<Listing>> {
    let query = build_query(request);
    tracing::debug!(?query, "filtering listings");
    store.find(&query).await
}

/// CLI entry point: runs a filter and prints the matching listings.
pub async fn run_list(config: &Config, request: &FilterRequest, json: bool) -> Result<()> {
    let store = SqliteStore::open(config).await?;
    let listings = search_listings(&store, request).await;
    store.close().await;
    let listings = listings?;

    if json {
        println!("{}", serde_json::to_string_pretty(&listings)?);
        return Ok(());
    }

    if listings.is_empty() {
        println!("No listings.");
        return Ok(());
    }

    for (i, l) in listings.iter().enumerate() {
        println!(
            "{}. {} - {} [{} / {}]",
            i + 1,
            l.model_number,
            l.model_name,
            l.vendor_name,
            l.category
        );
        println!("    price: {:.2}", l.price_per_unit);
        println!("    tags: {}", l.tags.join(", "));
        if !l.picture_reference.is_empty() {
            println!("    pictures: {}", l.picture_reference);
        }
    }
    println!();
    println!("{} listing(s)", listings.len());

    Ok(())
}
