//! Facet discovery.
//!
//! Computes the distinct vendors, categories, and tag tokens present in the
//! catalog. Used by `GET /api/filters` and the `catalog filters` command.

use anyhow::Result;

use crate::config::Config;
use crate::error;
use crate::models::{Facets, ListingField};
use crate::store::{ListingStore, SqliteStore};

/// Queries the three facet lists concurrently.
pub async fn enumerate_facets(store: &dyn ListingStore) -> error::Result<Facets> {
    let (vendors, categories, tags) = tokio::try_join!(
        store.distinct(ListingField::VendorName),
        store.distinct(ListingField::Category),
        store.distinct(ListingField::Tag),
    )?;

    Ok(Facets {
        vendors,
        categories,
        tags,
    })
}

/// CLI entry point: prints the facet lists.
pub async fn run_filters(config: &Config, json: bool) -> Result<()> {
    let store = SqliteStore::open(config).await?;
    let facets = enumerate_facets(&store).await;
    store.close().await;
    let facets = facets?;

    if json {
        println!("{}", serde_json::to_string_pretty(&facets)?);
        return Ok(());
    }

    print_facet("vendors", &facets.vendors);
    print_facet("categories", &facets.categories);
    print_facet("tags", &facets.tags);
    Ok(())
}

fn print_facet(name: &str, values: &[String]) {
    println!("{} ({}):", name, values.len());
    for v in values {
        if v.is_empty() {
            println!("  (empty)");
        } else {
            println!("  {}", v);
        }
    }
}
