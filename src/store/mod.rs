//! Storage abstraction for the catalog.
//!
//! The [`ListingStore`] trait is the only interface the ingestion pipeline,
//! the facet enumerator, and the HTTP handlers use to reach persisted
//! listings. A store is constructed once at startup and passed around as an
//! `Arc<dyn ListingStore>`; there is no process-wide connection.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;
pub mod sqlite;

use async_trait::async_trait;

use crate::error::Result;
use crate::filter::ListingQuery;
use crate::models::{Listing, ListingField};

pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;

#[cfg(test)]
pub(crate) use failing::FailingStore;

/// Abstract storage backend for listings.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`insert_many`](ListingStore::insert_many) | Persist a batch as one logical write |
/// | [`find`](ListingStore::find) | Listings matching a predicate, in store order |
/// | [`distinct`](ListingStore::distinct) | Distinct values of a filterable field |
/// | [`close`](ListingStore::close) | Release connections on shutdown |
#[async_trait]
pub trait ListingStore: Send + Sync {
    /// Insert every listing in `listings`, assigning each a fresh id.
    ///
    /// Either the whole batch is reported as inserted (returning its size)
    /// or the call fails; partial success is never reported.
    async fn insert_many(&self, listings: &[Listing]) -> Result<usize>;

    /// Return all listings satisfying `query`, in store-native order.
    async fn find(&self, query: &ListingQuery) -> Result<Vec<Listing>>;

    /// Return the distinct values of `field` across all listings, sorted.
    ///
    /// For [`ListingField::Tag`] the tag sequences are flattened before
    /// deduplication.
    async fn distinct(&self, field: ListingField) -> Result<Vec<String>>;

    /// Release any held resources. The store must not be used afterwards.
    async fn close(&self) {}
}
