//! In-memory [`ListingStore`] implementation, used in tests.
//!
//! Listings live in a `Vec` behind a `tokio::sync::RwLock`; insertion order
//! is the store-native order. Queries are evaluated with
//! [`ListingQuery::matches`].

use std::collections::BTreeSet;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::Result;
use crate::filter::ListingQuery;
use crate::models::{Listing, ListingField};

use super::ListingStore;

/// In-memory listing store.
#[derive(Default)]
pub struct InMemoryStore {
    listings: RwLock<Vec<Listing>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.listings.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.listings.read().await.is_empty()
    }
}

#[async_trait]
impl ListingStore for InMemoryStore {
    async fn insert_many(&self, listings: &[Listing]) -> Result<usize> {
        let mut stored = self.listings.write().await;
        stored.extend(listings.iter().map(|l| Listing {
            id: Some(Uuid::new_v4().to_string()),
            ..l.clone()
        }));
        Ok(listings.len())
    }

    async fn find(&self, query: &ListingQuery) -> Result<Vec<Listing>> {
        let stored = self.listings.read().await;
        Ok(stored.iter().filter(|l| query.matches(l)).cloned().collect())
    }

    async fn distinct(&self, field: ListingField) -> Result<Vec<String>> {
        let stored = self.listings.read().await;
        let values: BTreeSet<&str> = match field {
            ListingField::VendorName => stored.iter().map(|l| l.vendor_name.as_str()).collect(),
            ListingField::Category => stored.iter().map(|l| l.category.as_str()).collect(),
            ListingField::Tag => stored
                .iter()
                .flat_map(|l| l.tags.iter().map(String::as_str))
                .collect(),
        };
        Ok(values.into_iter().map(str::to_string).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{build_query, FilterRequest};

    fn listing(model: &str, vendor: &str, tags: &[&str], price: f64) -> Listing {
        Listing {
            id: None,
            model_number: model.into(),
            model_name: format!("{} name", model),
            vendor_name: vendor.into(),
            category: "Tools".into(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            price_per_unit: price,
            picture_reference: String::new(),
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_ids_and_keeps_order() {
        let store = InMemoryStore::new();
        let inserted = store
            .insert_many(&[listing("M1", "Acme", &[], 1.0), listing("M2", "Acme", &[], 2.0)])
            .await
            .unwrap();
        assert_eq!(inserted, 2);

        let all = store.find(&ListingQuery::default()).await.unwrap();
        let models: Vec<&str> = all.iter().map(|l| l.model_number.as_str()).collect();
        assert_eq!(models, vec!["M1", "M2"]);
        assert!(all.iter().all(|l| l.id.is_some()));
        assert_ne!(all[0].id, all[1].id);
    }

    #[tokio::test]
    async fn test_find_applies_query() {
        let store = InMemoryStore::new();
        store
            .insert_many(&[
                listing("M1", "Acme", &["a", "b", "c"], 50.0),
                listing("M2", "Globex", &["a"], 5.0),
            ])
            .await
            .unwrap();

        let query = build_query(&FilterRequest {
            min_price: Some(10.0),
            tags: Some(vec!["a".into(), "b".into()]),
            ..Default::default()
        });
        let found = store.find(&query).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].model_number, "M1");
    }

    #[tokio::test]
    async fn test_distinct_flattens_tags() {
        let store = InMemoryStore::new();
        store
            .insert_many(&[
                listing("M1", "Acme", &["a", "b"], 1.0),
                listing("M2", "Acme", &["b", "c"], 1.0),
            ])
            .await
            .unwrap();

        assert_eq!(
            store.distinct(ListingField::Tag).await.unwrap(),
            vec!["a", "b", "c"]
        );
        assert_eq!(
            store.distinct(ListingField::VendorName).await.unwrap(),
            vec!["Acme"]
        );
    }

    #[tokio::test]
    async fn test_empty_store() {
        let store = InMemoryStore::new();
        assert!(store.is_empty().await);
        assert!(store.find(&ListingQuery::default()).await.unwrap().is_empty());
        assert!(store.distinct(ListingField::Category).await.unwrap().is_empty());
    }
}
