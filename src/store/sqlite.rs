//! SQLite-backed [`ListingStore`] implementation.
//!
//! Listings live in the `listings` table; tag tokens are mirrored into
//! `listing_tags` so that tag containment and tag facets can be computed in
//! SQL over the flattened tag universe. A [`ListingQuery`] is rendered into a
//! `WHERE` clause with positional binds by [`where_clause`].

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::config::Config;
use crate::db;
use crate::error::Result;
use crate::filter::ListingQuery;
use crate::migrate;
use crate::models::{Listing, ListingField};

use super::ListingStore;

/// SQLite implementation of the [`ListingStore`] trait.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connects to the configured database and ensures the schema exists.
    pub async fn open(config: &Config) -> anyhow::Result<Self> {
        let pool = db::connect(config).await?;
        migrate::apply_schema(&pool).await?;
        Ok(Self::new(pool))
    }

    #[cfg(test)]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// A value bound to a `?` placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    Real(f64),
    Text(String),
}

/// Renders `query` as a SQL `WHERE` clause over `listings l`, together with
/// the values for its placeholders in order. Returns an empty clause when
/// the query is unconstrained.
pub fn where_clause(query: &ListingQuery) -> (String, Vec<BindValue>) {
    if query.is_unconstrained() {
        return (String::new(), Vec::new());
    }

    let mut conditions: Vec<String> = Vec::new();
    let mut binds: Vec<BindValue> = Vec::new();

    if let Some(range) = &query.price {
        match (range.min, range.max) {
            (Some(min), Some(max)) => {
                conditions.push("l.price_per_piece BETWEEN ? AND ?".to_string());
                binds.push(BindValue::Real(min));
                binds.push(BindValue::Real(max));
            }
            (Some(min), None) => {
                conditions.push("l.price_per_piece >= ?".to_string());
                binds.push(BindValue::Real(min));
            }
            (None, Some(max)) => {
                conditions.push("l.price_per_piece <= ?".to_string());
                binds.push(BindValue::Real(max));
            }
            (None, None) => {}
        }
    }

    for (column, values) in [
        ("l.vendor_name", &query.vendors),
        ("l.category", &query.categories),
    ] {
        if values.is_empty() {
            continue;
        }
        let placeholders = vec!["?"; values.len()].join(", ");
        conditions.push(format!("{} IN ({})", column, placeholders));
        binds.extend(values.iter().cloned().map(BindValue::Text));
    }

    for tag in &query.tags {
        conditions.push(
            "EXISTS (SELECT 1 FROM listing_tags t WHERE t.listing_id = l.id AND t.tag = ?)"
                .to_string(),
        );
        binds.push(BindValue::Text(tag.clone()));
    }

    (format!(" WHERE {}", conditions.join(" AND ")), binds)
}

fn row_to_listing(row: &SqliteRow) -> Result<Listing> {
    let tags_json: String = row.try_get("tags_json")?;
    let tags: Vec<String> =
        serde_json::from_str(&tags_json).map_err(|e| sqlx::Error::Decode(Box::new(e)))?;

    Ok(Listing {
        id: Some(row.try_get("id")?),
        model_number: row.try_get("model_no")?,
        model_name: row.try_get("model_name")?,
        vendor_name: row.try_get("vendor_name")?,
        category: row.try_get("category")?,
        tags,
        price_per_unit: row.try_get("price_per_piece")?,
        picture_reference: row.try_get("pictures")?,
    })
}

#[async_trait]
impl ListingStore for SqliteStore {
    async fn insert_many(&self, listings: &[Listing]) -> Result<usize> {
        if listings.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;

        for listing in listings {
            let id = Uuid::new_v4().to_string();
            let tags_json = serde_json::to_string(&listing.tags)
                .map_err(|e| sqlx::Error::Encode(Box::new(e)))?;

            sqlx::query(
                r#"
                INSERT INTO listings (id, model_no, model_name, vendor_name, category,
                                      tags_json, price_per_piece, pictures)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&id)
            .bind(&listing.model_number)
            .bind(&listing.model_name)
            .bind(&listing.vendor_name)
            .bind(&listing.category)
            .bind(&tags_json)
            .bind(listing.price_per_unit)
            .bind(&listing.picture_reference)
            .execute(&mut *tx)
            .await?;

            for (position, tag) in listing.tags.iter().enumerate() {
                sqlx::query("INSERT INTO listing_tags (listing_id, position, tag) VALUES (?, ?, ?)")
                    .bind(&id)
                    .bind(position as i64)
                    .bind(tag)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        tx.commit().await?;
        Ok(listings.len())
    }

    async fn find(&self, query: &ListingQuery) -> Result<Vec<Listing>> {
        let (clause, binds) = where_clause(query);
        let sql = format!(
            "SELECT l.id, l.model_no, l.model_name, l.vendor_name, l.category, \
             l.tags_json, l.price_per_piece, l.pictures \
             FROM listings l{} ORDER BY l.rowid",
            clause
        );

        let mut q = sqlx::query(&sql);
        for bind in binds {
            q = match bind {
                BindValue::Real(v) => q.bind(v),
                BindValue::Text(s) => q.bind(s),
            };
        }

        let rows = q.fetch_all(&self.pool).await?;
        rows.iter().map(row_to_listing).collect()
    }

    async fn distinct(&self, field: ListingField) -> Result<Vec<String>> {
        let sql = match field {
            ListingField::VendorName => {
                "SELECT DISTINCT vendor_name FROM listings ORDER BY vendor_name"
            }
            ListingField::Category => "SELECT DISTINCT category FROM listings ORDER BY category",
            ListingField::Tag => "SELECT DISTINCT tag FROM listing_tags ORDER BY tag",
        };

        let values: Vec<String> = sqlx::query_scalar(sql).fetch_all(&self.pool).await?;
        Ok(values)
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
