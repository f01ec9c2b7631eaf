use anyhow::Result;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;

/// Creates the catalog schema on a fresh pool and closes it again.
/// Used by `catalog init`.
pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    apply_schema(&pool).await?;
    pool.close().await;
    Ok(())
}

/// Creates every table and index the store needs. Idempotent.
pub async fn apply_schema(pool: &SqlitePool) -> Result<()> {
    // One row per listing; tags kept as a JSON array so their order survives.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS listings (
            id TEXT PRIMARY KEY,
            model_no TEXT NOT NULL,
            model_name TEXT NOT NULL,
            vendor_name TEXT NOT NULL,
            category TEXT NOT NULL,
            tags_json TEXT NOT NULL DEFAULT '[]',
            price_per_piece REAL NOT NULL DEFAULT 0,
            pictures TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Flattened tag tokens, used for containment filters and tag facets.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS listing_tags (
            listing_id TEXT NOT NULL,
            position INTEGER NOT NULL,
            tag TEXT NOT NULL,
            PRIMARY KEY (listing_id, position),
            FOREIGN KEY (listing_id) REFERENCES listings(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_listings_vendor_name ON listings(vendor_name)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_listings_category ON listings(category)")
        .execute(pool)
        .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_listings_price_per_piece ON listings(price_per_piece)",
    )
    .execute(pool)
    .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_listing_tags_tag ON listing_tags(tag, listing_id)")
        .execute(pool)
        .await?;

    Ok(())
}
