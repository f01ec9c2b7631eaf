//! CSV ingestion pipeline.
//!
//! Coordinates the upload flow: CSV file → streaming reader → row
//! normalization → one batch insert. Rows are read one at a time; the
//! normalized listings are buffered until the end of the file and then
//! handed to the store as a single batch, so a whole upload succeeds or
//! fails together.
//!
//! A malformed row aborts the whole file: nothing from it is inserted.
//! For uploads, the spooled file is deleted only after the store confirms
//! the insert and is kept on disk after any failure.

use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::config::Config;
use crate::error::{CatalogError, Result};
use crate::models::Listing;
use crate::normalize::{normalize_row, RawRow, EXPECTED_HEADERS};
use crate::store::{ListingStore, SqliteStore};
use crate::upload::UploadedFile;

/// Outcome of a successful ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestSummary {
    /// Data rows read from the CSV.
    pub rows: usize,
    /// Listings the store confirmed.
    pub inserted: usize,
}

/// Reads and normalizes every row of a CSV stream.
///
/// Header names are trimmed before any row is read. Rows shorter than the
/// header are allowed through to the normalizer, which rejects them if a
/// required field is missing.
pub fn read_listings<R: io::Read>(reader: R) -> Result<Vec<Listing>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    for expected in EXPECTED_HEADERS {
        if !headers.iter().any(|h| h == expected) {
            tracing::warn!(column = expected, "CSV header lacks expected column");
        }
    }

    let mut listings = Vec::new();
    let mut record = csv::StringRecord::new();
    while rdr.read_record(&mut record)? {
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let row = RawRow::from_record(line, headers.iter().map(String::as_str), record.iter());
        listings.push(normalize_row(&row)?);
    }

    Ok(listings)
}

/// Reads and normalizes a CSV file on the blocking thread pool.
pub async fn read_listings_from_path(path: &Path) -> Result<Vec<Listing>> {
    let path: PathBuf = path.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let file = std::fs::File::open(&path)?;
        read_listings(file)
    })
    .await
    .map_err(|e| CatalogError::UploadIo(io::Error::other(e)))?
}

/// Ingests a CSV file into `store`. The file itself is left untouched.
pub async fn ingest_file(store: &dyn ListingStore, path: &Path) -> Result<IngestSummary> {
    let listings = read_listings_from_path(path).await?;
    let inserted = store.insert_many(&listings).await?;
    Ok(IngestSummary {
        rows: listings.len(),
        inserted,
    })
}

/// Ingests an uploaded CSV, deleting it on success and keeping it otherwise.
pub async fn ingest_upload(store: &dyn ListingStore, upload: UploadedFile) -> Result<IngestSummary> {
    tracing::debug!(path = %upload.path().display(), bytes = upload.len(), "ingesting upload");
    match ingest_file(store, upload.path()).await {
        Ok(summary) => {
            let path = upload.path().to_path_buf();
            if let Err(e) = upload.discard().await {
                // The listings are already stored; a stray file is not a failure.
                tracing::warn!(path = %path.display(), error = %e, "could not delete processed upload");
            }
            tracing::info!(rows = summary.rows, inserted = summary.inserted, "upload ingested");
            Ok(summary)
        }
        Err(e) => {
            let kept = upload.retain();
            tracing::warn!(path = %kept.display(), error = %e, "upload failed; file retained");
            Err(e)
        }
    }
}

/// CLI entry point: imports a local CSV file and prints a summary.
///
/// The file is never deleted.
pub async fn run_import(config: &Config, path: &Path) -> anyhow::Result<()> {
    let store = SqliteStore::open(config).await?;
    let result = ingest_file(&store, path).await;
    store.close().await;
    let summary = result.with_context(|| format!("Failed to import {}", path.display()))?;

    println!("import {}", path.display());
    println!("  rows read: {}", summary.rows);
    println!("  listings inserted: {}", summary.inserted);
    println!("ok");
    Ok(())
}

/// CLI entry point: normalizes and counts the rows of a local CSV file
/// without touching any database.
pub async fn run_dry_import(path: &Path) -> anyhow::Result<()> {
    let listings = read_listings_from_path(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let vendors: BTreeSet<&str> = listings.iter().map(|l| l.vendor_name.as_str()).collect();

    println!("import {} (dry-run)", path.display());
    println!("  rows read: {}", listings.len());
    println!("  distinct vendors: {}", vendors.len());
    Ok(())
}
