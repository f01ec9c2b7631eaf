//! # Product Catalog
//!
//! A small product-catalog backend: CSV files of product listings are
//! ingested into SQLite, and an HTTP API exposes list-all, filtered search,
//! and facet discovery over them.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   ┌─────────────┐   ┌────────────┐   ┌──────────┐
//! │ CSV upload │──▶│ Normalizer  │──▶│ Batch      │──▶│  SQLite  │
//! │ / import   │   │ row-by-row  │   │ insert     │   │  store   │
//! └────────────┘   └─────────────┘   └────────────┘   └────┬─────┘
//!                                                          │
//!                  ┌──────────────────┬────────────────────┤
//!                  ▼                  ▼                    ▼
//!            ┌───────────┐     ┌─────────────┐      ┌───────────┐
//!            │  Filter   │     │   Facets    │      │ List all  │
//!            │  builder  │     │  (distinct) │      │           │
//!            └───────────┘     └─────────────┘      └───────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! catalog init                           # create database
//! catalog import listings.csv            # ingest a local CSV
//! catalog list --vendor Acme --tag red   # filtered search
//! catalog filters                        # facet lists
//! catalog serve                          # start HTTP server
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`normalize`] | CSV row → listing normalization |
//! | [`ingest`] | Streaming CSV ingestion and batch insert |
//! | [`upload`] | Transient upload file lifecycle |
//! | [`filter`] | Filter request → query predicate |
//! | [`search`] | List-all and filtered search |
//! | [`facets`] | Distinct-value enumeration |
//! | [`store`] | Storage trait, SQLite and in-memory backends |
//! | [`server`] | HTTP server |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema creation |
//! | [`error`] | Library error type |
//! | [`logging`] | `tracing` subscriber setup |

pub mod config;
pub mod db;
pub mod error;
pub mod facets;
pub mod filter;
pub mod ingest;
pub mod logging;
pub mod migrate;
pub mod models;
pub mod normalize;
pub mod search;
pub mod server;
pub mod store;
pub mod upload;
