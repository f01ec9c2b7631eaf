//! # Catalog CLI (`catalog`)
//!
//! The `catalog` binary initializes the database, imports CSV files of
//! product listings, queries them, and starts the HTTP server.
//!
//! ## Usage
//!
//! ```bash
//! catalog --config ./config/catalog.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `catalog init` | Create the SQLite database and schema |
//! | `catalog import <csv>` | Ingest a local CSV file |
//! | `catalog list` | Print listings matching a filter |
//! | `catalog filters` | Print distinct vendors, categories, and tags |
//! | `catalog serve` | Start the HTTP server |
//!
//! ## Examples
//!
//! ```bash
//! # Initialize the database
//! catalog init --config ./config/catalog.toml
//!
//! # Check a file without writing anything
//! catalog import ./listings.csv --dry-run
//!
//! # Listings from Acme tagged both red and blue, at most 20.00
//! catalog list --vendor Acme --tag red --tag blue --max-price 20
//!
//! # Start the server
//! catalog serve --config ./config/catalog.toml
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use product_catalog::config;
use product_catalog::filter::FilterRequest;
use product_catalog::{facets, ingest, logging, migrate, search, server};

/// Catalog CLI: CSV ingestion, filtered listing search, and facet
/// discovery for a product catalog.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file.
#[derive(Parser)]
#[command(
    name = "catalog",
    about = "Product catalog: CSV ingestion, filtered search, and facets over HTTP",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/catalog.toml")]
    config: PathBuf,

    /// Enable debug logging.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and the listing tables. Running it
    /// more than once is safe.
    Init,

    /// Ingest a local CSV file of listings.
    ///
    /// Runs the same normalization and batch insert as `POST /upload-csv`.
    /// A malformed row aborts the whole import. The file is left in place.
    Import {
        /// Path to the CSV file.
        path: PathBuf,

        /// Normalize and count rows without writing to the database.
        #[arg(long)]
        dry_run: bool,
    },

    /// Print listings matching a filter.
    ///
    /// Vendors and categories match any of the given values; tags must all
    /// be present on a listing. With no flags, every listing is printed.
    List {
        /// Minimum price per piece (inclusive).
        #[arg(long)]
        min_price: Option<f64>,

        /// Maximum price per piece (inclusive).
        #[arg(long)]
        max_price: Option<f64>,

        /// Vendor name; repeat for several.
        #[arg(long = "vendor")]
        vendors: Vec<String>,

        /// Category; repeat for several.
        #[arg(long = "category")]
        categories: Vec<String>,

        /// Required tag; repeat for several.
        #[arg(long = "tag")]
        tags: Vec<String>,

        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Print the distinct vendors, categories, and tags.
    Filters {
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Start the HTTP server.
    ///
    /// Binds to `[server].bind` and serves until interrupted.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logger(cli.verbose);

    // A dry run never touches the database, so it needs no config file.
    if let Commands::Import {
        path,
        dry_run: true,
    } = &cli.command
    {
        return ingest::run_dry_import(path).await;
    }

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Import { path, .. } => {
            ingest::run_import(&cfg, &path).await?;
        }
        Commands::List {
            min_price,
            max_price,
            vendors,
            categories,
            tags,
            json,
        } => {
            let request = FilterRequest {
                min_price,
                max_price,
                vendors: Some(vendors),
                categories: Some(categories),
                tags: Some(tags),
            };
            search::run_list(&cfg, &request, json).await?;
        }
        Commands::Filters { json } => {
            facets::run_filters(&cfg, json).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
