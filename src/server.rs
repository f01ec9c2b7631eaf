//! Catalog HTTP server.
//!
//! Wires the ingestion pipeline, filtered search, and facet discovery to an
//! axum router. The listing store is constructed once at startup and shared
//! by every handler through axum's `State` extractor; handlers hold no other
//! state.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/upload-csv` | Ingest a CSV sent as multipart field `csvFile` |
//! | `GET`  | `/api/filters` | Distinct vendors, categories, and tags |
//! | `POST` | `/api/filter-listings` | Listings matching a JSON filter |
//! | `GET`  | `/api/listings` | Every listing |
//! | `GET`  | `/` | Welcome message |
//! | `GET`  | `/index.html` | The configured index page |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! Any other path is served from the configured static directory.
//!
//! # Error Contract
//!
//! The upload endpoint answers in plain text; the JSON endpoints answer
//! with `{ "error": "<message>" }`. Store failures are logged in full and
//! reported to clients only as a generic 500.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::error::{self, CatalogError};
use crate::facets::enumerate_facets;
use crate::filter::FilterRequest;
use crate::ingest::ingest_upload;
use crate::models::{Facets, Listing};
use crate::search::{all_listings, search_listings};
use crate::store::{ListingStore, SqliteStore};
use crate::upload::UploadedFile;

/// Multipart field that carries the uploaded CSV.
pub const CSV_FIELD: &str = "csvFile";

const WELCOME: &str = "Welcome to the Product Listing API.";
const UPLOAD_FAILED: &str = "An internal server error occurred";

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
struct AppState {
    store: Arc<dyn ListingStore>,
    upload_dir: Arc<PathBuf>,
}

/// Starts the catalog server against the configured SQLite database.
///
/// Opens the store (creating the schema if needed), serves until Ctrl-C,
/// then closes the store.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let store: Arc<dyn ListingStore> = Arc::new(SqliteStore::open(config).await?);
    let result = run_server_with_store(config, store.clone()).await;
    store.close().await;
    result
}

/// Starts the catalog server with a caller-provided store.
///
/// The caller keeps ownership of the store's lifecycle.
pub async fn run_server_with_store(
    config: &Config,
    store: Arc<dyn ListingStore>,
) -> anyhow::Result<()> {
    let app = router(config, store);

    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind))?;
    tracing::info!(addr = %listener.local_addr()?, "catalog server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("catalog server stopped");
    Ok(())
}

/// Builds the router with every route and layer attached.
pub fn router(config: &Config, store: Arc<dyn ListingStore>) -> Router {
    let state = AppState {
        store,
        upload_dir: Arc::new(config.upload.dir.clone()),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handle_root))
        .route("/health", get(handle_health))
        .route("/upload-csv", post(handle_upload_csv))
        .route("/api/filters", get(handle_filters))
        .route("/api/filter-listings", post(handle_filter_listings))
        .route("/api/listings", get(handle_listings))
        .route_service("/index.html", ServeFile::new(&config.server.index_file))
        .fallback_service(ServeDir::new(&config.server.static_dir))
        .layer(DefaultBodyLimit::max(config.upload.max_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "could not listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

// ============ Error response ============

/// JSON error body: `{ "error": "<message>" }`.
#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
}

/// Error returned by the JSON endpoints.
struct ApiError {
    status: StatusCode,
    message: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

fn internal(message: &'static str) -> ApiError {
    ApiError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        message,
    }
}

// ============ GET / and /health ============

async fn handle_root() -> &'static str {
    WELCOME
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ POST /upload-csv ============

/// Handler for `POST /upload-csv`.
///
/// Spools the `csvFile` part to the upload directory, then ingests it. The
/// spooled file is deleted only when every row has been stored.
///
/// Returns `400` when no `csvFile` part is present or the CSV is malformed,
/// the multipart error's own status (`413` over the body limit) when the
/// body cannot be read, and `500` for store or I/O failures.
async fn handle_upload_csv(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<String, (StatusCode, String)> {
    let upload = match receive_csv(&state.upload_dir, &mut multipart).await {
        Ok(Some(upload)) => upload,
        Ok(None) => {
            return Err((
                StatusCode::BAD_REQUEST,
                format!("No file uploaded (expected multipart field '{}')", CSV_FIELD),
            ))
        }
        Err(CatalogError::Multipart(e)) if e.status().is_client_error() => {
            tracing::warn!(error = %e, status = %e.status(), "rejected upload body");
            return Err((e.status(), e.body_text()));
        }
        Err(e) => {
            tracing::error!(error = %e, "Error receiving upload");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, UPLOAD_FAILED.to_string()));
        }
    };

    match ingest_upload(state.store.as_ref(), upload).await {
        Ok(summary) => Ok(format!(
            "File uploaded and data inserted: {} listing(s)",
            summary.inserted
        )),
        Err(e) if e.is_client_error() => Err((StatusCode::BAD_REQUEST, format!("Invalid CSV: {}", e))),
        Err(e) => {
            tracing::error!(error = %e, "Error saving uploaded listings");
            Err((StatusCode::INTERNAL_SERVER_ERROR, UPLOAD_FAILED.to_string()))
        }
    }
}

/// Finds the CSV part and streams it to disk. Other parts are skipped.
async fn receive_csv(dir: &Path, multipart: &mut Multipart) -> error::Result<Option<UploadedFile>> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(CSV_FIELD) {
            return UploadedFile::receive(dir, field).await.map(Some);
        }
    }
    Ok(None)
}

// ============ GET /api/filters ============

async fn handle_filters(State(state): State<AppState>) -> Result<Json<Facets>, ApiError> {
    enumerate_facets(state.store.as_ref())
        .await
        .map(Json)
        .map_err(|e| {
            tracing::error!(error = %e, "Error when fetching filters");
            internal("Failed to fetch filters")
        })
}

// ============ POST /api/filter-listings ============

/// Handler for `POST /api/filter-listings`.
///
/// A request without a JSON content type is treated as an empty filter,
/// matching every listing. A JSON body that does not parse is a `400`.
async fn handle_filter_listings(
    State(state): State<AppState>,
    body: Result<Json<FilterRequest>, JsonRejection>,
) -> Result<Json<Vec<Listing>>, ApiError> {
    let request = match body {
        Ok(Json(request)) => request,
        Err(JsonRejection::MissingJsonContentType(_)) => FilterRequest::default(),
        Err(rejection) => {
            tracing::debug!(error = %rejection, "rejected filter body");
            return Err(ApiError {
                status: StatusCode::BAD_REQUEST,
                message: "Invalid filter request",
            });
        }
    };

    search_listings(state.store.as_ref(), &request)
        .await
        .map(Json)
        .map_err(|e| {
            tracing::error!(error = %e, "Error when filtering listings");
            internal("Internal Server Error")
        })
}

// ============ GET /api/listings ============

async fn handle_listings(State(state): State<AppState>) -> Result<Json<Vec<Listing>>, ApiError> {
    all_listings(state.store.as_ref())
        .await
        .map(Json)
        .map_err(|e| {
            tracing::error!(error = %e, "Error when listing listings");
            internal("Internal Server Error")
        })
}
