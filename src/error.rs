//! Error type shared by the ingestion pipeline and the store backends.
//!
//! Command entry points (CLI, server startup) keep using `anyhow` for
//! context-rich reporting; everything below them returns [`CatalogError`]
//! so the HTTP layer can tell a bad upload apart from a failing store.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    /// A CSV row lacks one of the required (non-price) fields.
    #[error("malformed CSV row at line {line}: missing field '{field}'")]
    MalformedRow { line: u64, field: &'static str },

    /// Any failure from the persistence layer.
    #[error("store error: {0}")]
    Store(#[from] sqlx::Error),

    /// Reading or streaming the uploaded file failed.
    #[error("upload I/O error: {0}")]
    UploadIo(#[from] std::io::Error),

    #[error("CSV read error: {0}")]
    Csv(#[from] csv::Error),

    /// The multipart request body could not be read, including bodies over
    /// the configured size limit.
    #[error("multipart error: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),
}

impl CatalogError {
    /// True for errors caused by the uploaded content rather than by the
    /// server or the store.
    pub fn is_client_error(&self) -> bool {
        match self {
            CatalogError::MalformedRow { .. } => true,
            CatalogError::Csv(e) => !matches!(e.kind(), csv::ErrorKind::Io(_)),
            CatalogError::Multipart(e) => e.status().is_client_error(),
            CatalogError::Store(_) | CatalogError::UploadIo(_) => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
