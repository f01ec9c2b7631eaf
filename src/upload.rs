//! Transient upload files.
//!
//! An [`UploadedFile`] owns a CSV spooled to the upload directory. It is
//! never removed implicitly: the ingestion outcome decides its fate, via
//! [`discard`](UploadedFile::discard) after a confirmed insert or
//! [`retain`](UploadedFile::retain) after any failure, so a failed upload
//! stays on disk for inspection or retry.

use std::io;
use std::path::{Path, PathBuf};

use axum::extract::multipart::Field;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::error::Result;

#[derive(Debug)]
pub struct UploadedFile {
    path: PathBuf,
    bytes: u64,
}

impl UploadedFile {
    /// Takes ownership of a file that is already on disk.
    #[cfg(test)]
    pub fn adopt(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let bytes = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
        Self { path, bytes }
    }

    /// Streams a multipart field to a fresh file under `dir`, chunk by chunk.
    ///
    /// A partially written file is removed when receiving fails.
    pub async fn receive(dir: &Path, mut field: Field<'_>) -> Result<Self> {
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(Uuid::new_v4().to_string());
        let mut file = tokio::fs::File::create(&path).await?;

        match copy_field(&mut field, &mut file).await {
            Ok(bytes) => {
                tracing::debug!(path = %path.display(), bytes, "upload received");
                Ok(Self { path, bytes })
            }
            Err(e) => {
                drop(file);
                if let Err(rm) = tokio::fs::remove_file(&path).await {
                    tracing::warn!(path = %path.display(), error = %rm, "could not remove partial upload");
                }
                Err(e)
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> u64 {
        self.bytes
    }

    pub fn is_empty(&self) -> bool {
        self.bytes == 0
    }

    /// Deletes the file. Call only once its contents are safely stored.
    pub async fn discard(self) -> io::Result<()> {
        tokio::fs::remove_file(&self.path).await
    }

    /// Keeps the file on disk and gives up ownership of it.
    pub fn retain(self) -> PathBuf {
        self.path
    }
}

async fn copy_field(field: &mut Field<'_>, file: &mut tokio::fs::File) -> Result<u64> {
    let mut bytes = 0u64;
    while let Some(chunk) = field.chunk().await? {
        file.write_all(&chunk).await?;
        bytes += chunk.len() as u64;
    }
    file.flush().await?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_discard_removes_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("upload.csv");
        std::fs::write(&path, "a,b\n1,2\n").unwrap();

        let upload = UploadedFile::adopt(&path);
        assert_eq!(upload.len(), 8);
        upload.discard().await.unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_retain_keeps_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("upload.csv");
        std::fs::write(&path, "").unwrap();

        let upload = UploadedFile::adopt(&path);
        assert!(upload.is_empty());
        let kept = upload.retain();
        assert_eq!(kept, path);
        assert!(path.exists());
    }
}
