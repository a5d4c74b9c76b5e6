//! Host content store seam and the bundled local implementation.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use nolej_core::types::DbId;
use nolej_db::repositories::PackageRepo;
use nolej_db::DbPool;

/// Errors while validating or registering a package.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    /// The file is not a well-formed H5P package.
    #[error("invalid package: {0}")]
    Invalid(String),

    /// The content store rejected the package.
    #[error("content store error: {0}")]
    Store(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Where imported packages end up.
///
/// The production implementation registers packages in the host LMS
/// content store; tests substitute stubs that succeed or fail on cue.
#[async_trait]
pub trait H5pStore: Send + Sync {
    /// Validate the package at `path` and register it under `kind`.
    /// Returns the content id assigned by the store.
    async fn import(&self, document_id: &str, kind: &str, path: &Path)
        -> Result<DbId, ImportError>;
}

/// Filesystem-backed store: validates the archive, copies it into the
/// content directory, and records it in the `h5p_contents` table.
pub struct LocalH5pStore {
    pool: DbPool,
    content_dir: PathBuf,
}

impl LocalH5pStore {
    pub fn new(pool: DbPool, content_dir: impl Into<PathBuf>) -> Self {
        Self {
            pool,
            content_dir: content_dir.into(),
        }
    }
}

#[async_trait]
impl H5pStore for LocalH5pStore {
    async fn import(
        &self,
        document_id: &str,
        kind: &str,
        path: &Path,
    ) -> Result<DbId, ImportError> {
        let bytes = tokio::fs::read(path).await?;
        validate_h5p(&bytes)?;

        tokio::fs::create_dir_all(&self.content_dir).await?;
        let stored = self.content_dir.join(format!("{document_id}-{kind}.h5p"));
        tokio::fs::write(&stored, &bytes).await?;

        PackageRepo::register_content(&self.pool, kind, &stored.to_string_lossy())
            .await
            .map_err(|e| ImportError::Store(e.to_string()))
    }
}

/// An H5P package is a ZIP archive with an `h5p.json` manifest at its
/// root. Anything else fails validation.
fn validate_h5p(bytes: &[u8]) -> Result<(), ImportError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ImportError::Invalid(format!("not a zip archive: {e}")))?;

    archive
        .by_name("h5p.json")
        .map_err(|_| ImportError::Invalid("missing h5p.json manifest".to_string()))?;

    Ok(())
}
