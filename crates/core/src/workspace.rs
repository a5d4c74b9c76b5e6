//! On-disk document workspace.
//!
//! Each document gets one directory under the configured data dir
//! holding intermediate files fetched from or pushed to Nolej
//! (`transcription.htm`, `settings.json`, `concepts.json`,
//! `questions.json`, `summary.json`) plus an `h5p/` subdirectory of
//! downloaded activity packages. This is a write-through cache; the
//! remote service stays the source of truth.

use std::io;
use std::path::{Path, PathBuf};

/// Handle to one document's directory.
#[derive(Debug, Clone)]
pub struct DocumentWorkspace {
    dir: PathBuf,
}

impl DocumentWorkspace {
    /// Workspace rooted at `{data_dir}/{document_id}`.
    pub fn new(data_dir: &Path, document_id: &str) -> Self {
        Self {
            dir: data_dir.join(document_id),
        }
    }

    /// The document's directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Absolute path of a file inside the workspace.
    pub fn path(&self, filename: &str) -> PathBuf {
        self.dir.join(filename)
    }

    /// Whether a workspace file exists.
    pub fn has_file(&self, filename: &str) -> bool {
        self.path(filename).is_file()
    }

    /// Read a workspace file. `Ok(None)` when the file is absent.
    pub async fn read(&self, filename: &str) -> io::Result<Option<Vec<u8>>> {
        match tokio::fs::read(self.path(filename)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Write a workspace file, creating parent directories as needed
    /// and overwriting any previous content.
    pub async fn write(&self, filename: &str, content: &[u8]) -> io::Result<()> {
        let path = self.path(filename);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, content).await
    }

    /// The `h5p/` subdirectory of downloaded activity packages,
    /// created if missing.
    pub async fn h5p_dir(&self) -> io::Result<PathBuf> {
        let dir = self.dir.join("h5p");
        tokio::fs::create_dir_all(&dir).await?;
        Ok(dir)
    }

    /// Delete every file in `h5p/` so a re-run of the import stage
    /// starts from a clean slate. Subdirectories are left alone.
    pub async fn clear_h5p(&self) -> io::Result<()> {
        let dir = self.h5p_dir().await?;
        let mut entries = tokio::fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                tokio::fs::remove_file(entry.path()).await?;
            }
        }
        Ok(())
    }
}
