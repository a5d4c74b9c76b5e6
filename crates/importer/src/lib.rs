//! Package Importer: fetches the H5P packages generated for a
//! completed document, imports each into the host content store, and
//! reports an aggregate failure summary.
//!
//! Import of a single artifact is retried up to [`MAX_ATTEMPTS`] times
//! (download included, since a truncated download is the most common
//! failure). Partial failure is tolerated: successful artifacts stay
//! imported, failed ones are listed in the summary string, and the
//! document remains completed.

pub mod store;

use nolej_client::{ClientError, NolejApi, PackageDescriptor};
use nolej_core::workspace::DocumentWorkspace;
use nolej_db::repositories::PackageRepo;
use nolej_db::DbPool;

pub use store::{H5pStore, ImportError, LocalH5pStore};

/// How many times one artifact is attempted before it is reported as
/// failed. No delay between attempts.
pub const MAX_ATTEMPTS: u32 = 2;

/// Imports every generated package for one document.
pub struct PackageImporter<'a> {
    pool: &'a DbPool,
    api: &'a dyn NolejApi,
    store: &'a dyn H5pStore,
}

impl<'a> PackageImporter<'a> {
    pub fn new(pool: &'a DbPool, api: &'a dyn NolejApi, store: &'a dyn H5pStore) -> Self {
        Self { pool, api, store }
    }

    /// Fetch and import all packages for `document_id`.
    ///
    /// Returns the joined list of `"{name} ({reason})"` failure
    /// entries; an empty string signals total success. Failures of the
    /// listing call itself are reported the same way so the caller has
    /// a single summary to surface.
    pub async fn import_all(&self, document_id: &str, workspace: &DocumentWorkspace) -> String {
        let descriptors = match self.api.list_packages(document_id).await {
            Ok(descriptors) => descriptors,
            Err(err) => {
                tracing::error!(document_id, error = %err, "Failed to list generated packages");
                return format!("activities ({err})");
            }
        };

        // Stale files from a previous run of this stage must not
        // survive into the new import.
        if let Err(err) = workspace.clear_h5p().await {
            tracing::error!(document_id, error = %err, "Failed to clear package cache");
            return format!("activities ({err})");
        }

        let mut failures = Vec::new();
        for descriptor in &descriptors {
            if let Err(reason) = self.import_one(document_id, workspace, descriptor).await {
                failures.push(format!("{} ({reason})", descriptor.activity_name));
            }
        }

        failures.join(", ")
    }

    /// Download and import one artifact with bounded retry.
    ///
    /// Returns the last failure reason once attempts are exhausted.
    async fn import_one(
        &self,
        document_id: &str,
        workspace: &DocumentWorkspace,
        descriptor: &PackageDescriptor,
    ) -> Result<(), String> {
        let kind = &descriptor.activity_name;
        let filename = format!("h5p/{kind}.h5p");

        let mut last_error = String::new();
        for attempt in 1..=MAX_ATTEMPTS {
            if attempt > 1 {
                tracing::info!(document_id, kind = %kind, attempt, "Retrying package import");
            }

            match self
                .try_import(document_id, workspace, descriptor, &filename)
                .await
            {
                Ok(content_id) => {
                    tracing::info!(document_id, kind = %kind, content_id, "Package imported");
                    return Ok(());
                }
                Err(reason) => {
                    tracing::warn!(
                        document_id,
                        kind = %kind,
                        attempt,
                        error = %reason,
                        "Package import attempt failed"
                    );
                    last_error = reason;
                }
            }
        }

        Err(last_error)
    }

    /// One download + validate + register + record pass.
    async fn try_import(
        &self,
        document_id: &str,
        workspace: &DocumentWorkspace,
        descriptor: &PackageDescriptor,
        filename: &str,
    ) -> Result<i64, String> {
        let bytes = self
            .api
            .download(&descriptor.url)
            .await
            .map_err(client_reason)?;

        workspace
            .write(filename, &bytes)
            .await
            .map_err(|e| e.to_string())?;

        let content_id = self
            .store
            .import(
                document_id,
                &descriptor.activity_name,
                &workspace.path(filename),
            )
            .await
            .map_err(|e| e.to_string())?;

        PackageRepo::record_import(self.pool, document_id, &descriptor.activity_name, content_id)
            .await
            .map_err(|e| e.to_string())?;

        Ok(content_id)
    }
}

fn client_reason(err: ClientError) -> String {
    err.to_string()
}
