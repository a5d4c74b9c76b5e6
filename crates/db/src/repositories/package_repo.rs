//! Repository for the `generated_packages` and `h5p_contents` tables.

use nolej_core::types::DbId;
use sqlx::PgPool;

use crate::models::package::GeneratedPackage;

const PACKAGE_COLUMNS: &str = "id, document_id, kind, generated_at, content_id";

/// Access to imported package metadata and the local content store.
pub struct PackageRepo;

impl PackageRepo {
    /// Record one successful import, stamped now. Older rows of the
    /// same kind are kept; `list_current` picks the newest.
    pub async fn record_import(
        pool: &PgPool,
        document_id: &str,
        kind: &str,
        content_id: DbId,
    ) -> Result<GeneratedPackage, sqlx::Error> {
        let query = format!(
            "INSERT INTO generated_packages (document_id, kind, content_id) \
             VALUES ($1, $2, $3) \
             RETURNING {PACKAGE_COLUMNS}"
        );
        sqlx::query_as::<_, GeneratedPackage>(&query)
            .bind(document_id)
            .bind(kind)
            .bind(content_id)
            .fetch_one(pool)
            .await
    }

    /// The newest package row per kind for one document.
    pub async fn list_current(
        pool: &PgPool,
        document_id: &str,
    ) -> Result<Vec<GeneratedPackage>, sqlx::Error> {
        let query = format!(
            "SELECT DISTINCT ON (kind) {PACKAGE_COLUMNS} \
             FROM generated_packages \
             WHERE document_id = $1 \
             ORDER BY kind, generated_at DESC, id DESC"
        );
        sqlx::query_as::<_, GeneratedPackage>(&query)
            .bind(document_id)
            .fetch_all(pool)
            .await
    }

    /// Register a package file in the local H5P content store and
    /// return the new content id.
    pub async fn register_content(
        pool: &PgPool,
        kind: &str,
        path: &str,
    ) -> Result<DbId, sqlx::Error> {
        let (id,): (DbId,) = sqlx::query_as(
            "INSERT INTO h5p_contents (kind, path) VALUES ($1, $2) RETURNING id",
        )
        .bind(kind)
        .bind(path)
        .fetch_one(pool)
        .await?;
        Ok(id)
    }
}
