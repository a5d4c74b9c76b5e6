//! Repository for the `documents` table.

use nolej_core::DocumentStatus;
use sqlx::PgPool;

use crate::models::document::{Document, NewDocument};

const DOCUMENT_COLUMNS: &str = "\
    document_id, user_id, title, media_type, source_url, language, \
    automatic_mode, consumed_credit, status, created_at, updated_at";

/// CRUD and status transitions for documents.
pub struct DocumentRepo;

impl DocumentRepo {
    /// Insert a new document in the given initial status.
    pub async fn create(
        pool: &PgPool,
        input: &NewDocument,
        status: DocumentStatus,
    ) -> Result<Document, sqlx::Error> {
        let query = format!(
            "INSERT INTO documents \
                 (document_id, user_id, title, media_type, source_url, language, \
                  automatic_mode, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {DOCUMENT_COLUMNS}"
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(&input.document_id)
            .bind(input.user_id)
            .bind(&input.title)
            .bind(&input.media_type)
            .bind(&input.source_url)
            .bind(&input.language)
            .bind(input.automatic_mode)
            .bind(status.code())
            .fetch_one(pool)
            .await
    }

    /// Find a document by its remote identifier.
    pub async fn find_by_id(
        pool: &PgPool,
        document_id: &str,
    ) -> Result<Option<Document>, sqlx::Error> {
        let query = format!("SELECT {DOCUMENT_COLUMNS} FROM documents WHERE document_id = $1");
        sqlx::query_as::<_, Document>(&query)
            .bind(document_id)
            .fetch_optional(pool)
            .await
    }

    /// Find a document only if it currently sits in `expected`.
    ///
    /// The webhook ingestor uses this as its precondition check before
    /// attempting the compare-and-swap transition.
    pub async fn find_in_status(
        pool: &PgPool,
        document_id: &str,
        expected: DocumentStatus,
    ) -> Result<Option<Document>, sqlx::Error> {
        let query = format!(
            "SELECT {DOCUMENT_COLUMNS} FROM documents \
             WHERE document_id = $1 AND status = $2"
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(document_id)
            .bind(expected.code())
            .fetch_optional(pool)
            .await
    }

    /// Unconditionally overwrite a document's status.
    ///
    /// Client action handlers use this after a successful outbound
    /// call; they are responsible for only requesting legal edges.
    pub async fn set_status(
        pool: &PgPool,
        document_id: &str,
        status: DocumentStatus,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE documents SET status = $2, updated_at = NOW() WHERE document_id = $1",
        )
        .bind(document_id)
        .bind(status.code())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Compare-and-swap status transition.
    ///
    /// Returns `true` only if the row was in `expected` at the moment
    /// of the update. Two concurrent deliveries racing on the same
    /// document can therefore apply a transition at most once.
    pub async fn transition(
        pool: &PgPool,
        document_id: &str,
        expected: DocumentStatus,
        new: DocumentStatus,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE documents SET status = $3, updated_at = NOW() \
             WHERE document_id = $1 AND status = $2",
        )
        .bind(document_id)
        .bind(expected.code())
        .bind(new.code())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Record credit consumed by a completed stage.
    pub async fn set_consumed_credit(
        pool: &PgPool,
        document_id: &str,
        consumed_credit: i64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE documents SET consumed_credit = $2, updated_at = NOW() \
             WHERE document_id = $1",
        )
        .bind(document_id)
        .bind(consumed_credit)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Update the title reported by the transcription stage.
    pub async fn set_title(
        pool: &PgPool,
        document_id: &str,
        title: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE documents SET title = $2, updated_at = NOW() WHERE document_id = $1")
            .bind(document_id)
            .bind(title)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Delete a document. Cascade deletes its activity records and
    /// generated package rows.
    pub async fn delete(pool: &PgPool, document_id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM documents WHERE document_id = $1")
            .bind(document_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
