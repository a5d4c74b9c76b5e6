//! Repository for the `document_activities` table.

use nolej_core::types::DbId;
use sqlx::PgPool;

use crate::models::activity::{ActivityRecord, StageOutcome};

const ACTIVITY_COLUMNS: &str = "\
    document_id, user_id, action, status, code, error_message, \
    consumed_credit, tstamp, notified";

/// Upsert-style access to per-stage activity records.
pub struct ActivityRepo;

impl ActivityRepo {
    /// Record a stage outcome.
    ///
    /// At most one row exists per (document_id, user_id, action); a
    /// second recording updates the row in place and resets the
    /// notified flag so the user sees the newer outcome.
    pub async fn upsert(
        pool: &PgPool,
        outcome: &StageOutcome<'_>,
    ) -> Result<ActivityRecord, sqlx::Error> {
        let query = format!(
            "INSERT INTO document_activities \
                 (document_id, user_id, action, status, code, error_message, consumed_credit) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT (document_id, user_id, action) DO UPDATE SET \
                 status = EXCLUDED.status, \
                 code = EXCLUDED.code, \
                 error_message = EXCLUDED.error_message, \
                 consumed_credit = EXCLUDED.consumed_credit, \
                 tstamp = NOW(), \
                 notified = FALSE \
             RETURNING {ACTIVITY_COLUMNS}"
        );
        sqlx::query_as::<_, ActivityRecord>(&query)
            .bind(outcome.document_id)
            .bind(outcome.user_id)
            .bind(outcome.action)
            .bind(outcome.status)
            .bind(outcome.code)
            .bind(outcome.error_message)
            .bind(outcome.consumed_credit)
            .fetch_one(pool)
            .await
    }

    /// List a user's activity records, newest first, optionally only
    /// those not yet consumed by the notification UI.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        unread_only: bool,
        limit: i64,
    ) -> Result<Vec<ActivityRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {ACTIVITY_COLUMNS} FROM document_activities \
             WHERE user_id = $1 AND ($2 = FALSE OR notified = FALSE) \
             ORDER BY tstamp DESC LIMIT $3"
        );
        sqlx::query_as::<_, ActivityRecord>(&query)
            .bind(user_id)
            .bind(unread_only)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// List every record for one document.
    pub async fn list_for_document(
        pool: &PgPool,
        document_id: &str,
    ) -> Result<Vec<ActivityRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {ACTIVITY_COLUMNS} FROM document_activities \
             WHERE document_id = $1 ORDER BY tstamp DESC"
        );
        sqlx::query_as::<_, ActivityRecord>(&query)
            .bind(document_id)
            .fetch_all(pool)
            .await
    }

    /// Mark all of a user's records as consumed by the notification
    /// UI. Returns how many rows flipped.
    pub async fn mark_notified(pool: &PgPool, user_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE document_activities SET notified = TRUE \
             WHERE user_id = $1 AND notified = FALSE",
        )
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Number of records not yet consumed by the notification UI.
    pub async fn unread_count(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM document_activities \
             WHERE user_id = $1 AND notified = FALSE",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;
        Ok(count)
    }
}
