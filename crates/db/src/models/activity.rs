//! Activity Record entity model.

use nolej_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `document_activities` table: the outcome of one
/// workflow stage for one user, doubling as that user's notification.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ActivityRecord {
    pub document_id: String,
    pub user_id: DbId,
    pub action: String,
    pub status: String,
    pub code: DbId,
    pub error_message: String,
    pub consumed_credit: DbId,
    pub tstamp: Timestamp,
    pub notified: bool,
}

/// Immutable value describing one stage outcome to record.
///
/// Replaces the original design's fluent mutable builder: construct it
/// once with named fields and hand it to `ActivityRepo::upsert`.
#[derive(Debug, Clone)]
pub struct StageOutcome<'a> {
    pub document_id: &'a str,
    pub user_id: DbId,
    pub action: &'a str,
    pub status: &'a str,
    pub code: DbId,
    pub error_message: &'a str,
    pub consumed_credit: DbId,
}
