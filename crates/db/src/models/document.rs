//! Document entity model and DTOs.

use nolej_core::types::{DbId, Timestamp};
use nolej_core::DocumentStatus;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `documents` table.
///
/// `status` is stored as the raw SMALLINT code; use
/// [`Document::status`] to get the typed state.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Document {
    pub document_id: String,
    pub user_id: DbId,
    pub title: String,
    pub media_type: String,
    pub source_url: String,
    pub language: String,
    pub automatic_mode: bool,
    pub consumed_credit: DbId,
    #[serde(rename = "status_code")]
    pub status: i16,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Document {
    /// Typed document status. Falls back to `Failed` if the stored
    /// code is unknown, which can only happen after a bad manual edit.
    pub fn status(&self) -> DocumentStatus {
        DocumentStatus::from_code(self.status).unwrap_or(DocumentStatus::Failed)
    }
}

/// DTO for inserting a freshly created document.
#[derive(Debug, Deserialize)]
pub struct NewDocument {
    pub document_id: String,
    pub user_id: DbId,
    pub title: String,
    pub media_type: String,
    pub source_url: String,
    pub language: String,
    pub automatic_mode: bool,
}
