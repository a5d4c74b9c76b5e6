//! Generated package entity model.

use nolej_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `generated_packages` table: one imported H5P-style
/// artifact. Never updated; superseded by newer rows of the same kind.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct GeneratedPackage {
    pub id: DbId,
    pub document_id: String,
    pub kind: String,
    pub generated_at: Timestamp,
    pub content_id: DbId,
}
