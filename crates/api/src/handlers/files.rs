//! Serves files from document workspaces.
//!
//! Nolej fetches the reviewed transcription back from us over plain
//! HTTP (the `s3URL` handed to the analysis start call), so the
//! workspace needs a public read path.

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use nolej_core::error::CoreError;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /files/{document_id}/{filename}
pub async fn serve(
    State(state): State<AppState>,
    Path((document_id, filename)): Path<(String, String)>,
) -> AppResult<Response> {
    check_segment(&document_id)?;
    check_segment(&filename)?;

    let workspace = state.workspace(&document_id);
    let Some(bytes) = workspace.read(&filename).await? else {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "File",
            id: format!("{document_id}/{filename}"),
        }));
    };

    let content_type = content_type_for(&filename);
    Ok(([(header::CONTENT_TYPE, content_type)], bytes).into_response())
}

/// Both path segments name a single directory entry; anything that
/// could traverse out of the workspace is rejected.
fn check_segment(segment: &str) -> Result<(), AppError> {
    if segment.is_empty()
        || segment.contains('/')
        || segment.contains('\\')
        || segment.contains("..")
    {
        return Err(AppError::BadRequest("invalid path segment".to_string()));
    }
    Ok(())
}

fn content_type_for(filename: &str) -> &'static str {
    match filename.rsplit('.').next() {
        Some("htm") | Some("html") => "text/html; charset=utf-8",
        Some("json") => "application/json",
        Some("h5p") | Some("zip") => "application/zip",
        Some("txt") => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traversal_segments_are_rejected() {
        assert!(check_segment("..").is_err());
        assert!(check_segment("a/../b").is_err());
        assert!(check_segment("a\\b").is_err());
        assert!(check_segment("").is_err());
        assert!(check_segment("transcription.htm").is_ok());
    }

    #[test]
    fn content_types_follow_the_extension() {
        assert_eq!(content_type_for("transcription.htm"), "text/html; charset=utf-8");
        assert_eq!(content_type_for("settings.json"), "application/json");
        assert_eq!(content_type_for("glossary.h5p"), "application/zip");
        assert_eq!(content_type_for("blob"), "application/octet-stream");
    }
}
