//! Route definition for the public document workspace files.
//!
//! Mounted at root level: Nolej fetches transcriptions from here with
//! the URL we hand out, so it must not sit under `/api/v1`.

use axum::routing::get;
use axum::Router;

use crate::handlers::files;
use crate::state::AppState;

/// ```text
/// GET    /files/{document_id}/{filename}   -> serve
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/files/{document_id}/{filename}", get(files::serve))
}
