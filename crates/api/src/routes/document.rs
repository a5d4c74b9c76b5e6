//! Route definitions for the `/documents` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::document;
use crate::state::AppState;

/// Routes mounted at `/documents`.
///
/// ```text
/// POST   /                              -> create
/// GET    /{id}                          -> get_document
/// GET    /{id}/updates                  -> check_updates
/// GET    /{id}/transcription            -> get_transcription
/// PUT    /{id}/transcription            -> put_transcription
/// GET    /{id}/resources/{resource}     -> get_resource
/// PUT    /{id}/resources/{resource}     -> put_resource
/// POST   /{id}/activities               -> generate_activities
/// POST   /{id}/webhook-poll             -> webhook_poll
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(document::create))
        .route("/{id}", get(document::get_document))
        .route("/{id}/updates", get(document::check_updates))
        .route(
            "/{id}/transcription",
            get(document::get_transcription).put(document::put_transcription),
        )
        .route(
            "/{id}/resources/{resource}",
            get(document::get_resource).put(document::put_resource),
        )
        .route("/{id}/activities", post(document::generate_activities))
        .route("/{id}/webhook-poll", post(document::webhook_poll))
}
