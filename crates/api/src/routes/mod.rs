pub mod document;
pub mod files;
pub mod health;
pub mod notification;
pub mod webhook;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /documents                                create
/// /documents/{id}                           get
/// /documents/{id}/updates                   status polling
/// /documents/{id}/transcription             review round-trip (GET/PUT)
/// /documents/{id}/resources/{resource}      settings, concepts, questions, summary
/// /documents/{id}/webhook-poll              lost-delivery recovery
///
/// /notifications                            activity feed
/// /notifications/unread-count               unread counter
/// /notifications/ack                        dismiss all
/// ```
///
/// The webhook endpoint and the workspace file server are mounted at
/// root level (see [`webhook::router`] and [`files::router`]).
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/documents", document::router())
        .nest("/notifications", notification::router())
}
