//! Route definition for the Nolej callback endpoint.
//!
//! Mounted at root level: the URL is registered with Nolej on document
//! creation and must stay stable across API versions.

use axum::routing::post;
use axum::Router;

use crate::handlers::webhook;
use crate::state::AppState;

/// ```text
/// POST   /webhooks/nolej            -> receive
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/webhooks/nolej", post(webhook::receive))
}
