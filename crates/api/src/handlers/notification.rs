//! Handlers for the `/notifications` resource.
//!
//! Activity Records double as notifications: a record with
//! `notified = FALSE` is unread, and acknowledging flips the flag.

use axum::extract::{Query, State};
use axum::Json;
use nolej_core::types::DbId;
use nolej_db::repositories::ActivityRepo;
use serde::Deserialize;
use serde_json::json;

use crate::error::AppResult;
use crate::state::AppState;

/// Maximum page size for the notification feed.
const MAX_LIMIT: i64 = 100;

/// Default page size for the notification feed.
const DEFAULT_LIMIT: i64 = 50;

/// Query parameters for `GET /notifications`.
#[derive(Debug, Deserialize)]
pub struct NotificationQuery {
    pub user_id: DbId,
    /// If `true`, return only unread records. Defaults to `false`.
    pub unread_only: Option<bool>,
    /// Maximum number of results. Defaults to 50, capped at 100.
    pub limit: Option<i64>,
}

/// Query parameters for the ack and unread-count endpoints.
#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub user_id: DbId,
}

/// GET /api/v1/notifications
///
/// List a user's activity records, newest first.
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<NotificationQuery>,
) -> AppResult<Json<serde_json::Value>> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
    let unread_only = params.unread_only.unwrap_or(false);

    let records =
        ActivityRepo::list_for_user(&state.pool, params.user_id, unread_only, limit).await?;

    Ok(Json(json!({ "data": records })))
}

/// GET /api/v1/notifications/unread-count
pub async fn unread_count(
    State(state): State<AppState>,
    Query(params): Query<UserQuery>,
) -> AppResult<Json<serde_json::Value>> {
    let count = ActivityRepo::unread_count(&state.pool, params.user_id).await?;

    Ok(Json(json!({ "data": { "count": count } })))
}

/// POST /api/v1/notifications/ack
///
/// Mark all of a user's records as seen. Returns how many flipped.
pub async fn ack(
    State(state): State<AppState>,
    Query(params): Query<UserQuery>,
) -> AppResult<Json<serde_json::Value>> {
    let acknowledged = ActivityRepo::mark_notified(&state.pool, params.user_id).await?;

    Ok(Json(json!({ "data": { "acknowledged": acknowledged } })))
}
