//! Handlers for the `/documents` resource: creation, polling, the
//! transcription review round-trip, and the editable analysis
//! resources (settings, concepts, questions, summary).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use nolej_client::{AnalysisStart, CreateDocumentRequest};
use nolej_core::error::CoreError;
use nolej_core::types::DbId;
use nolej_core::{media, DocumentStatus};
use nolej_db::models::activity::StageOutcome;
use nolej_db::models::document::{Document, NewDocument};
use nolej_db::repositories::{ActivityRepo, DocumentRepo};
use serde::Deserialize;
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::handlers::webhook;
use crate::state::AppState;

/// The editable analysis resources proxied to Nolej.
const RESOURCES: &[&str] = &["settings", "concepts", "questions", "summary"];

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Body of `POST /documents`.
#[derive(Debug, Deserialize)]
pub struct CreateDocument {
    pub user_id: DbId,
    pub title: String,
    pub media_type: String,
    pub source_url: String,
    pub language: String,
    #[serde(default)]
    pub automatic_mode: bool,
    /// Credit to reserve for this generation. Defaults to one.
    #[serde(default = "default_credit")]
    pub decremented_credit: i64,
}

fn default_credit() -> i64 {
    1
}

/// Query parameters for `GET /documents/{id}/updates`.
#[derive(Debug, Deserialize)]
pub struct UpdatesQuery {
    /// The status code the caller last saw.
    pub status: i16,
}

/// Body of `PUT /documents/{id}/transcription`.
#[derive(Debug, Deserialize)]
pub struct TranscriptionUpdate {
    pub content: String,
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

/// POST /api/v1/documents
///
/// Registers the source with Nolej, stores the document at
/// CreationPending, and seeds the owner's `transcription` activity so
/// the feed shows the stage as started.
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateDocument>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    if !media::is_supported(&body.media_type) {
        return Err(AppError::BadRequest(format!(
            "unsupported media type `{}`",
            body.media_type
        )));
    }
    if !media::source_matches_media_type(&body.media_type, &body.source_url) {
        return Err(AppError::BadRequest(format!(
            "source URL does not look like a `{}` file",
            body.media_type
        )));
    }

    let request = CreateDocumentRequest {
        user_id: body.user_id,
        organisation_id: state.nolej_config.organisation_id.clone(),
        title: body.title.clone(),
        decremented_credit: body.decremented_credit,
        doc_url: body.source_url.clone(),
        webhook_url: state.nolej_config.webhook_url(),
        media_type: body.media_type.clone(),
        automatic_mode: body.automatic_mode,
        language: body.language.clone(),
    };

    let document_id = state.nolej.create_document(&request).await?;
    tracing::info!(document_id = %document_id, title = %body.title, "Document registered with Nolej");

    let input = NewDocument {
        document_id,
        user_id: body.user_id,
        title: body.title,
        media_type: body.media_type,
        source_url: body.source_url,
        language: body.language,
        automatic_mode: body.automatic_mode,
    };
    let document =
        DocumentRepo::create(&state.pool, &input, DocumentStatus::CreationPending).await?;

    let outcome = StageOutcome {
        document_id: &document.document_id,
        user_id: document.user_id,
        action: "transcription",
        status: "ok",
        code: 0,
        error_message: "",
        consumed_credit: 0,
    };
    ActivityRepo::upsert(&state.pool, &outcome).await?;

    Ok((StatusCode::CREATED, Json(json!({ "data": document }))))
}

/// GET /api/v1/documents/{id}
pub async fn get_document(
    State(state): State<AppState>,
    Path(document_id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let document = find_document(&state, &document_id).await?;
    Ok(Json(json!({ "data": document })))
}

/// GET /api/v1/documents/{id}/updates?status=N
///
/// Lightweight status polling: responds `"update"` when the stored
/// status differs from the one the caller last saw, empty otherwise.
pub async fn check_updates(
    State(state): State<AppState>,
    Path(document_id): Path<String>,
    Query(params): Query<UpdatesQuery>,
) -> AppResult<String> {
    let document = find_document(&state, &document_id).await?;

    if document.status != params.status {
        Ok("update".to_string())
    } else {
        Ok(String::new())
    }
}

// ---------------------------------------------------------------------------
// Transcription review
// ---------------------------------------------------------------------------

/// GET /api/v1/documents/{id}/transcription
///
/// Fetches the transcription from Nolej, caches it in the document
/// workspace, and adopts the title the service inferred.
pub async fn get_transcription(
    State(state): State<AppState>,
    Path(document_id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let document = find_document(&state, &document_id).await?;

    let transcription = state.nolej.get_transcription(&document.document_id).await?;
    let content = state.nolej.download(&transcription.result).await?;

    let workspace = state.workspace(&document.document_id);
    workspace
        .write(webhook::TRANSCRIPTION_FILE, &content)
        .await?;

    if !transcription.title.is_empty() && transcription.title != document.title {
        DocumentRepo::set_title(&state.pool, &document.document_id, &transcription.title).await?;
    }

    Ok(Json(json!({
        "data": {
            "title": transcription.title,
            "content": String::from_utf8_lossy(&content),
        }
    })))
}

/// PUT /api/v1/documents/{id}/transcription
///
/// Submits the reviewed transcription and starts the analysis. Only
/// valid while the document sits in Analysis, waiting for the review.
pub async fn put_transcription(
    State(state): State<AppState>,
    Path(document_id): Path<String>,
    Json(body): Json<TranscriptionUpdate>,
) -> AppResult<Json<serde_json::Value>> {
    let document =
        DocumentRepo::find_in_status(&state.pool, &document_id, DocumentStatus::Analysis)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Document",
                id: document_id.clone(),
            })?;

    let workspace = state.workspace(&document.document_id);
    workspace
        .write(webhook::TRANSCRIPTION_FILE, body.content.as_bytes())
        .await?;

    let s3_url = state
        .nolej_config
        .file_url(&document.document_id, webhook::TRANSCRIPTION_FILE);
    state
        .nolej
        .start_analysis(
            &document.document_id,
            &AnalysisStart {
                s3_url,
                automatic_mode: document.automatic_mode,
            },
        )
        .await?;

    let moved = DocumentRepo::transition(
        &state.pool,
        &document.document_id,
        DocumentStatus::Analysis,
        DocumentStatus::AnalysisPending,
    )
    .await?;
    if !moved {
        return Err(AppError::Core(CoreError::Conflict(
            "document status changed while submitting the transcription".to_string(),
        )));
    }

    let outcome = StageOutcome {
        document_id: &document.document_id,
        user_id: document.user_id,
        action: "analysis",
        status: "ok",
        code: 0,
        error_message: "",
        consumed_credit: 0,
    };
    ActivityRepo::upsert(&state.pool, &outcome).await?;

    Ok(Json(json!({
        "data": { "status_code": DocumentStatus::AnalysisPending.code() }
    })))
}

// ---------------------------------------------------------------------------
// Analysis resources
// ---------------------------------------------------------------------------

/// GET /api/v1/documents/{id}/resources/{resource}
///
/// Proxies the resource from Nolej and refreshes the workspace cache.
pub async fn get_resource(
    State(state): State<AppState>,
    Path((document_id, resource)): Path<(String, String)>,
) -> AppResult<Json<serde_json::Value>> {
    check_resource(&resource)?;
    let document = find_document(&state, &document_id).await?;

    let bytes = state
        .nolej
        .get_resource(&document.document_id, &resource)
        .await?;

    let workspace = state.workspace(&document.document_id);
    workspace
        .write(&format!("{resource}.json"), &bytes)
        .await?;

    let content: serde_json::Value = serde_json::from_slice(&bytes)
        .map_err(|e| AppError::InternalError(format!("Nolej returned invalid {resource}: {e}")))?;

    Ok(Json(json!({ "data": content })))
}

/// PUT /api/v1/documents/{id}/resources/{resource}
///
/// Writes the edited resource through the workspace cache to Nolej.
pub async fn put_resource(
    State(state): State<AppState>,
    Path((document_id, resource)): Path<(String, String)>,
    Json(content): Json<serde_json::Value>,
) -> AppResult<StatusCode> {
    check_resource(&resource)?;
    let document = find_document(&state, &document_id).await?;

    let bytes = serde_json::to_vec(&content)
        .map_err(|e| AppError::InternalError(format!("failed to serialize {resource}: {e}")))?;

    let workspace = state.workspace(&document.document_id);
    workspace
        .write(&format!("{resource}.json"), &bytes)
        .await?;

    state
        .nolej
        .put_resource(&document.document_id, &resource, &bytes)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Activities generation
// ---------------------------------------------------------------------------

/// POST /api/v1/documents/{id}/activities
///
/// Requests generation of the selected activity packages: writes the
/// settings (with the desired packages) through the workspace cache to
/// Nolej and moves the document into ActivitiesPending. Valid from
/// Revision, and again from Activities after a failed generation.
pub async fn generate_activities(
    State(state): State<AppState>,
    Path(document_id): Path<String>,
    Json(settings): Json<serde_json::Value>,
) -> AppResult<Json<serde_json::Value>> {
    let document = find_document(&state, &document_id).await?;

    let current = document.status();
    if current != DocumentStatus::Revision && current != DocumentStatus::Activities {
        return Err(AppError::Core(CoreError::Conflict(
            "activities can only be requested after the analysis was reviewed".to_string(),
        )));
    }

    let bytes = serde_json::to_vec(&settings)
        .map_err(|e| AppError::InternalError(format!("failed to serialize settings: {e}")))?;

    let workspace = state.workspace(&document.document_id);
    workspace.write("settings.json", &bytes).await?;

    state
        .nolej
        .put_resource(&document.document_id, "settings", &bytes)
        .await?;

    let moved = DocumentRepo::transition(
        &state.pool,
        &document.document_id,
        current,
        DocumentStatus::ActivitiesPending,
    )
    .await?;
    if !moved {
        return Err(AppError::Core(CoreError::Conflict(
            "document status changed while requesting the activities".to_string(),
        )));
    }

    let outcome = StageOutcome {
        document_id: &document.document_id,
        user_id: document.user_id,
        action: "activities",
        status: "ok",
        code: 0,
        error_message: "",
        consumed_credit: 0,
    };
    ActivityRepo::upsert(&state.pool, &outcome).await?;
    tracing::info!(document_id = %document.document_id, "Activities generation requested");

    Ok(Json(json!({
        "data": { "status_code": DocumentStatus::ActivitiesPending.code() }
    })))
}

// ---------------------------------------------------------------------------
// Webhook recovery
// ---------------------------------------------------------------------------

/// POST /api/v1/documents/{id}/webhook-poll
///
/// Recovery for a lost delivery: fetches the most recent webhook
/// payload from Nolej and runs it through the ingestor. Only useful
/// while the document is awaiting a callback.
pub async fn webhook_poll(
    State(state): State<AppState>,
    Path(document_id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let document = find_document(&state, &document_id).await?;

    if !document.status().is_pending() {
        return Err(AppError::Core(CoreError::Conflict(
            "document is not awaiting a webhook".to_string(),
        )));
    }

    let payload = state.nolej.last_webhook(&document.document_id).await?;
    tracing::info!(document_id = %document.document_id, "Replaying last webhook from Nolej");

    let message = webhook::process(&state, &payload).await?;
    Ok(Json(json!({ "message": message })))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_document(state: &AppState, document_id: &str) -> AppResult<Document> {
    DocumentRepo::find_by_id(&state.pool, document_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Document",
                id: document_id.to_string(),
            })
        })
}

fn check_resource(resource: &str) -> Result<(), AppError> {
    if RESOURCES.contains(&resource) {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!(
            "unknown resource `{resource}`; expected one of {RESOURCES:?}"
        )))
    }
}
