//! Webhook Ingestor: `POST /webhooks/nolej`.
//!
//! Nolej reports the completion of each generation stage by calling
//! back with `{action, documentID, status, code, error_message,
//! consumedCredit}`. Processing is strictly
//! validate -> transition -> side-effect -> notify, and every status
//! move is a compare-and-swap, so a replayed or out-of-order delivery
//! can never mutate a document twice.

use axum::extract::State;
use axum::Json;
use nolej_client::AnalysisStart;
use nolej_core::error::CoreError;
use nolej_core::{media, DocumentStatus, WebhookAction};
use nolej_db::models::activity::StageOutcome;
use nolej_db::models::document::Document;
use nolej_db::repositories::{ActivityRepo, DocumentRepo};
use nolej_importer::PackageImporter;
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Filename of the cached transcription inside a document workspace.
pub const TRANSCRIPTION_FILE: &str = "transcription.htm";

/// POST /webhooks/nolej
///
/// Responds 200 with `{"message": ...}`, 400 on a malformed payload,
/// 404 when the document is not awaiting the reported stage.
pub async fn receive(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> AppResult<Json<Value>> {
    let message = process(&state, &payload).await?;
    Ok(Json(json!({ "message": message })))
}

/// Apply one webhook payload, returning the acknowledgement message.
/// Shared by the HTTP endpoint and the `webhook-poll` recovery path.
pub async fn process(state: &AppState, payload: &Value) -> AppResult<String> {
    let Some(action_str) = payload.get("action").and_then(Value::as_str) else {
        return Err(AppError::BadRequest(
            "webhook payload must carry a string `action` field".to_string(),
        ));
    };

    let Some(action) = WebhookAction::parse(action_str) else {
        tracing::warn!(action = action_str, "Dropping webhook with unrecognized action");
        return Ok(String::new());
    };

    // Keep-alive ping sent while a long stage is still running.
    if action == WebhookAction::WorkInProgress {
        tracing::info!("Nolej reports work in progress");
        return Ok("Work in progress.".to_string());
    }

    let report = StageReport::extract(payload)?;

    let Some(expected) = action.expected_status() else {
        return Ok(String::new());
    };

    let document = DocumentRepo::find_in_status(&state.pool, &report.document_id, expected)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Document",
            id: report.document_id.clone(),
        })?;

    tracing::info!(
        document_id = %document.document_id,
        action = action.as_str(),
        status = %report.status,
        code = report.code,
        "Webhook received"
    );

    DocumentRepo::set_consumed_credit(&state.pool, &document.document_id, report.consumed_credit)
        .await?;

    match action {
        WebhookAction::Transcription => transcription_received(state, &document, &report).await,
        WebhookAction::Analysis => analysis_received(state, &document, &report).await,
        WebhookAction::Activities => activities_received(state, &document, &report).await,
        WebhookAction::WorkInProgress => Ok(String::new()),
    }
}

/// The validated fields of a substantive webhook delivery.
struct StageReport {
    document_id: String,
    status: String,
    code: i64,
    error_message: String,
    consumed_credit: i64,
}

impl StageReport {
    /// Extract and type-check the payload fields. Fails closed: any
    /// missing or mistyped field rejects the whole delivery.
    fn extract(payload: &Value) -> Result<Self, AppError> {
        let document_id = require_str(payload, "documentID")?;
        let status = require_str(payload, "status")?;
        let code = payload
            .get("code")
            .and_then(Value::as_i64)
            .ok_or_else(|| bad_field("code", "an integer"))?;
        let error_message = require_str(payload, "error_message")?;
        let consumed_credit = match payload.get("consumedCredit") {
            None | Some(Value::Null) => 0,
            Some(v) => v.as_i64().ok_or_else(|| bad_field("consumedCredit", "an integer"))?,
        };

        Ok(Self {
            document_id,
            status,
            code,
            error_message,
            consumed_credit,
        })
    }

    fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

fn require_str(payload: &Value, field: &str) -> Result<String, AppError> {
    payload
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| bad_field(field, "a string"))
}

fn bad_field(field: &str, expected: &str) -> AppError {
    AppError::BadRequest(format!("webhook field `{field}` must be {expected}"))
}

// ---------------------------------------------------------------------------
// Stage handlers
// ---------------------------------------------------------------------------

async fn transcription_received(
    state: &AppState,
    document: &Document,
    report: &StageReport,
) -> AppResult<String> {
    if !report.is_ok() {
        // Back to Creation so the user can fix the source and retry.
        transition_or_replay(
            state,
            document,
            DocumentStatus::CreationPending,
            DocumentStatus::Creation,
        )
        .await?;
        record(state, document, "transcription_ko", report, &report.error_message).await?;
        return Ok("Transcription failed.".to_string());
    }

    transition_or_replay(
        state,
        document,
        DocumentStatus::CreationPending,
        DocumentStatus::Analysis,
    )
    .await?;
    record(state, document, "transcription_ok", report, &report.error_message).await?;

    // Audio and video transcriptions go through human review; every
    // other media type moves straight into analysis.
    if media::requires_transcription_review(&document.media_type) {
        return Ok("Transcription received!".to_string());
    }

    match start_automatic_analysis(state, document).await {
        Ok(()) => Ok("Transcription received, analysis started.".to_string()),
        Err(err) => {
            tracing::error!(
                document_id = %document.document_id,
                error = %err,
                "Automatic analysis start failed"
            );
            DocumentRepo::set_status(&state.pool, &document.document_id, DocumentStatus::Failed)
                .await?;
            let reason = err.to_string();
            let outcome = StageOutcome {
                document_id: &document.document_id,
                user_id: document.user_id,
                action: "analysis_ko",
                status: "ko",
                code: report.code,
                error_message: &reason,
                consumed_credit: report.consumed_credit,
            };
            ActivityRepo::upsert(&state.pool, &outcome).await?;
            Ok("Transcription received, but starting the analysis failed.".to_string())
        }
    }
}

/// Auto-advance path for media that needs no transcription review:
/// cache the transcription locally, hand it back to Nolej, and move
/// the document into AnalysisPending.
async fn start_automatic_analysis(state: &AppState, document: &Document) -> AppResult<()> {
    let transcription = state.nolej.get_transcription(&document.document_id).await?;
    let content = state.nolej.download(&transcription.result).await?;

    let workspace = state.workspace(&document.document_id);
    workspace.write(TRANSCRIPTION_FILE, &content).await?;

    if !transcription.title.is_empty() && transcription.title != document.title {
        DocumentRepo::set_title(&state.pool, &document.document_id, &transcription.title).await?;
    }

    let s3_url = state
        .nolej_config
        .file_url(&document.document_id, TRANSCRIPTION_FILE);
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

    transition_or_replay(
        state,
        document,
        DocumentStatus::Analysis,
        DocumentStatus::AnalysisPending,
    )
    .await?;

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

    Ok(())
}

async fn analysis_received(
    state: &AppState,
    document: &Document,
    report: &StageReport,
) -> AppResult<String> {
    if report.is_ok() {
        transition_or_replay(
            state,
            document,
            DocumentStatus::AnalysisPending,
            DocumentStatus::Revision,
        )
        .await?;
        record(state, document, "analysis_ok", report, &report.error_message).await?;
        Ok("Analysis received!".to_string())
    } else {
        transition_or_replay(
            state,
            document,
            DocumentStatus::AnalysisPending,
            DocumentStatus::Failed,
        )
        .await?;
        record(state, document, "analysis_ko", report, &report.error_message).await?;
        Ok("Analysis failed.".to_string())
    }
}

async fn activities_received(
    state: &AppState,
    document: &Document,
    report: &StageReport,
) -> AppResult<String> {
    if !report.is_ok() {
        // Back to Activities so generation can be requested again.
        transition_or_replay(
            state,
            document,
            DocumentStatus::ActivitiesPending,
            DocumentStatus::Activities,
        )
        .await?;
        record(state, document, "activities_ko", report, &report.error_message).await?;
        return Ok("Activities generation failed.".to_string());
    }

    transition_or_replay(
        state,
        document,
        DocumentStatus::ActivitiesPending,
        DocumentStatus::Completed,
    )
    .await?;

    let workspace = state.workspace(&document.document_id);
    let importer = PackageImporter::new(&state.pool, state.nolej.as_ref(), state.h5p_store.as_ref());
    let failures = importer.import_all(&document.document_id, &workspace).await;

    if failures.is_empty() {
        record(state, document, "activities_ok", report, &report.error_message).await?;
        Ok("Activities received!".to_string())
    } else {
        // The document stays Completed; the failure list reaches the
        // owner through the notification feed.
        let outcome = StageOutcome {
            document_id: &document.document_id,
            user_id: document.user_id,
            action: "activities_ko",
            status: "ko",
            code: report.code,
            error_message: &failures,
            consumed_credit: report.consumed_credit,
        };
        ActivityRepo::upsert(&state.pool, &outcome).await?;
        Ok("Activities received, but something went wrong while retrieving them.".to_string())
    }
}

// ---------------------------------------------------------------------------
// Shared steps
// ---------------------------------------------------------------------------

/// Compare-and-swap the document status; a lost race is reported the
/// same way as a document that was never in the expected state.
async fn transition_or_replay(
    state: &AppState,
    document: &Document,
    expected: DocumentStatus,
    new: DocumentStatus,
) -> AppResult<()> {
    let moved =
        DocumentRepo::transition(&state.pool, &document.document_id, expected, new).await?;
    if !moved {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Document",
            id: document.document_id.clone(),
        }));
    }
    Ok(())
}

/// Upsert the Activity Record that doubles as the owner's notification.
async fn record(
    state: &AppState,
    document: &Document,
    action: &str,
    report: &StageReport,
    error_message: &str,
) -> AppResult<()> {
    let outcome = StageOutcome {
        document_id: &document.document_id,
        user_id: document.user_id,
        action,
        status: &report.status,
        code: report.code,
        error_message,
        consumed_credit: report.consumed_credit,
    };
    ActivityRepo::upsert(&state.pool, &outcome).await?;
    Ok(())
}
