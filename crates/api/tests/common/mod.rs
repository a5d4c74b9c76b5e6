use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use nolej_api::config::{NolejConfig, ServerConfig};
use nolej_api::router::build_app_router;
use nolej_api::state::AppState;
use nolej_client::{
    AnalysisStart, ClientError, CreateDocumentRequest, NolejApi, PackageDescriptor,
    TranscriptionResult,
};
use nolej_core::DocumentStatus;
use nolej_db::models::document::NewDocument;
use nolej_db::repositories::{DocumentRepo, PackageRepo};
use nolej_importer::{H5pStore, ImportError};

// ---------------------------------------------------------------------------
// Nolej stub
// ---------------------------------------------------------------------------

/// Programmable in-memory Nolej service.
///
/// Every outbound call is recorded so tests can assert on what the
/// handlers sent; responses are configured per test.
#[derive(Default)]
pub struct StubNolej {
    /// Document id returned by `create_document`.
    pub created_id: Mutex<Option<String>>,
    /// The last creation request the handlers sent.
    pub last_create: Mutex<Option<CreateDocumentRequest>>,
    /// Title and result URL served by `get_transcription`.
    pub transcription: Mutex<Option<TranscriptionResult>>,
    /// Bodies served by `download`, keyed by URL.
    pub downloads: Mutex<HashMap<String, Vec<u8>>>,
    /// When set, `start_analysis` fails.
    pub fail_start_analysis: AtomicBool,
    /// Number of `start_analysis` calls.
    pub analysis_started: AtomicU32,
    /// Bodies served by `get_resource`, keyed by resource name.
    pub resources: Mutex<HashMap<String, Vec<u8>>>,
    /// The last `put_resource` call: (resource, body).
    pub last_put_resource: Mutex<Option<(String, Vec<u8>)>>,
    /// Descriptors served by `list_packages`.
    pub packages: Mutex<Vec<PackageDescriptor>>,
    /// Payload served by `last_webhook`.
    pub webhook_replay: Mutex<Option<serde_json::Value>>,
}

impl StubNolej {
    pub fn serve_download(&self, url: &str, body: Vec<u8>) {
        self.downloads.lock().unwrap().insert(url.to_string(), body);
    }

    pub fn serve_transcription(&self, title: &str, result_url: &str) {
        *self.transcription.lock().unwrap() = Some(TranscriptionResult {
            title: title.to_string(),
            result: result_url.to_string(),
        });
    }

    pub fn serve_packages(&self, packages: &[(&str, &str)]) {
        *self.packages.lock().unwrap() = packages
            .iter()
            .map(|(name, url)| PackageDescriptor {
                activity_name: name.to_string(),
                url: url.to_string(),
            })
            .collect();
    }
}

#[async_trait]
impl NolejApi for StubNolej {
    async fn create_document(&self, req: &CreateDocumentRequest) -> Result<String, ClientError> {
        *self.last_create.lock().unwrap() = Some(req.clone());
        self.created_id
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| ClientError::Api("stub has no document id configured".into()))
    }

    async fn get_transcription(&self, _id: &str) -> Result<TranscriptionResult, ClientError> {
        self.transcription
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| ClientError::Api("stub has no transcription configured".into()))
    }

    async fn start_analysis(&self, _id: &str, _req: &AnalysisStart) -> Result<(), ClientError> {
        if self.fail_start_analysis.load(Ordering::SeqCst) {
            return Err(ClientError::Api("analysis start rejected".into()));
        }
        self.analysis_started.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn get_resource(&self, _id: &str, resource: &str) -> Result<Vec<u8>, ClientError> {
        self.resources
            .lock()
            .unwrap()
            .get(resource)
            .cloned()
            .ok_or_else(|| ClientError::Api(format!("stub has no `{resource}` configured")))
    }

    async fn put_resource(
        &self,
        _id: &str,
        resource: &str,
        content: &[u8],
    ) -> Result<(), ClientError> {
        *self.last_put_resource.lock().unwrap() = Some((resource.to_string(), content.to_vec()));
        Ok(())
    }

    async fn list_packages(&self, _id: &str) -> Result<Vec<PackageDescriptor>, ClientError> {
        Ok(self.packages.lock().unwrap().clone())
    }

    async fn last_webhook(&self, _id: &str) -> Result<serde_json::Value, ClientError> {
        self.webhook_replay
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| ClientError::Api("stub has no webhook payload configured".into()))
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, ClientError> {
        self.downloads
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| ClientError::Api(format!("404 for {url}")))
    }
}

// ---------------------------------------------------------------------------
// Content store stub
// ---------------------------------------------------------------------------

/// Content store that registers packages without validating them, and
/// can be told to reject specific kinds.
pub struct StubStore {
    pool: PgPool,
    pub fail_kinds: Mutex<Vec<String>>,
}

impl StubStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            fail_kinds: Mutex::new(Vec::new()),
        }
    }

    pub fn fail_kind(&self, kind: &str) {
        self.fail_kinds.lock().unwrap().push(kind.to_string());
    }
}

#[async_trait]
impl H5pStore for StubStore {
    async fn import(
        &self,
        _document_id: &str,
        kind: &str,
        path: &Path,
    ) -> Result<i64, ImportError> {
        if self.fail_kinds.lock().unwrap().iter().any(|k| k == kind) {
            return Err(ImportError::Invalid("rejected by test store".to_string()));
        }
        PackageRepo::register_content(&self.pool, kind, &path.to_string_lossy())
            .await
            .map_err(|e| ImportError::Store(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
    }
}

/// Build a test `NolejConfig` rooted in the given data directory.
pub fn test_nolej_config(data_dir: &Path) -> NolejConfig {
    NolejConfig {
        api_base_url: "http://nolej.invalid".to_string(),
        api_key: "test-key".to_string(),
        organisation_id: "test-org".to_string(),
        public_base_url: "http://localhost:3000".to_string(),
        data_dir: data_dir.to_path_buf(),
        content_dir: data_dir.join("content"),
    }
}

/// Build the full application router with all middleware layers, the
/// given stubbed Nolej service, and a pass-through content store.
///
/// This mirrors the router construction in `main.rs` so integration
/// tests exercise the same middleware stack that production uses.
pub fn build_test_app(pool: PgPool, nolej: Arc<StubNolej>, data_dir: &Path) -> Router {
    let store = Arc::new(StubStore::new(pool.clone()));
    build_test_app_with_store(pool, nolej, store, data_dir)
}

/// Like [`build_test_app`] but with a caller-controlled content store.
pub fn build_test_app_with_store(
    pool: PgPool,
    nolej: Arc<StubNolej>,
    store: Arc<StubStore>,
    data_dir: &Path,
) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        nolej_config: Arc::new(test_nolej_config(data_dir)),
        nolej,
        h5p_store: store,
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Seed data
// ---------------------------------------------------------------------------

/// Insert a document directly into the given state.
pub async fn seed_document(
    pool: &PgPool,
    document_id: &str,
    user_id: i64,
    media_type: &str,
    status: DocumentStatus,
) {
    let input = NewDocument {
        document_id: document_id.to_string(),
        user_id,
        title: "Photosynthesis".to_string(),
        media_type: media_type.to_string(),
        source_url: "https://files.example.org/photosynthesis.pdf".to_string(),
        language: "en".to_string(),
        automatic_mode: false,
    };
    DocumentRepo::create(pool, &input, status).await.unwrap();
}

/// Current stored status code of a document.
pub async fn status_of(pool: &PgPool, document_id: &str) -> i16 {
    DocumentRepo::find_by_id(pool, document_id)
        .await
        .unwrap()
        .unwrap()
        .status
}

/// A well-formed webhook payload for one stage report.
pub fn webhook_payload(
    action: &str,
    document_id: &str,
    status: &str,
    code: i64,
    error_message: &str,
) -> serde_json::Value {
    serde_json::json!({
        "action": action,
        "documentID": document_id,
        "status": status,
        "code": code,
        "error_message": error_message,
        "consumedCredit": 1,
    })
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response {
    app.oneshot(
        Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send_json(app, Method::POST, uri, body).await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send_json(app, Method::PUT, uri, body).await
}

async fn send_json(
    app: Router,
    method: Method,
    uri: &str,
    body: serde_json::Value,
) -> Response {
    app.oneshot(
        Request::builder()
            .method(method)
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn body_text(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
