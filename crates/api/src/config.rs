use std::path::PathBuf;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    /// Load configuration from the environment, falling back to
    /// development defaults for anything unset.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            cors_origins: std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:5173".to_string())
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect(),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
        }
    }
}

/// Connection settings for the Nolej service and the local document
/// store, built once at startup and injected through `AppState`.
#[derive(Debug, Clone)]
pub struct NolejConfig {
    /// Base URL of the Nolej REST API.
    pub api_base_url: String,
    /// API key sent as `Authorization: X-API-KEY {key}`.
    pub api_key: String,
    /// Organisation identifier forwarded on document creation.
    pub organisation_id: String,
    /// Public base URL of this server, used to build the webhook URL
    /// and the file URLs handed to Nolej.
    pub public_base_url: String,
    /// Root of the per-document workspaces.
    pub data_dir: PathBuf,
    /// Where imported H5P packages are stored.
    pub content_dir: PathBuf,
}

impl NolejConfig {
    /// Load Nolej settings from the environment.
    ///
    /// Panics if `NOLEJ_API_KEY` is unset; without a key no outbound
    /// call can succeed and we want misconfiguration to fail fast.
    pub fn from_env() -> Self {
        Self {
            api_base_url: std::env::var("NOLEJ_API_BASE_URL")
                .unwrap_or_else(|_| "https://api-live.nolej.io".to_string()),
            api_key: std::env::var("NOLEJ_API_KEY").expect("NOLEJ_API_KEY must be set"),
            organisation_id: std::env::var("NOLEJ_ORGANISATION_ID")
                .unwrap_or_else(|_| "default".to_string()),
            public_base_url: std::env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            data_dir: std::env::var("DATA_DIR")
                .unwrap_or_else(|_| "./data".to_string())
                .into(),
            content_dir: std::env::var("CONTENT_DIR")
                .unwrap_or_else(|_| "./content".to_string())
                .into(),
        }
    }

    /// The callback URL registered with Nolej on document creation.
    pub fn webhook_url(&self) -> String {
        format!("{}/webhooks/nolej", self.public_base_url)
    }

    /// Public URL of a file in a document's workspace.
    pub fn file_url(&self, document_id: &str, filename: &str) -> String {
        format!("{}/files/{document_id}/{filename}", self.public_base_url)
    }
}
