use std::sync::Arc;

use nolej_client::NolejApi;
use nolej_core::workspace::DocumentWorkspace;
use nolej_importer::H5pStore;

use crate::config::{NolejConfig, ServerConfig};

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: nolej_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Nolej service and document store settings.
    pub nolej_config: Arc<NolejConfig>,
    /// Outbound Nolej API client (stubbed in tests).
    pub nolej: Arc<dyn NolejApi>,
    /// Host content store for imported H5P packages.
    pub h5p_store: Arc<dyn H5pStore>,
}

impl AppState {
    /// The on-disk workspace of one document.
    pub fn workspace(&self, document_id: &str) -> DocumentWorkspace {
        DocumentWorkspace::new(&self.nolej_config.data_dir, document_id)
    }
}
