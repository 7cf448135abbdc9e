//! Application state.
//!
//! Shared state for all request handlers. Everything here is built once at
//! startup and only read afterwards.

use std::sync::Arc;

use rw_pages::{OrchestratorConfig, RenderOrchestrator};
use rw_site::Site;

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// Loaded site content.
    pub(crate) site: Arc<Site>,
    /// Page pipeline.
    pub(crate) orchestrator: Arc<RenderOrchestrator>,
    /// Application version for `ETag` computation.
    pub(crate) version: String,
}

impl AppState {
    /// Build state with the default markdown pipeline.
    pub(crate) fn new(site: Site, config: OrchestratorConfig, version: String) -> Self {
        Self {
            site: Arc::new(site),
            orchestrator: Arc::new(crate::default_orchestrator(config)),
            version,
        }
    }
}
