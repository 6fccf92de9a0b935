//! Shared application state handed to every handler.

use std::sync::Arc;

use framegate_pipeline::Orchestrator;

use crate::config::ServerConfig;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub config: Arc<ServerConfig>,
    /// Largest upload the pipeline accepts; the router sizes its body
    /// limit from this so the policy lives in one place.
    pub max_upload_bytes: u64,
}
