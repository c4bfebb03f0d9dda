use std::sync::Arc;

use crate::enrichment::Enricher;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Owns the process-wide completion and search clients.
    pub enricher: Arc<Enricher>,
}
