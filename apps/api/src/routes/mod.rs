pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::enrichment::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/enrich", post(handlers::handle_enrich))
        .route(
            "/api/v1/enrich/suggestions",
            post(handlers::handle_suggestions),
        )
        .route("/api/v1/enrich/quality", post(handlers::handle_quality))
        .route(
            "/api/v1/enrich/quality/distribution",
            post(handlers::handle_quality_distribution),
        )
        .route("/api/v1/enrich/checklist", post(handlers::handle_checklist))
        .route("/api/v1/enrich/resources", post(handlers::handle_resources))
        .with_state(state)
}
