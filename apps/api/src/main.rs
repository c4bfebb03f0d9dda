mod config;
mod enrichment;
mod errors;
mod llm_client;
mod routes;
mod search_client;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::enrichment::Enricher;
use crate::llm_client::CompletionClient;
use crate::routes::build_router;
use crate::search_client::SearchClient;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing provider keys)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting SOP Enrichment API v{}", env!("CARGO_PKG_VERSION"));

    // One completion client and one search client for the whole process
    let completion = CompletionClient::new(
        config.completion_api_url.clone(),
        config.openai_api_key.clone(),
        config.completion_model.clone(),
        config.upstream_timeout,
    )?;
    info!("Completion client initialized (model: {})", completion.model());

    let search = SearchClient::new(
        config.search_api_url.clone(),
        config.serp_api_key.clone(),
        config.upstream_timeout,
    )?;
    info!(
        "Search client initialized ({} results, {}/{})",
        config.search_options.result_count,
        config.search_options.language,
        config.search_options.country
    );

    let enricher = Enricher::new(
        Arc::new(completion),
        Arc::new(search),
        config.search_options.clone(),
    );

    let state = AppState {
        enricher: Arc::new(enricher),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins to the document UI host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
