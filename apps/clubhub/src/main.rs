mod chat;
mod config;
mod corpus;
mod db;
mod directory;
mod errors;
mod llm_client;
mod models;
mod reviews;
mod routes;
mod state;

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::corpus::ClubCorpus;
use crate::db::{create_pool, ensure_schema};
use crate::llm_client::LlmClient;
use crate::reviews::{MemoryReviewStore, PgReviewStore, ReviewStore};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ClubHub API v{}", env!("CARGO_PKG_VERSION"));

    // Load the club corpus once; it is never written after this point
    let corpus = ClubCorpus::load(
        Path::new(&config.club_data_path),
        config.club_list_path.as_deref().map(Path::new),
    )?;
    if corpus.is_empty() {
        warn!("Club corpus is empty; the assistant will not be able to ground answers");
    }

    // Initialize review storage
    let reviews: Arc<dyn ReviewStore> = match &config.database_url {
        Some(url) => {
            let pool = create_pool(url).await?;
            ensure_schema(&pool).await?;
            Arc::new(PgReviewStore::new(pool))
        }
        None => {
            info!("DATABASE_URL not set; reviews are kept in memory");
            Arc::new(MemoryReviewStore::new())
        }
    };

    // Initialize LLM client
    let llm = LlmClient::new(config.gemini_api_key.clone(), config.gemini_api_base.clone())?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);
    info!(
        "Grounding failure policy: {:?}",
        config.grounding_failure_policy
    );

    // Build app state
    let state = AppState {
        corpus: Arc::new(corpus),
        llm: Arc::new(llm),
        reviews,
        grounding_failure_policy: config.grounding_failure_policy,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict to the frontend origin once it has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
