mod agent;
mod analysis;
mod auth;
mod config;
mod db;
mod errors;
mod llm_client;
mod models;
mod routes;
mod state;
mod storage;
#[cfg(test)]
mod testing;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::{create_pool, run_migrations};
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::{InMemoryResumeStore, PgResumeStore, ResumeStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume analysis API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize the Resume Store
    let store: Arc<dyn ResumeStore> = match &config.database_url {
        Some(url) => {
            let pool = create_pool(url).await?;
            run_migrations(&pool).await?;
            Arc::new(PgResumeStore::new(pool))
        }
        None => {
            warn!("DATABASE_URL not set, using the in-memory store (data is lost on restart)");
            let store = InMemoryResumeStore::new();
            match &config.seed_resumes_path {
                Some(path) => {
                    let json = tokio::fs::read_to_string(path)
                        .await
                        .with_context(|| format!("Failed to read seed resumes from {}", path.display()))?;
                    let count = store
                        .seed_from_json(&json)
                        .await
                        .with_context(|| format!("Invalid seed resumes in {}", path.display()))?;
                    info!("Seeded {count} resumes from {}", path.display());
                }
                None => warn!("SEED_RESUMES_PATH not set, the in-memory store starts empty"),
            }
            Arc::new(store)
        }
    };

    // Initialize the text-generation gateway
    let llm = LlmClient::new(&config.llm).context("Failed to build LLM client")?;
    info!("LLM client initialized (model: {})", llm.model());

    // Build app state; this also starts the analysis worker pool
    let state = AppState::new(config.clone(), store, Arc::new(llm));
    info!(
        "Analysis pool: {} workers, queue capacity {}",
        config.analysis.workers, config.analysis.queue_capacity
    );

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the frontend host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
