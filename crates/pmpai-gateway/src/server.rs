//! HTTP server implementation using Axum.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use pmpai_core::config::PmpConfig;
use pmpai_core::traits::{AnswerComposer, DocumentRepository, Embedder, Summarizer, Tagger};
use pmpai_knowledge::mock::{ExtractiveSummarizer, KeywordTagger};
use pmpai_knowledge::{RetrievalEngine, SqliteKnowledgeStore};

/// Shared state for the gateway server.
pub struct AppState {
    pub config: PmpConfig,
    pub repo: Arc<dyn DocumentRepository>,
    pub engine: RetrievalEngine,
    pub summarizer: Arc<dyn Summarizer>,
    pub tagger: Arc<dyn Tagger>,
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Wire the full pipeline from config: store, embedder, composer,
    /// enrichment stubs, retrieval engine.
    pub fn from_config(config: PmpConfig, repo: Arc<dyn DocumentRepository>) -> anyhow::Result<Self> {
        let embedder = pmpai_providers::create_embedder(&config)?;
        let composer = pmpai_providers::create_composer(&config)?;
        tracing::info!(
            "Pipeline wired: embedder={}, composer={}",
            embedder.name(),
            composer.name()
        );
        let engine = RetrievalEngine::new(repo.clone(), embedder, composer, &config);
        Ok(Self {
            config,
            repo,
            engine,
            summarizer: Arc::new(ExtractiveSummarizer::default()),
            tagger: Arc::new(KeywordTagger::default()),
            start_time: std::time::Instant::now(),
        })
    }
}

/// Build the Axum router with all routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(super::routes::health_check))
        .route("/api/v1/health", get(super::routes::system_health))
        .route("/api/v1/extract", post(super::routes::extract_text))
        .route("/api/v1/documents", post(super::routes::upload_document))
        .route("/api/v1/documents", get(super::routes::list_documents))
        .route("/api/v1/documents/{id}", get(super::routes::get_document))
        .route(
            "/api/v1/documents/{id}",
            axum::routing::delete(super::routes::delete_document),
        )
        .route("/api/v1/vectorize", post(super::routes::vectorize))
        .route(
            "/api/v1/vectorize/batch",
            post(super::routes::vectorize_batch),
        )
        .route("/api/v1/search", post(super::routes::search_post))
        .route("/api/v1/search", get(super::routes::search_get))
        .route("/api/v1/qa", post(super::routes::qa))
        .layer(
            CorsLayer::new()
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::DELETE,
                ])
                .allow_headers(Any)
                .allow_origin(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn expand_path(p: &str) -> PathBuf {
    if let Some(rest) = p.strip_prefix("~/") {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(rest)
    } else {
        PathBuf::from(p)
    }
}

/// Start the HTTP server.
pub async fn start(config: PmpConfig) -> anyhow::Result<()> {
    let db_path = expand_path(&config.knowledge.db_path);
    let store = SqliteKnowledgeStore::open(&db_path)?;
    let repo: Arc<dyn DocumentRepository> = Arc::new(store);
    let (docs, chunks) = repo.stats()?;
    if docs > 0 {
        tracing::info!("Knowledge store: {docs} document(s), {chunks} chunk(s)");
    }

    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    let state = Arc::new(AppState::from_config(config, repo)?);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Gateway server listening on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}
