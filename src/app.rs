use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use axum::{Router, extract::DefaultBodyLimit};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::llm::{GenerativeModel, model_from_config};
use crate::routes::create_routes;

/// State shared by every handler. Holds no per-request data.
#[derive(Clone)]
pub struct AppState {
    pub model: Arc<dyn GenerativeModel>,
    pub static_dir: PathBuf,
}

impl AppState {
    pub fn new(model: Arc<dyn GenerativeModel>, static_dir: impl Into<PathBuf>) -> Self {
        Self {
            model,
            static_dir: static_dir.into(),
        }
    }
}

/// Initialize tracing and logging for the application
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nutrifit=info,tower_http=debug,axum::rejection=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Create and configure the Axum application with all routes and middleware
pub async fn create_app(config: &Config) -> Result<Router, anyhow::Error> {
    info!("Initializing application router");

    tokio::fs::create_dir_all(&config.static_dir)
        .await
        .with_context(|| format!("Cannot create static dir {}", config.static_dir.display()))?;

    if config.gemini.api_key.is_none() {
        tracing::warn!("GEMINI_API_KEY is not set; model calls will return errors");
    }
    let model = model_from_config(config)?;
    info!("Using {:?} model provider", config.provider);

    let state = AppState::new(model, config.static_dir.clone());
    Ok(build_router(state, config.max_upload_bytes))
}

/// Wires routes, static files and middleware around the given state
pub fn build_router(state: AppState, max_upload_bytes: usize) -> Router {
    let static_files = ServeDir::new(&state.static_dir);

    Router::new()
        .merge(create_routes())
        .nest_service("/static", static_files)
        .with_state(state)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
