//! Team Building Backend
//!
//! Idea board with capacity-gated applications, plus debounced draft autosave
//! for the idea authoring form.

mod api;
mod config;
mod db;
mod drafts;
mod errors;
mod models;
mod sanitize;
mod store;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use db::KeyValueStore;
use drafts::{Autosaver, DraftStore};
use store::{IdeaStore, SequentialIds};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub ideas: Arc<RwLock<IdeaStore>>,
    pub drafts: Autosaver,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config, storage: KeyValueStore) -> Self {
        let drafts = Autosaver::new(
            DraftStore::new(storage, config.draft_key.clone()),
            config.autosave_delay,
        );

        Self {
            ideas: Arc::new(RwLock::new(IdeaStore::new(SequentialIds::from_clock()))),
            drafts,
            config: Arc::new(config),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Team Building Backend");
    tracing::info!("Draft database path: {:?}", config.db_path);
    tracing::info!("Autosave delay: {:?}", config.autosave_delay);
    tracing::info!("Bind address: {}", config.bind_addr);

    // Initialize draft storage
    let storage = if config.db_path.as_os_str() == db::IN_MEMORY_PATH {
        tracing::warn!("Draft storage is in memory; drafts will not survive a restart");
        KeyValueStore::Memory(db::MemoryStore::new())
    } else {
        KeyValueStore::Sqlite(db::init_database(&config.db_path).await?)
    };
    let state = AppState::new(config.clone(), storage);

    if state.drafts.recover().await.is_some() {
        tracing::info!("A saved draft is waiting for recovery");
    }

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Datastore
        .route("/datastore", get(api::get_datastore))
        // Ideas
        .route("/ideas", get(api::list_ideas).post(api::create_idea))
        .route("/ideas/{id}", get(api::get_idea).delete(api::delete_idea))
        .route("/ideas/{id}/parts", get(api::get_part_options))
        .route("/ideas/{id}/applications", post(api::apply_to_idea))
        // Draft
        .route(
            "/draft",
            get(api::get_draft)
                .put(api::save_draft)
                .delete(api::discard_draft),
        )
        .route("/draft/accept", post(api::accept_draft))
        .route("/draft/changes", post(api::record_draft_change))
        .route("/draft/events", post(api::draft_event))
        .route("/draft/submit", post(api::submit_draft));

    // Health check
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
