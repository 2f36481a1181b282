//! Family Points Backend
//!
//! A small REST backend tracking points and completed tasks for family members,
//! persisted in SQLite.

mod api;
mod config;
mod db;
mod errors;
mod models;
mod service;

use std::sync::Arc;

use axum::{
    routing::{delete, get},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use db::Repository;
use service::MemberService;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: MemberService,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Family Points Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    if config.persist_on_fetch {
        tracing::info!("Fetching an unknown member will create it");
    }

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    let repo = Arc::new(Repository::new(pool));

    // Create application state
    let state = AppState {
        service: MemberService::new(repo, config.persist_on_fetch),
    };

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

    // Earlier clients address members under /points and delete via /reset
    let legacy_routes = Router::new()
        .route(
            "/points/{name}",
            get(api::get_member)
                .post(api::add_points)
                .put(api::set_points),
        )
        .route("/reset/{name}", delete(api::delete_member));

    Router::new()
        .route("/", get(api::home))
        .route("/leaderboard", get(api::leaderboard))
        .route(
            "/{name}",
            get(api::get_member)
                .post(api::add_points)
                .put(api::set_points),
        )
        .route("/{name}/delete", delete(api::delete_member))
        .merge(legacy_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
