// src/server/mod.rs

//! HTTP server for the game frontend.
//!
//! - POST /guess - Ask the host a question about today's answer
//! - POST /process_data - Same handler, older route name
//! - GET /status - Health check

mod handlers;
pub mod session;
pub mod types;

use anyhow::Result;
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::game::Game;
use crate::llm::CompletionClient;

#[derive(Clone)]
pub struct AppState {
    pub game: Arc<Game>,
    pub completion: Arc<dyn CompletionClient>,
    /// Used when the request carries no key of its own.
    pub default_api_key: Option<String>,
    pub log_upstream_response: bool,
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    if origins.is_empty() {
        return base.allow_origin(Any);
    }

    // Credentialed CORS needs an explicit origin list
    let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    base.allow_origin(AllowOrigin::list(origins)).allow_credentials(true)
}

/// Create the router with all endpoints
pub fn create_router(state: AppState, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/guess", post(handlers::guess_handler))
        .route("/process_data", post(handlers::guess_handler))
        .route("/status", get(handlers::status_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_origins))
        .with_state(state)
}

/// Run the HTTP server until it fails.
pub async fn run(bind_address: &str, state: AppState, cors_origins: &[String]) -> Result<()> {
    let app = create_router(state, cors_origins);
    let listener = tokio::net::TcpListener::bind(bind_address).await?;

    info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
