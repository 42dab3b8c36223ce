//! HTTP gateway for TaskPilot.
//!
//! Exposes the chat WebSocket (`/ws/chat`), the task REST API
//! (`/api/tasks`), and a health check.
//!
//! Built on Axum.

pub mod chat_ws;
pub mod tasks_api;

use axum::http::{HeaderValue, Method, header};
use axum::{Router, response::Json, routing::get};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

use taskpilot_agent::AgentLoop;
use taskpilot_config::AppConfig;
use taskpilot_core::task::TaskStore;

/// Shared application state for the gateway.
///
/// Everything in here is read-only after startup; the store synchronizes
/// internally.
pub struct AppState {
    pub agent: Arc<AgentLoop>,
    pub store: Arc<dyn TaskStore>,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    /// Open the store and wire the provider, tools, and agent loop.
    pub async fn from_config(config: &AppConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let store = taskpilot_store::open(&config.store).await?;
        let tools = Arc::new(taskpilot_tools::default_registry(store.clone())?);

        let providers = taskpilot_providers::build_from_config(config);
        let provider = providers.default().ok_or_else(|| {
            format!("Provider '{}' is not configured", config.default_provider)
        })?;
        if !config.has_api_key() {
            warn!(provider = %config.default_provider, "No API key configured; model calls will fail");
        }

        let agent = Arc::new(AgentLoop::from_config(config, provider, tools));
        Ok(Self { agent, store })
    }
}

/// Build the Axum router with all gateway routes.
pub fn build_router(state: SharedState, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/ws/chat", get(chat_ws::ws_handler))
        .merge(tasks_api::tasks_router())
        .with_state(state)
        .layer(cors_layer(allowed_origins))
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// CORS restricted to the configured origins.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}

/// Start the gateway HTTP server.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let state = Arc::new(AppState::from_config(&config).await?);
    info!(
        store = state.store.name(),
        model = %config.default_model,
        "Agent ready"
    );

    let app = build_router(state, &config.gateway.allowed_origins);

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
