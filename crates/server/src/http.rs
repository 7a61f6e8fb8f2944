//! HTTP Endpoints

use axum::{
    extract::{Json, State},
    http::{HeaderValue, Method},
    routing::get,
    Router,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use jinny_config::ModelDescriptor;

use crate::metrics::metrics_handler;
use crate::state::AppState;
use crate::websocket::ws_handler;

const DEV_ORIGIN: &str = "http://localhost:3000";

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let server = &state.config.server;
    let cors_layer = build_cors_layer(&server.cors_origins, server.cors_enabled);
    let static_files = ServeDir::new(&server.static_dir);

    Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(health_check))
        .route("/api/models", get(list_models))
        .route("/metrics", get(metrics_handler))
        // Browser client
        .fallback_service(static_files)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
}

/// Build CORS layer from configured origins
///
/// - If cors_enabled is false, returns a permissive layer
/// - If cors_origins is empty, allows only localhost:3000
fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled {
        tracing::warn!("CORS is disabled - allowing all origins");
        return CorsLayer::permissive();
    }

    let parsed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("Invalid CORS origin: {}", origin);
                None
            })
        })
        .collect();

    if parsed_origins.is_empty() {
        tracing::info!("No valid CORS origins configured, defaulting to {}", DEV_ORIGIN);
        return CorsLayer::new()
            .allow_origin(HeaderValue::from_static(DEV_ORIGIN))
            .allow_methods([Method::GET, Method::OPTIONS])
            .allow_headers(Any);
    }

    tracing::info!("CORS configured with {} origins", parsed_origins.len());
    CorsLayer::new()
        .allow_origin(parsed_origins)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any)
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    sessions: usize,
    models: usize,
}

/// Health check
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        sessions: state.store.len(),
        models: state.registry.descriptors().len(),
    })
}

#[derive(Debug, Serialize)]
struct ModelsResponse<'a> {
    default: &'a str,
    models: &'a [ModelDescriptor],
}

/// Catalog for the client's model selector
async fn list_models(State(state): State<AppState>) -> Json<serde_json::Value> {
    let registry = &state.registry;
    let body = ModelsResponse {
        default: &registry.default_descriptor().id,
        models: registry.descriptors(),
    };
    Json(serde_json::to_value(body).unwrap_or_default())
}
