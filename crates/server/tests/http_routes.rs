//! Router-level tests for the HTTP endpoints

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use jinny_config::constants::DEFAULT_MODEL_ID;
use jinny_config::Settings;
use jinny_llm::CompletionGateway;
use jinny_server::{create_router, AppState};

fn app() -> axum::Router {
    let state = AppState::with_gateway(Settings::default(), CompletionGateway::new()).unwrap();
    create_router(state)
}

async fn get_json(uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_health() {
    let (status, body) = get_json("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["sessions"], 0);
    assert_eq!(body["models"], 7);
}

#[tokio::test]
async fn test_models_listing() {
    let (status, body) = get_json("/api/models").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["default"], DEFAULT_MODEL_ID);

    let models = body["models"].as_array().unwrap();
    assert_eq!(models.len(), 7);
    assert!(models
        .iter()
        .any(|m| m["id"] == "gpt-4" && m["provider"] == "openai" && m["max_tokens"] == 4000));
}

#[tokio::test]
async fn test_invalid_settings_rejected() {
    let mut settings = Settings::default();
    settings.default_model = "not-in-catalog".to_string();
    assert!(AppState::with_gateway(settings, CompletionGateway::new()).is_err());
}
