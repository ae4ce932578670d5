mod common;

use axum::http::StatusCode;
use common::{body_json, test_config, TestApp};

#[tokio::test]
async fn test_ai_health_reports_unavailable_by_default() {
    let app = TestApp::spawn().await;

    let response = app.get("/api/v1/ai/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "unavailable");

    let response = app.get("/", None).await;
    let body = body_json(response).await;
    assert_eq!(body["ai_available"], false);
}

#[tokio::test]
async fn test_ai_health_reports_healthy_when_enabled() {
    let mut config = test_config();
    config.modules.ai_enabled = true;

    let app = TestApp::spawn_with_config(config).await;

    let response = app.get("/api/v1/ai/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");

    let response = app.get("/", None).await;
    let body = body_json(response).await;
    assert_eq!(body["ai_available"], true);
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = TestApp::spawn().await;

    let response = app.get("/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "xerppy-api");
}
