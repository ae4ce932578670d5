mod common;

use axum::http::{header, StatusCode};
use common::{body_json, TestApp};

#[tokio::test]
async fn test_register_login_me_flow() {
    let app = TestApp::spawn().await;

    // Register
    let response = app.register("alice", "alice@x.com", "pw123456").await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["username"], "alice");
    assert_eq!(body["email"], "alice@x.com");
    assert_eq!(body["is_active"], true);
    assert!(body["id"].as_i64().is_some());
    assert!(body.get("password_hash").is_none());

    // Login with username
    let token = app.login_token("alice", "pw123456").await;

    // Current user carries the default role
    let response = app.get("/api/v1/auth/me", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["username"], "alice");
    assert_eq!(body["roles"], serde_json::json!(["user"]));
}

#[tokio::test]
async fn test_login_works_with_email_identifier() {
    let app = TestApp::spawn().await;
    app.register("alice", "alice@x.com", "pw123456").await;

    let token = app.login_token("alice@x.com", "pw123456").await;

    let response = app.get("/api/v1/auth/me", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["username"], "alice");
}

#[tokio::test]
async fn test_me_requires_token() {
    let app = TestApp::spawn().await;

    let response = app.get("/api/v1/auth/me", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
        "Bearer"
    );
}

#[tokio::test]
async fn test_me_rejects_garbage_token() {
    let app = TestApp::spawn().await;

    let response = app.get("/api/v1/auth/me", Some("not-a-jwt")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_for_missing_user_is_rejected() {
    let app = TestApp::spawn().await;

    // Structurally valid token whose subject no longer exists
    let token = app
        .state
        .jwt
        .generate_access_token("ghost", "user")
        .unwrap();

    let response = app.get("/api/v1/auth/me", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
