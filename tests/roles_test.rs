mod common;

use axum::http::StatusCode;
use common::{body_json, TestApp};

#[tokio::test]
async fn test_role_listing_requires_admin() {
    let app = TestApp::spawn().await;
    app.register("alice", "alice@x.com", "pw123456").await;
    let token = app.login_token("alice", "pw123456").await;

    let response = app.get("/api/v1/auth/roles", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_role_listing_requires_a_token() {
    let app = TestApp::spawn().await;

    let response = app.get("/api/v1/auth/roles", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_sees_roles_with_permissions() {
    let app = TestApp::spawn().await;
    app.register("alice", "alice@x.com", "pw123456").await;
    app.make_admin("alice").await;
    let token = app.login_token("alice", "pw123456").await;

    let response = app.get("/api/v1/auth/roles", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;

    let roles = body.as_array().expect("roles should be an array");
    assert_eq!(roles.len(), 2);

    let admin = roles
        .iter()
        .find(|r| r["name"] == "admin")
        .expect("admin role should be listed");
    let mut permissions: Vec<&str> = admin["permissions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p.as_str().unwrap())
        .collect();
    permissions.sort_unstable();
    assert_eq!(
        permissions,
        vec![
            "roles.delete",
            "roles.read",
            "roles.write",
            "users.delete",
            "users.read",
            "users.write",
        ]
    );

    let user = roles
        .iter()
        .find(|r| r["name"] == "user")
        .expect("user role should be listed");
    assert_eq!(user["permissions"], serde_json::json!([]));
}

#[tokio::test]
async fn test_inactive_admin_is_blocked() {
    let app = TestApp::spawn().await;
    app.register("alice", "alice@x.com", "pw123456").await;
    app.make_admin("alice").await;
    let token = app.login_token("alice", "pw123456").await;

    // Deactivated after the token was minted: the gate re-checks the account
    app.set_active("alice", false).await;

    let response = app.get("/api/v1/auth/roles", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
