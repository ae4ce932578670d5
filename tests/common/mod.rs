//! Test helpers building the application against the in-memory store.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request},
    response::Response,
};
use tower::util::ServiceExt;

use xerppy_api::{
    build_router,
    config::{
        AppConfig, BootstrapConfig, DatabaseConfig, Environment, JwtConfig, ModulesConfig,
        SecurityConfig, SwaggerConfig, SwaggerMode,
    },
    initialize_plugins,
    models::ROLE_ADMIN,
    services::{AuthService, AuthStore, JwtService, MemoryStore},
    AppState,
};

pub fn test_config() -> AppConfig {
    AppConfig {
        environment: Environment::Dev,
        service_name: "xerppy-api".to_string(),
        service_version: "test".to_string(),
        log_level: "error".to_string(),
        host: "127.0.0.1".to_string(),
        port: 8003,
        database: DatabaseConfig {
            url: "postgres://localhost/xerppy_test".to_string(),
            max_connections: 5,
            min_connections: 1,
        },
        jwt: JwtConfig {
            secret: "integration-test-secret".to_string(),
            algorithm: "HS256".to_string(),
            access_token_expiry_minutes: 30,
        },
        security: SecurityConfig {
            allowed_origins: vec!["http://localhost:5173".to_string()],
        },
        swagger: SwaggerConfig {
            enabled: SwaggerMode::Disabled,
        },
        modules: ModulesConfig { ai_enabled: false },
        bootstrap: BootstrapConfig {
            admin_username: "admin".to_string(),
            admin_email: "admin@xerppy.local".to_string(),
            admin_password: None,
        },
    }
}

/// Test application backed by the in-memory store.
pub struct TestApp {
    pub state: AppState,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with_config(test_config()).await
    }

    pub async fn spawn_with_config(config: AppConfig) -> Self {
        let store: Arc<dyn AuthStore> = Arc::new(MemoryStore::new());
        let jwt = JwtService::new(&config.jwt).expect("Failed to create JWT service");
        let auth = AuthService::new(store.clone(), jwt.clone());

        let state = AppState {
            config,
            store,
            jwt,
            auth,
        };

        initialize_plugins(&state)
            .await
            .expect("Plugin initialization failed");

        Self { state }
    }

    pub async fn request(&self, req: Request<Body>) -> Response {
        let app = build_router(self.state.clone())
            .await
            .expect("Failed to build router");
        app.oneshot(req).await.expect("Request failed")
    }

    pub async fn post_json(&self, uri: &str, body: serde_json::Value) -> Response {
        self.request(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn get(&self, uri: &str, bearer: Option<&str>) -> Response {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(token) = bearer {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.request(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn register(&self, username: &str, email: &str, password: &str) -> Response {
        self.post_json(
            "/api/v1/auth/register",
            serde_json::json!({
                "username": username,
                "email": email,
                "password": password,
            }),
        )
        .await
    }

    pub async fn login(&self, identifier: &str, password: &str) -> Response {
        self.post_json(
            "/api/v1/auth/login",
            serde_json::json!({
                "username_or_email": identifier,
                "password": password,
            }),
        )
        .await
    }

    /// Login and return the access token, asserting success.
    pub async fn login_token(&self, identifier: &str, password: &str) -> String {
        let response = self.login(identifier, password).await;
        assert_eq!(response.status(), axum::http::StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["token_type"], "bearer");
        body["access_token"].as_str().unwrap().to_string()
    }

    /// Attach the admin role to an existing user, bypassing the API.
    pub async fn make_admin(&self, username: &str) {
        let user = self
            .state
            .store
            .find_user_by_username(username)
            .await
            .unwrap()
            .expect("user should exist");
        let role = self
            .state
            .store
            .find_role_by_name(ROLE_ADMIN)
            .await
            .unwrap()
            .expect("admin role should be seeded");
        self.state
            .store
            .assign_role_to_user(user.user.id, role.id)
            .await
            .unwrap();
    }

    /// Flip a user's active flag, bypassing the API.
    pub async fn set_active(&self, username: &str, is_active: bool) {
        let mut user = self
            .state
            .store
            .find_user_by_username(username)
            .await
            .unwrap()
            .expect("user should exist")
            .user;
        user.is_active = is_active;
        self.state.store.update_user(&user).await.unwrap();
    }
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    serde_json::from_slice(&bytes).expect("Body was not valid JSON")
}
