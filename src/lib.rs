pub mod config;
pub mod db;
pub mod dtos;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod plugins;
pub mod services;
pub mod utils;

use std::sync::Arc;

use axum::{routing::get, Json, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::config::{AppConfig, Environment, SwaggerMode};
use crate::error::AppError;
use crate::services::{AuthService, AuthStore, JwtService};

#[derive(OpenApi)]
#[openapi(
    paths(
        root,
        health_check,
        handlers::auth::register,
        handlers::auth::login,
        handlers::user::get_me,
        handlers::role::list_roles,
    ),
    components(
        schemas(
            dtos::auth::RegisterRequest,
            dtos::auth::LoginRequest,
            dtos::ErrorResponse,
            services::TokenResponse,
            models::UserResponse,
            models::UserWithRolesResponse,
            models::RoleResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "User registration, login, and role queries"),
        (name = "Observability", description = "Service health and monitoring"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub store: Arc<dyn AuthStore>,
    pub jwt: JwtService,
    pub auth: AuthService,
}

/// Run every registered plugin's startup hook (seeding, bootstrap).
pub async fn initialize_plugins(state: &AppState) -> Result<(), AppError> {
    for plugin in plugins::registered_plugins(&state.config) {
        tracing::info!(plugin = plugin.name(), "Initializing module");
        plugin.initialize(state).await?;
    }
    Ok(())
}

/// Build the application router from the registered plugins.
pub async fn build_router(state: AppState) -> Result<Router, AppError> {
    let mut api = Router::new();
    let mut ai_mounted = false;
    for plugin in plugins::registered_plugins(&state.config) {
        tracing::info!(plugin = plugin.name(), "Mounting module routes");
        if plugin.name() == "ai" {
            ai_mounted = true;
        }
        api = api.merge(plugin.router(&state));
    }
    if !ai_mounted {
        api = api.merge(plugins::ai::fallback_router());
    }

    let mut app = Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/api/v1", api);

    let swagger_enabled = match state.config.environment {
        Environment::Dev => true,
        Environment::Prod => state.config.swagger.enabled == SwaggerMode::Public,
    };

    if swagger_enabled {
        app = app.merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    }

    let app = app
        .with_state(state.clone())
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(
                    state
                        .config
                        .security
                        .allowed_origins
                        .iter()
                        .map(|o| {
                            o.parse::<axum::http::HeaderValue>().unwrap_or_else(|e| {
                                tracing::error!(
                                    "Invalid CORS origin '{}': {}. Using fallback.",
                                    o,
                                    e
                                );
                                axum::http::HeaderValue::from_static("*")
                            })
                        })
                        .collect::<Vec<axum::http::HeaderValue>>(),
                )
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers([
                    axum::http::header::AUTHORIZATION,
                    axum::http::header::CONTENT_TYPE,
                ]),
        );

    Ok(app)
}

/// Root endpoint - API health check
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service is reachable")
    ),
    tag = "Observability"
)]
pub async fn root(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "message": "Welcome to Xerppy API",
        "version": state.config.service_version,
        "ai_available": state.config.modules.ai_enabled,
    }))
}

/// Service health check
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy"),
        (status = 500, description = "Storage is unreachable")
    ),
    tag = "Observability"
)]
pub async fn health_check(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.store.health_check().await.map_err(|e| {
        tracing::error!(error = %e, "Storage health check failed");
        e
    })?;

    Ok(Json(serde_json::json!({
        "status": "healthy",
        "service": state.config.service_name,
        "version": state.config.service_version,
    })))
}
