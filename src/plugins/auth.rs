//! The auth module: routes, access-control layers, and seed data.

use async_trait::async_trait;
use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};

use crate::{error::AppError, handlers, middleware, plugins::Plugin, AppState};

pub struct AuthPlugin;

#[async_trait]
impl Plugin for AuthPlugin {
    fn name(&self) -> &'static str {
        "auth"
    }

    async fn initialize(&self, state: &AppState) -> Result<(), AppError> {
        state.auth.seed_default_roles_and_permissions().await?;
        state.auth.seed_admin(&state.config.bootstrap).await?;
        Ok(())
    }

    fn router(&self, state: &AppState) -> Router<AppState> {
        let admin_routes = Router::new()
            .route("/auth/roles", get(handlers::role::list_roles))
            .layer(from_fn(middleware::require_admin));

        Router::new()
            .route("/auth/register", post(handlers::auth::register))
            .route("/auth/login", post(handlers::auth::login))
            .merge(
                Router::new()
                    .route("/auth/me", get(handlers::user::get_me))
                    .merge(admin_routes)
                    .layer(from_fn_with_state(
                        state.clone(),
                        middleware::auth_middleware,
                    )),
            )
    }
}
