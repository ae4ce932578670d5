//! Optional AI module surface.
//!
//! The agent orchestration engine ships separately from this service; when
//! the module is disabled, [`fallback_router`] serves an availability
//! notice in place of the module's routes.

use async_trait::async_trait;
use axum::{routing::get, Json, Router};

use crate::{error::AppError, plugins::Plugin, AppState};

pub struct AiPlugin;

#[async_trait]
impl Plugin for AiPlugin {
    fn name(&self) -> &'static str {
        "ai"
    }

    async fn initialize(&self, _state: &AppState) -> Result<(), AppError> {
        Ok(())
    }

    fn router(&self, _state: &AppState) -> Router<AppState> {
        Router::new().route("/ai/health", get(ai_health))
    }
}

async fn ai_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "module": "ai",
    }))
}

/// Routes served when the AI module is not enabled.
pub fn fallback_router() -> Router<AppState> {
    Router::new().route("/ai/health", get(ai_unavailable))
}

async fn ai_unavailable() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "unavailable",
        "message": "AI module is not enabled for this deployment. Set AI_MODULE_ENABLED=true once the orchestration runtime is available.",
    }))
}
