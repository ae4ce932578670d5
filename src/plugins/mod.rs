//! Explicit module registration.
//!
//! Feature modules implement [`Plugin`] and are composed from a fixed
//! registration list built once from configuration; nothing is discovered
//! at runtime.

pub mod ai;
mod auth;

use async_trait::async_trait;
use axum::Router;

use crate::{config::AppConfig, error::AppError, AppState};

#[async_trait]
pub trait Plugin: Send + Sync {
    fn name(&self) -> &'static str;

    /// One-time startup work (seeding, bootstrap accounts).
    async fn initialize(&self, state: &AppState) -> Result<(), AppError>;

    /// Routes mounted under `/api/v1`.
    fn router(&self, state: &AppState) -> Router<AppState>;
}

/// The registration list. The AI module's availability is a capability
/// resolved once at startup from configuration.
pub fn registered_plugins(config: &AppConfig) -> Vec<Box<dyn Plugin>> {
    let mut plugins: Vec<Box<dyn Plugin>> = vec![Box::new(auth::AuthPlugin)];
    if config.modules.ai_enabled {
        plugins.push(Box::new(ai::AiPlugin));
    }
    plugins
}
