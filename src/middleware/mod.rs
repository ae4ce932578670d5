mod admin;
mod auth;

pub use admin::require_admin;
pub use auth::{auth_middleware, CurrentUser};
