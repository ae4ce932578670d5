pub mod auth;

use serde::Serialize;
use utoipa::ToSchema;

/// Error payload returned by failing endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "Incorrect username or password")]
    pub error: String,
}
