use axum::{extract::State, Json};

use crate::{dtos::ErrorResponse, error::AppError, models::RoleResponse, AppState};

/// List all roles with their permissions (admin only)
#[utoipa::path(
    get,
    path = "/api/v1/auth/roles",
    responses(
        (status = 200, description = "All roles with permissions", body = [RoleResponse]),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse)
    ),
    tag = "Authentication",
    security(("bearer_auth" = []))
)]
pub async fn list_roles(State(state): State<AppState>) -> Result<Json<Vec<RoleResponse>>, AppError> {
    let roles = state.store.list_roles_with_permissions().await?;
    Ok(Json(roles.into_iter().map(RoleResponse::from).collect()))
}
