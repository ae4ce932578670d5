use axum::Json;

use crate::{
    dtos::ErrorResponse, error::AppError, middleware::CurrentUser, models::UserWithRolesResponse,
};

/// Get the current authenticated user
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "Current user with roles", body = UserWithRolesResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    tag = "Authentication",
    security(("bearer_auth" = []))
)]
pub async fn get_me(user: CurrentUser) -> Result<Json<UserWithRolesResponse>, AppError> {
    Ok(Json(UserWithRolesResponse::from((*user.0).clone())))
}
