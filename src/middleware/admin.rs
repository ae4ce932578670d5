use axum::{extract::Request, middleware::Next, response::Response};

use crate::{error::AppError, middleware::CurrentUser, models::ROLE_ADMIN};

/// Require an active caller holding the admin role.
///
/// Must be layered inside [`super::auth_middleware`], which resolves the
/// caller this check reads.
pub async fn require_admin(req: Request, next: Next) -> Result<Response, AppError> {
    let user = req.extensions().get::<CurrentUser>().ok_or_else(|| {
        AppError::InternalError(anyhow::anyhow!(
            "require_admin must run after auth_middleware"
        ))
    })?;

    if !user.0.user.is_active {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "User account is inactive"
        )));
    }

    if !user.0.has_role(ROLE_ADMIN) {
        tracing::warn!(
            username = %user.0.user.username,
            "Admin access denied"
        );
        return Err(AppError::Forbidden(anyhow::anyhow!("Admin access required")));
    }

    Ok(next.run(req).await)
}
