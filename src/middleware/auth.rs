use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};

use crate::{error::AppError, models::UserWithRoles, AppState};

/// Resolved caller identity, inserted by [`auth_middleware`] and available
/// to downstream handlers for the rest of the request.
#[derive(Clone)]
pub struct CurrentUser(pub Arc<UserWithRoles>);

/// Require a valid bearer token and resolve the caller.
///
/// Token extraction, decoding, and subject resolution short-circuit in
/// order; every failure is a uniform 401 with a bearer challenge.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| {
            AppError::AuthError(anyhow::anyhow!("Missing or invalid Authorization header"))
        })?;

    let claims = state
        .jwt
        .decode_token(token)
        .ok_or_else(|| AppError::AuthError(anyhow::anyhow!("Invalid or expired token")))?;

    // The token may outlive the account it was minted for
    let user = state
        .store
        .find_user_by_username(&claims.sub)
        .await?
        .ok_or_else(|| AppError::AuthError(anyhow::anyhow!("User not found")))?;

    req.extensions_mut().insert(CurrentUser(Arc::new(user)));

    Ok(next.run(req).await)
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<CurrentUser>().cloned().ok_or_else(|| {
            AppError::InternalError(anyhow::anyhow!(
                "Caller identity missing from request extensions"
            ))
        })
    }
}
