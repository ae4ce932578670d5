use thiserror::Error;

use crate::error::AppError;

/// Domain error taxonomy for the auth services.
///
/// Infrastructure failures are carried opaquely in `Database`/`Internal`
/// and surface as 500s; everything else is a client-visible outcome.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Username already registered")]
    DuplicateUsername,

    #[error("Email already registered")]
    DuplicateEmail,

    #[error("Incorrect username or password")]
    InvalidCredentials,

    #[error("User account is inactive")]
    InactiveAccount,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Database error: {0}")]
    Database(#[source] anyhow::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::DuplicateUsername => {
                AppError::BadRequest(anyhow::anyhow!("Username already registered"))
            }
            ServiceError::DuplicateEmail => {
                AppError::BadRequest(anyhow::anyhow!("Email already registered"))
            }
            ServiceError::InvalidCredentials => {
                AppError::AuthError(anyhow::anyhow!("Incorrect username or password"))
            }
            ServiceError::InactiveAccount => {
                AppError::BadRequest(anyhow::anyhow!("User account is inactive"))
            }
            ServiceError::NotFound(what) => AppError::NotFound(anyhow::anyhow!("{} not found", what)),
            ServiceError::Database(e) => AppError::DatabaseError(e),
            ServiceError::Internal(e) => AppError::InternalError(e),
        }
    }
}
