//! Role and permission models with their response shapes.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

/// Role granted full access to the admin surface.
pub const ROLE_ADMIN: &str = "admin";
/// Default role assigned at registration.
pub const ROLE_USER: &str = "user";

/// Role entity as stored in the `roles` table.
#[derive(Debug, Clone, FromRow)]
pub struct Role {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Permission entity as stored in the `permissions` table.
///
/// Names follow the `<resource>.<action>` convention, e.g. `users.read`.
#[derive(Debug, Clone, FromRow)]
pub struct Permission {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Role with its granted permission names loaded.
#[derive(Debug, Clone)]
pub struct RoleWithPermissions {
    pub role: Role,
    pub permissions: Vec<String>,
}

/// Role response for the admin listing.
#[derive(Debug, Serialize, ToSchema)]
pub struct RoleResponse {
    pub id: i32,
    #[schema(example = "admin")]
    pub name: String,
    pub description: Option<String>,
    #[schema(example = json!(["users.read", "roles.read"]))]
    pub permissions: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<RoleWithPermissions> for RoleResponse {
    fn from(r: RoleWithPermissions) -> Self {
        Self {
            id: r.role.id,
            name: r.role.name,
            description: r.role.description,
            permissions: r.permissions,
            created_at: r.role.created_at,
        }
    }
}
