//! User model and response shapes.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::models::role::{Role, ROLE_USER};

/// User entity as stored in the `users` table.
///
/// The password hash is opaque to everything outside the password utilities
/// and is never serialized into a response.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for a new user row.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// User with its role set and union permission set eagerly loaded.
///
/// Store lookups that feed authorization resolve roles and permissions in
/// the same call; there is no deferred relationship access anywhere.
#[derive(Debug, Clone)]
pub struct UserWithRoles {
    pub user: User,
    pub roles: Vec<Role>,
    pub permissions: Vec<String>,
}

impl UserWithRoles {
    pub fn has_role(&self, name: &str) -> bool {
        self.roles.iter().any(|r| r.name == name)
    }

    pub fn has_permission(&self, name: &str) -> bool {
        self.permissions.iter().any(|p| p == name)
    }

    /// First assigned role, or the default role name for role-less users.
    pub fn primary_role(&self) -> &str {
        self.roles.first().map(|r| r.name.as_str()).unwrap_or(ROLE_USER)
    }

    pub fn role_names(&self) -> Vec<String> {
        self.roles.iter().map(|r| r.name.clone()).collect()
    }
}

/// User response without roles, returned by registration.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    #[schema(example = "alice")]
    pub username: String,
    #[schema(example = "alice@example.com")]
    pub email: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            email: u.email,
            is_active: u.is_active,
            created_at: u.created_at,
        }
    }
}

/// User response including role names, returned by the current-user query.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserWithRolesResponse {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub is_active: bool,
    #[schema(example = json!(["user"]))]
    pub roles: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<UserWithRoles> for UserWithRolesResponse {
    fn from(u: UserWithRoles) -> Self {
        let roles = u.role_names();
        Self {
            id: u.user.id,
            username: u.user.username,
            email: u.user.email,
            is_active: u.user.is_active,
            roles,
            created_at: u.user.created_at,
        }
    }
}
