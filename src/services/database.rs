//! PostgreSQL store backed by sqlx.
//!
//! Queries are runtime-bound; uniqueness races are mapped from the
//! database's constraint errors so concurrent registrations surface as
//! duplicate errors instead of opaque 500s.

use async_trait::async_trait;
use sqlx::postgres::PgPool;

use crate::models::{NewUser, Permission, Role, RoleWithPermissions, User, UserWithRoles};
use crate::services::{AuthStore, ServiceError};

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database wrapper from a connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn load_roles(&self, user: User) -> Result<UserWithRoles, ServiceError> {
        let roles = sqlx::query_as::<_, Role>(
            r#"
            SELECT r.* FROM roles r
            JOIN user_roles ur ON ur.role_id = r.id
            WHERE ur.user_id = $1
            ORDER BY r.id
            "#,
        )
        .bind(user.id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        let permissions = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT p.name FROM permissions p
            JOIN role_permissions rp ON rp.permission_id = p.id
            JOIN user_roles ur ON ur.role_id = rp.role_id
            WHERE ur.user_id = $1
            ORDER BY p.name
            "#,
        )
        .bind(user.id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(UserWithRoles {
            user,
            roles,
            permissions,
        })
    }
}

fn db_err(err: sqlx::Error) -> ServiceError {
    ServiceError::Database(anyhow::Error::new(err))
}

/// Map unique-constraint violations on the user identity columns to their
/// domain errors; everything else stays an opaque database error.
fn map_user_unique_violation(err: sqlx::Error) -> ServiceError {
    if let sqlx::Error::Database(ref db) = err {
        if db.is_unique_violation() {
            match db.constraint() {
                Some(c) if c.contains("username") => return ServiceError::DuplicateUsername,
                Some(c) if c.contains("email") => return ServiceError::DuplicateEmail,
                _ => {}
            }
        }
    }
    db_err(err)
}

#[async_trait]
impl AuthStore for Database {
    async fn health_check(&self) -> Result<(), ServiceError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Database health check failed: {}", e);
                db_err(e)
            })?;
        Ok(())
    }

    async fn find_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserWithRoles>, ServiceError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        match user {
            Some(user) => Ok(Some(self.load_roles(user).await?)),
            None => Ok(None),
        }
    }

    async fn find_user_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserWithRoles>, ServiceError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        match user {
            Some(user) => Ok(Some(self.load_roles(user).await?)),
            None => Ok(None),
        }
    }

    async fn find_user_by_id(&self, id: i32) -> Result<Option<User>, ServiceError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, ServiceError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(map_user_unique_violation)
    }

    async fn update_user(&self, user: &User) -> Result<User, ServiceError> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET username = $2, email = $3, password_hash = $4, is_active = $5,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => ServiceError::NotFound("User"),
            other => map_user_unique_violation(other),
        })
    }

    async fn count_users(&self) -> Result<i64, ServiceError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)
    }

    async fn find_role_by_name(&self, name: &str) -> Result<Option<Role>, ServiceError> {
        sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)
    }

    async fn insert_role(&self, name: &str, description: &str) -> Result<Role, ServiceError> {
        sqlx::query_as::<_, Role>(
            r#"
            INSERT INTO roles (name, description)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(description)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)
    }

    async fn list_roles_with_permissions(
        &self,
    ) -> Result<Vec<RoleWithPermissions>, ServiceError> {
        let roles = sqlx::query_as::<_, Role>("SELECT * FROM roles ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        let mut result = Vec::with_capacity(roles.len());
        for role in roles {
            let permissions = sqlx::query_scalar::<_, String>(
                r#"
                SELECT p.name FROM permissions p
                JOIN role_permissions rp ON rp.permission_id = p.id
                WHERE rp.role_id = $1
                ORDER BY p.name
                "#,
            )
            .bind(role.id)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

            result.push(RoleWithPermissions { role, permissions });
        }

        Ok(result)
    }

    async fn find_permission_by_name(
        &self,
        name: &str,
    ) -> Result<Option<Permission>, ServiceError> {
        sqlx::query_as::<_, Permission>("SELECT * FROM permissions WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)
    }

    async fn insert_permission(
        &self,
        name: &str,
        description: &str,
    ) -> Result<Permission, ServiceError> {
        sqlx::query_as::<_, Permission>(
            r#"
            INSERT INTO permissions (name, description)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(description)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)
    }

    async fn list_permissions(&self) -> Result<Vec<Permission>, ServiceError> {
        sqlx::query_as::<_, Permission>("SELECT * FROM permissions ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)
    }

    async fn assign_role_to_user(&self, user_id: i32, role_id: i32) -> Result<(), ServiceError> {
        sqlx::query(
            r#"
            INSERT INTO user_roles (user_id, role_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(role_id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn role_permission_ids(&self, role_id: i32) -> Result<Vec<i32>, ServiceError> {
        sqlx::query_scalar::<_, i32>(
            "SELECT permission_id FROM role_permissions WHERE role_id = $1",
        )
        .bind(role_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)
    }

    async fn grant_permission_to_role(
        &self,
        role_id: i32,
        permission_id: i32,
    ) -> Result<(), ServiceError> {
        sqlx::query(
            r#"
            INSERT INTO role_permissions (role_id, permission_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(role_id)
        .bind(permission_id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }
}
