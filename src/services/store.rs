//! Storage seam for users, roles, and permissions.
//!
//! [`AuthStore`] is the explicit contract both web-facing services and the
//! CLI program consume. The production implementation is
//! [`super::Database`]; [`MemoryStore`] backs tests and local experiments
//! without a running database.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::models::{NewUser, Permission, Role, RoleWithPermissions, User, UserWithRoles};
use crate::services::ServiceError;

#[async_trait]
pub trait AuthStore: Send + Sync {
    /// Liveness probe against the backing storage.
    async fn health_check(&self) -> Result<(), ServiceError>;

    // ==================== User Operations ====================

    /// Find a user by username with roles and permissions eagerly loaded.
    async fn find_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserWithRoles>, ServiceError>;

    /// Find a user by email with roles and permissions eagerly loaded.
    async fn find_user_by_email(&self, email: &str)
        -> Result<Option<UserWithRoles>, ServiceError>;

    async fn find_user_by_id(&self, id: i32) -> Result<Option<User>, ServiceError>;

    /// Insert a new user. Username/email collisions surface as
    /// `DuplicateUsername` / `DuplicateEmail`, including when a concurrent
    /// insert wins the race at the uniqueness constraint.
    async fn insert_user(&self, user: NewUser) -> Result<User, ServiceError>;

    /// Update an existing user row, with the same duplicate mapping as
    /// `insert_user`.
    async fn update_user(&self, user: &User) -> Result<User, ServiceError>;

    async fn count_users(&self) -> Result<i64, ServiceError>;

    // ==================== Role Operations ====================

    async fn find_role_by_name(&self, name: &str) -> Result<Option<Role>, ServiceError>;

    async fn insert_role(&self, name: &str, description: &str) -> Result<Role, ServiceError>;

    async fn list_roles_with_permissions(
        &self,
    ) -> Result<Vec<RoleWithPermissions>, ServiceError>;

    // ==================== Permission Operations ====================

    async fn find_permission_by_name(
        &self,
        name: &str,
    ) -> Result<Option<Permission>, ServiceError>;

    async fn insert_permission(
        &self,
        name: &str,
        description: &str,
    ) -> Result<Permission, ServiceError>;

    async fn list_permissions(&self) -> Result<Vec<Permission>, ServiceError>;

    // ==================== Association Operations ====================

    /// Link a user to a role. Idempotent.
    async fn assign_role_to_user(&self, user_id: i32, role_id: i32) -> Result<(), ServiceError>;

    /// Permission ids currently granted to a role.
    async fn role_permission_ids(&self, role_id: i32) -> Result<Vec<i32>, ServiceError>;

    /// Grant a permission to a role. Idempotent.
    async fn grant_permission_to_role(
        &self,
        role_id: i32,
        permission_id: i32,
    ) -> Result<(), ServiceError>;
}

/// In-process store mirroring the Postgres implementation's constraint
/// behavior, used by tests.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    roles: Vec<Role>,
    permissions: Vec<Permission>,
    user_roles: Vec<(i32, i32)>,
    role_permissions: Vec<(i32, i32)>,
    next_user_id: i32,
    next_role_id: i32,
    next_permission_id: i32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Inner {
    fn user_with_roles(&self, user: &User) -> UserWithRoles {
        let roles: Vec<Role> = self
            .user_roles
            .iter()
            .filter(|(uid, _)| *uid == user.id)
            .filter_map(|(_, rid)| self.roles.iter().find(|r| r.id == *rid).cloned())
            .collect();

        let mut permissions: Vec<String> = Vec::new();
        for role in &roles {
            for (rid, pid) in &self.role_permissions {
                if *rid == role.id {
                    if let Some(perm) = self.permissions.iter().find(|p| p.id == *pid) {
                        if !permissions.contains(&perm.name) {
                            permissions.push(perm.name.clone());
                        }
                    }
                }
            }
        }

        UserWithRoles {
            user: user.clone(),
            roles,
            permissions,
        }
    }

    fn role_permission_names(&self, role_id: i32) -> Vec<String> {
        self.role_permissions
            .iter()
            .filter(|(rid, _)| *rid == role_id)
            .filter_map(|(_, pid)| {
                self.permissions
                    .iter()
                    .find(|p| p.id == *pid)
                    .map(|p| p.name.clone())
            })
            .collect()
    }
}

#[async_trait]
impl AuthStore for MemoryStore {
    async fn health_check(&self) -> Result<(), ServiceError> {
        Ok(())
    }

    async fn find_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserWithRoles>, ServiceError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .users
            .iter()
            .find(|u| u.username == username)
            .map(|u| inner.user_with_roles(u)))
    }

    async fn find_user_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserWithRoles>, ServiceError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .users
            .iter()
            .find(|u| u.email == email)
            .map(|u| inner.user_with_roles(u)))
    }

    async fn find_user_by_id(&self, id: i32) -> Result<Option<User>, ServiceError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.iter().find(|u| u.id == id).cloned())
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, ServiceError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.users.iter().any(|u| u.username == user.username) {
            return Err(ServiceError::DuplicateUsername);
        }
        if inner.users.iter().any(|u| u.email == user.email) {
            return Err(ServiceError::DuplicateEmail);
        }

        inner.next_user_id += 1;
        let now = Utc::now();
        let user = User {
            id: inner.next_user_id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        inner.users.push(user.clone());
        Ok(user)
    }

    async fn update_user(&self, user: &User) -> Result<User, ServiceError> {
        let mut inner = self.inner.lock().unwrap();
        if inner
            .users
            .iter()
            .any(|u| u.id != user.id && u.username == user.username)
        {
            return Err(ServiceError::DuplicateUsername);
        }
        if inner
            .users
            .iter()
            .any(|u| u.id != user.id && u.email == user.email)
        {
            return Err(ServiceError::DuplicateEmail);
        }

        let existing = inner
            .users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or(ServiceError::NotFound("User"))?;
        let mut updated = user.clone();
        updated.updated_at = Utc::now();
        *existing = updated.clone();
        Ok(updated)
    }

    async fn count_users(&self) -> Result<i64, ServiceError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.len() as i64)
    }

    async fn find_role_by_name(&self, name: &str) -> Result<Option<Role>, ServiceError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.roles.iter().find(|r| r.name == name).cloned())
    }

    async fn insert_role(&self, name: &str, description: &str) -> Result<Role, ServiceError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.roles.iter().any(|r| r.name == name) {
            return Err(ServiceError::Database(anyhow::anyhow!(
                "unique constraint violation on roles.name"
            )));
        }

        inner.next_role_id += 1;
        let now = Utc::now();
        let role = Role {
            id: inner.next_role_id,
            name: name.to_string(),
            description: Some(description.to_string()),
            created_at: now,
            updated_at: now,
        };
        inner.roles.push(role.clone());
        Ok(role)
    }

    async fn list_roles_with_permissions(
        &self,
    ) -> Result<Vec<RoleWithPermissions>, ServiceError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .roles
            .iter()
            .map(|role| RoleWithPermissions {
                role: role.clone(),
                permissions: inner.role_permission_names(role.id),
            })
            .collect())
    }

    async fn find_permission_by_name(
        &self,
        name: &str,
    ) -> Result<Option<Permission>, ServiceError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.permissions.iter().find(|p| p.name == name).cloned())
    }

    async fn insert_permission(
        &self,
        name: &str,
        description: &str,
    ) -> Result<Permission, ServiceError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.permissions.iter().any(|p| p.name == name) {
            return Err(ServiceError::Database(anyhow::anyhow!(
                "unique constraint violation on permissions.name"
            )));
        }

        inner.next_permission_id += 1;
        let now = Utc::now();
        let permission = Permission {
            id: inner.next_permission_id,
            name: name.to_string(),
            description: Some(description.to_string()),
            created_at: now,
            updated_at: now,
        };
        inner.permissions.push(permission.clone());
        Ok(permission)
    }

    async fn list_permissions(&self) -> Result<Vec<Permission>, ServiceError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.permissions.clone())
    }

    async fn assign_role_to_user(&self, user_id: i32, role_id: i32) -> Result<(), ServiceError> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.user_roles.contains(&(user_id, role_id)) {
            inner.user_roles.push((user_id, role_id));
        }
        Ok(())
    }

    async fn role_permission_ids(&self, role_id: i32) -> Result<Vec<i32>, ServiceError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .role_permissions
            .iter()
            .filter(|(rid, _)| *rid == role_id)
            .map(|(_, pid)| *pid)
            .collect())
    }

    async fn grant_permission_to_role(
        &self,
        role_id: i32,
        permission_id: i32,
    ) -> Result<(), ServiceError> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.role_permissions.contains(&(role_id, permission_id)) {
            inner.role_permissions.push((role_id, permission_id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: "$2b$12$hash".to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_user_rejects_duplicates() {
        let store = MemoryStore::new();
        store.insert_user(new_user("alice", "alice@x.com")).await.unwrap();

        let err = store
            .insert_user(new_user("alice", "other@x.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::DuplicateUsername));

        let err = store
            .insert_user(new_user("bob", "alice@x.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::DuplicateEmail));
    }

    #[tokio::test]
    async fn test_update_user_rejects_taken_identity() {
        let store = MemoryStore::new();
        store.insert_user(new_user("alice", "alice@x.com")).await.unwrap();
        let bob = store.insert_user(new_user("bob", "bob@x.com")).await.unwrap();

        let mut update = bob.clone();
        update.email = "alice@x.com".to_string();
        let err = store.update_user(&update).await.unwrap_err();
        assert!(matches!(err, ServiceError::DuplicateEmail));

        // Updating a row against its own identity is fine
        let mut update = bob.clone();
        update.is_active = false;
        let updated = store.update_user(&update).await.unwrap();
        assert!(!updated.is_active);
        assert!(!store.find_user_by_id(bob.id).await.unwrap().unwrap().is_active);
    }

    #[tokio::test]
    async fn test_lookups_load_roles_and_permissions() {
        let store = MemoryStore::new();
        let user = store.insert_user(new_user("alice", "alice@x.com")).await.unwrap();
        let role = store.insert_role("auditor", "Read-only access").await.unwrap();
        let perm = store.insert_permission("users.read", "Read users").await.unwrap();

        store.grant_permission_to_role(role.id, perm.id).await.unwrap();
        store.assign_role_to_user(user.id, role.id).await.unwrap();

        let loaded = store
            .find_user_by_username("alice")
            .await
            .unwrap()
            .expect("user should exist");
        assert_eq!(loaded.role_names(), vec!["auditor"]);
        assert!(loaded.has_permission("users.read"));
        assert!(!loaded.has_permission("users.delete"));

        let by_email = store
            .find_user_by_email("alice@x.com")
            .await
            .unwrap()
            .expect("user should exist");
        assert_eq!(by_email.user.id, loaded.user.id);
        assert_eq!(by_email.role_names(), loaded.role_names());
    }

    #[tokio::test]
    async fn test_associations_are_idempotent() {
        let store = MemoryStore::new();
        let user = store.insert_user(new_user("alice", "alice@x.com")).await.unwrap();
        let role = store.insert_role("auditor", "Read-only access").await.unwrap();
        let perm = store.insert_permission("users.read", "Read users").await.unwrap();

        store.assign_role_to_user(user.id, role.id).await.unwrap();
        store.assign_role_to_user(user.id, role.id).await.unwrap();
        store.grant_permission_to_role(role.id, perm.id).await.unwrap();
        store.grant_permission_to_role(role.id, perm.id).await.unwrap();

        let loaded = store.find_user_by_username("alice").await.unwrap().unwrap();
        assert_eq!(loaded.roles.len(), 1);
        assert_eq!(store.role_permission_ids(role.id).await.unwrap(), vec![perm.id]);
    }
}
