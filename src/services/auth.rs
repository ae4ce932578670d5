//! Authorization service: registration, authentication, seeding, tokens.

use std::collections::HashSet;
use std::sync::Arc;

use crate::config::BootstrapConfig;
use crate::dtos::auth::RegisterRequest;
use crate::models::{NewUser, User, UserWithRoles, ROLE_ADMIN, ROLE_USER};
use crate::services::{AuthStore, JwtService, ServiceError, TokenResponse};
use crate::utils::{hash_password, verify_password, Password, PasswordHashString};

/// Roles created at initialization.
const DEFAULT_ROLES: &[(&str, &str)] = &[
    (ROLE_ADMIN, "Administrator with full access"),
    (ROLE_USER, "Regular user with basic access"),
];

/// Permissions created at initialization, `<resource>.<action>`.
const DEFAULT_PERMISSIONS: &[(&str, &str)] = &[
    ("users.read", "Read users"),
    ("users.write", "Create/Update users"),
    ("users.delete", "Delete users"),
    ("roles.read", "Read roles"),
    ("roles.write", "Create/Update roles"),
    ("roles.delete", "Delete roles"),
];

#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn AuthStore>,
    jwt: JwtService,
}

impl AuthService {
    pub fn new(store: Arc<dyn AuthStore>, jwt: JwtService) -> Self {
        Self { store, jwt }
    }

    /// Register a new user with the default role.
    pub async fn register(&self, req: RegisterRequest) -> Result<User, ServiceError> {
        self.register_with_role(req, ROLE_USER).await
    }

    /// Register a new user and attach the named role.
    ///
    /// Duplicates are checked up front so both conflicts report the field
    /// that collided; a concurrent insert losing the race at the constraint
    /// reports the same way. A missing role is not an error: the user is
    /// created role-less and a warning is logged.
    pub async fn register_with_role(
        &self,
        req: RegisterRequest,
        role_name: &str,
    ) -> Result<User, ServiceError> {
        if self
            .store
            .find_user_by_username(&req.username)
            .await?
            .is_some()
        {
            return Err(ServiceError::DuplicateUsername);
        }
        if self.store.find_user_by_email(&req.email).await?.is_some() {
            return Err(ServiceError::DuplicateEmail);
        }

        let password_hash = hash_password(&Password::new(req.password))?;

        let user = self
            .store
            .insert_user(NewUser {
                username: req.username,
                email: req.email,
                password_hash: password_hash.into_string(),
            })
            .await?;

        match self.store.find_role_by_name(role_name).await? {
            Some(role) => self.store.assign_role_to_user(user.id, role.id).await?,
            None => tracing::warn!(
                role = role_name,
                user_id = user.id,
                "Role missing at registration, user created without a role"
            ),
        }

        tracing::info!(user_id = user.id, username = %user.username, "User registered");
        Ok(user)
    }

    /// Authenticate by username or email.
    ///
    /// Returns `None` for unknown identifier and for a failed password check
    /// alike; only infrastructure failures produce an error.
    pub async fn authenticate(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<Option<UserWithRoles>, ServiceError> {
        let user = match self.store.find_user_by_username(identifier).await? {
            Some(user) => Some(user),
            None => self.store.find_user_by_email(identifier).await?,
        };

        let Some(user) = user else {
            return Ok(None);
        };

        let password = Password::new(password.to_string());
        let stored = PasswordHashString::new(user.user.password_hash.clone());
        if !verify_password(&password, &stored) {
            return Ok(None);
        }

        Ok(Some(user))
    }

    /// Issue an access token carrying the user's primary role.
    pub fn issue_token(&self, user: &UserWithRoles) -> Result<TokenResponse, ServiceError> {
        let token = self
            .jwt
            .generate_access_token(&user.user.username, user.primary_role())?;
        Ok(TokenResponse::new(token))
    }

    /// Seed the default roles and permissions.
    ///
    /// Safe to run any number of times: every insert is preceded by a name
    /// lookup, and the admin grant step only appends what is missing, so a
    /// partially-failed earlier run never causes duplicate errors here.
    pub async fn seed_default_roles_and_permissions(&self) -> Result<(), ServiceError> {
        for (name, description) in DEFAULT_PERMISSIONS {
            if self.store.find_permission_by_name(name).await?.is_none() {
                self.store.insert_permission(name, description).await?;
            }
        }

        for (name, description) in DEFAULT_ROLES {
            if self.store.find_role_by_name(name).await?.is_none() {
                self.store.insert_role(name, description).await?;
            }
        }

        // Admin ends up holding every seeded permission
        let Some(admin) = self.store.find_role_by_name(ROLE_ADMIN).await? else {
            return Ok(());
        };
        let existing: HashSet<i32> = self
            .store
            .role_permission_ids(admin.id)
            .await?
            .into_iter()
            .collect();
        for permission in self.store.list_permissions().await? {
            if !existing.contains(&permission.id) {
                self.store
                    .grant_permission_to_role(admin.id, permission.id)
                    .await?;
            }
        }

        Ok(())
    }

    /// Create the bootstrap admin account, only when no users exist yet and
    /// a bootstrap password is configured.
    pub async fn seed_admin(
        &self,
        bootstrap: &BootstrapConfig,
    ) -> Result<Option<User>, ServiceError> {
        let Some(password) = bootstrap.admin_password.as_deref() else {
            return Ok(None);
        };

        if self.store.count_users().await? > 0 {
            return Ok(None);
        }

        let user = self
            .register_with_role(
                RegisterRequest {
                    username: bootstrap.admin_username.clone(),
                    email: bootstrap.admin_email.clone(),
                    password: password.to_string(),
                },
                ROLE_ADMIN,
            )
            .await?;

        tracing::info!(username = %user.username, "Bootstrap admin account created");
        Ok(Some(user))
    }
}
