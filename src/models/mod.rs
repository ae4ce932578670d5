pub mod role;
pub mod user;

pub use role::{Permission, Role, RoleResponse, RoleWithPermissions, ROLE_ADMIN, ROLE_USER};
pub use user::{NewUser, User, UserResponse, UserWithRoles, UserWithRolesResponse};
