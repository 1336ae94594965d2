//! Request/response DTOs and JSON mapping helpers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use backoffice_auth::{Account, PermissionDefinition};
use backoffice_core::{AccountId, PermissionId, RoleId};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Username or email.
    pub identifier: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    /// Role names; validated against the role collection, all-or-nothing.
    pub roles: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct CreateRoleRequest {
    pub name: String,
    /// Permission ids granted by this role.
    pub permissions: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub name: Option<String>,
    pub permissions: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePermissionRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePermissionRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Clone, Serialize)]
pub struct PermissionResponse {
    pub id: PermissionId,
    pub name: String,
    pub description: Option<String>,
}

impl From<PermissionDefinition> for PermissionResponse {
    fn from(definition: PermissionDefinition) -> Self {
        Self {
            id: definition.id,
            name: definition.name,
            description: definition.description,
        }
    }
}

/// Role with its permission references expanded.
#[derive(Debug, Clone, Serialize)]
pub struct RoleResponse {
    pub id: RoleId,
    pub name: String,
    pub permissions: Vec<PermissionResponse>,
}

/// Account with roles (and their permissions) expanded.
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: AccountId,
    pub username: String,
    pub email: String,
    pub roles: Vec<RoleResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserResponse {
    pub fn from_account(account: &Account, roles: Vec<RoleResponse>) -> Self {
        Self {
            id: account.id,
            username: account.username.clone(),
            email: account.email.clone(),
            roles,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}
