//! Stored role and permission definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use backoffice_core::{PermissionId, RoleId};

/// A stored role: a named bundle of permission references.
///
/// Accounts reference roles by id, not by embedded value. Deleting a role
/// while accounts still reference it leaves dangling ids behind, which the
/// resolver drops at resolution time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDefinition {
    pub id: RoleId,
    pub name: String,
    pub permissions: Vec<PermissionId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A stored permission: an atomic named capability.
///
/// Never mutated except rename/re-description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionDefinition {
    pub id: PermissionId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
