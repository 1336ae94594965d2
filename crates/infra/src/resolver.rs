//! Role → permission expansion.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use backoffice_auth::{
    Permission, ResolvedRole, Role, RoleDefinition, RoleDirectory, StoreError,
};
use backoffice_core::RoleId;

use crate::store::{PermissionStore, RoleStore};

/// Expands role references into names plus granted permission names.
///
/// Used at issuance (login/registration) and by the enriched permissions
/// lookup. Missing roles are skipped, not fatal: accounts may reference
/// roles that have since been deleted. The same tolerance applies to
/// permission ids missing from a role.
pub struct RolePermissionResolver {
    roles: Arc<dyn RoleStore>,
    permissions: Arc<dyn PermissionStore>,
}

impl RolePermissionResolver {
    pub fn new(roles: Arc<dyn RoleStore>, permissions: Arc<dyn PermissionStore>) -> Self {
        Self { roles, permissions }
    }

    async fn expand(&self, role: RoleDefinition) -> Result<ResolvedRole, StoreError> {
        let mut names = Vec::with_capacity(role.permissions.len());
        for id in &role.permissions {
            match self.permissions.get(*id).await? {
                Some(permission) => names.push(Permission::new(permission.name)),
                None => warn!(
                    permission_id = %id,
                    role = %role.name,
                    "permission no longer exists; skipping"
                ),
            }
        }

        Ok(ResolvedRole {
            id: role.id,
            name: Role::new(role.name),
            permissions: names,
        })
    }
}

#[async_trait]
impl RoleDirectory for RolePermissionResolver {
    async fn find_by_name(&self, name: &str) -> Result<Option<ResolvedRole>, StoreError> {
        match self.roles.find_by_name(name).await? {
            Some(role) => Ok(Some(self.expand(role).await?)),
            None => Ok(None),
        }
    }

    async fn resolve(&self, refs: &[RoleId]) -> Result<Vec<ResolvedRole>, StoreError> {
        let mut resolved = Vec::with_capacity(refs.len());
        for id in refs {
            match self.roles.get(*id).await? {
                Some(role) => resolved.push(self.expand(role).await?),
                None => warn!(role_id = %id, "role no longer exists; skipping"),
            }
        }
        Ok(resolved)
    }
}
