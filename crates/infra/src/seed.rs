//! Default RBAC dataset for a fresh deployment.

use chrono::Utc;

use backoffice_auth::{PermissionDefinition, RoleDefinition, StoreError};
use backoffice_core::{PermissionId, RoleId};

use crate::store::{PermissionStore, RoleStore};

/// Role → granted permissions table.
///
/// `super_admin` guards the user/role/permission administration routes; the
/// per-collection admin and publisher roles guard the catalog routes.
const DEFAULT_ROLES: &[(&str, &[&str])] = &[
    (
        "super_admin",
        &[
            "users.manage",
            "roles.manage",
            "permissions.manage",
            "assets.read",
            "assets.write",
            "assets.publish",
            "services.read",
            "services.write",
            "services.publish",
        ],
    ),
    (
        "admin",
        &[
            "assets.read",
            "assets.write",
            "services.read",
            "services.write",
        ],
    ),
    ("viewer", &["assets.read", "services.read"]),
    ("asset_admin", &["assets.read", "assets.write", "assets.publish"]),
    (
        "service_admin",
        &["services.read", "services.write", "services.publish"],
    ),
    ("asset_publisher", &["assets.read", "assets.publish"]),
    ("service_publisher", &["services.read", "services.publish"]),
];

/// Seed the default roles and permissions.
///
/// Idempotent: names that already exist are left untouched, so this is safe
/// to run on every startup.
pub async fn seed_default_rbac(
    roles: &dyn RoleStore,
    permissions: &dyn PermissionStore,
) -> Result<(), StoreError> {
    let now = Utc::now();

    for (role_name, permission_names) in DEFAULT_ROLES {
        let mut refs = Vec::with_capacity(permission_names.len());
        for name in *permission_names {
            let id = match permissions.find_by_name(name).await? {
                Some(existing) => existing.id,
                None => {
                    let definition = PermissionDefinition {
                        id: PermissionId::new(),
                        name: (*name).to_string(),
                        description: Some(describe(name)),
                        created_at: now,
                        updated_at: now,
                    };
                    let id = definition.id;
                    permissions.insert(definition).await?;
                    id
                }
            };
            refs.push(id);
        }

        if roles.find_by_name(role_name).await?.is_none() {
            roles
                .insert(RoleDefinition {
                    id: RoleId::new(),
                    name: (*role_name).to_string(),
                    permissions: refs,
                    created_at: now,
                    updated_at: now,
                })
                .await?;
        }
    }

    Ok(())
}

fn describe(permission: &str) -> String {
    match permission.rsplit_once('.') {
        Some((resource, action)) => format!("{action} access to {resource}"),
        None => permission.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::{MemoryPermissionStore, MemoryRoleStore};
    use crate::store::{PermissionStore, RoleStore};

    #[tokio::test]
    async fn seeds_all_default_roles() {
        let roles = MemoryRoleStore::new();
        let permissions = MemoryPermissionStore::new();

        seed_default_rbac(&roles, &permissions).await.unwrap();

        for (name, _) in DEFAULT_ROLES {
            assert!(roles.find_by_name(name).await.unwrap().is_some(), "{name}");
        }
        assert!(
            permissions
                .find_by_name("assets.publish")
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn reseeding_is_idempotent() {
        let roles = MemoryRoleStore::new();
        let permissions = MemoryPermissionStore::new();

        seed_default_rbac(&roles, &permissions).await.unwrap();
        let role_count = roles.list().await.unwrap().len();
        let permission_count = permissions.list().await.unwrap().len();

        seed_default_rbac(&roles, &permissions).await.unwrap();

        assert_eq!(roles.list().await.unwrap().len(), role_count);
        assert_eq!(permissions.list().await.unwrap().len(), permission_count);
    }
}
