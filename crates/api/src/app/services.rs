//! Infrastructure wiring (stores, resolver, auth core construction).

use std::sync::Arc;

use backoffice_auth::{
    CredentialStore, CredentialVerifier, Hs256TokenCodec, RoleDefinition, StoreError,
    TokenVerifier,
};
use backoffice_core::RoleId;
use backoffice_infra::{
    AccountStore, EntryStore, MemoryAccountStore, MemoryEntryStore, MemoryPermissionStore,
    MemoryRoleStore, PermissionStore, RolePermissionResolver, RoleStore, seed_default_rbac,
};

use crate::app::dto::{PermissionResponse, RoleResponse};

pub struct AppServices {
    pub accounts: Arc<dyn AccountStore>,
    pub roles: Arc<dyn RoleStore>,
    pub permissions: Arc<dyn PermissionStore>,
    pub assets: Arc<dyn EntryStore>,
    pub services: Arc<dyn EntryStore>,
    pub resolver: Arc<RolePermissionResolver>,
    pub verifier: CredentialVerifier,
    pub token_verifier: Arc<dyn TokenVerifier>,
}

/// Build the service graph. Defaults to in-memory stores; with the
/// `postgres` feature and `USE_PERSISTENT_STORES=true`, backs everything
/// with Postgres instead.
pub async fn build_services(jwt_secret: &str) -> AppServices {
    #[cfg(feature = "postgres")]
    {
        let use_persistent = std::env::var("USE_PERSISTENT_STORES")
            .unwrap_or_else(|_| "false".to_string())
            .parse::<bool>()
            .unwrap_or(false);
        if use_persistent {
            return build_postgres_services(jwt_secret).await;
        }
    }

    build_memory_services(jwt_secret).await
}

async fn build_memory_services(jwt_secret: &str) -> AppServices {
    let accounts = Arc::new(MemoryAccountStore::new());
    let roles: Arc<dyn RoleStore> = Arc::new(MemoryRoleStore::new());
    let permissions: Arc<dyn PermissionStore> = Arc::new(MemoryPermissionStore::new());

    seed_default_rbac(roles.as_ref(), permissions.as_ref())
        .await
        .expect("in-memory RBAC seed cannot fail");

    wire(
        accounts,
        roles,
        permissions,
        Arc::new(MemoryEntryStore::new()),
        Arc::new(MemoryEntryStore::new()),
        jwt_secret,
    )
}

#[cfg(feature = "postgres")]
async fn build_postgres_services(jwt_secret: &str) -> AppServices {
    use backoffice_infra::{
        PgAccountStore, PgEntryStore, PgPermissionStore, PgRoleStore, ensure_schema,
    };

    let database_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set when USE_PERSISTENT_STORES=true");
    let pool = sqlx::PgPool::connect(&database_url)
        .await
        .expect("failed to connect to Postgres");
    ensure_schema(&pool).await.expect("failed to prepare schema");

    let accounts = Arc::new(PgAccountStore::new(pool.clone()));
    let roles: Arc<dyn RoleStore> = Arc::new(PgRoleStore::new(pool.clone()));
    let permissions: Arc<dyn PermissionStore> = Arc::new(PgPermissionStore::new(pool.clone()));

    seed_default_rbac(roles.as_ref(), permissions.as_ref())
        .await
        .expect("failed to seed RBAC defaults");

    wire(
        accounts,
        roles,
        permissions,
        Arc::new(PgEntryStore::new(pool.clone(), "assets")),
        Arc::new(PgEntryStore::new(pool, "services")),
        jwt_secret,
    )
}

fn wire<A>(
    accounts: Arc<A>,
    roles: Arc<dyn RoleStore>,
    permissions: Arc<dyn PermissionStore>,
    assets: Arc<dyn EntryStore>,
    services: Arc<dyn EntryStore>,
    jwt_secret: &str,
) -> AppServices
where
    A: AccountStore + CredentialStore + 'static,
{
    let resolver = Arc::new(RolePermissionResolver::new(
        roles.clone(),
        permissions.clone(),
    ));
    let codec = Arc::new(Hs256TokenCodec::new(jwt_secret.as_bytes()));
    let verifier = CredentialVerifier::new(accounts.clone(), resolver.clone(), codec.clone());

    AppServices {
        accounts,
        roles,
        permissions,
        assets,
        services,
        resolver,
        verifier,
        token_verifier: codec,
    }
}

impl AppServices {
    /// Expand role references into fully populated role views (dangling
    /// references are skipped, as in resolution).
    pub async fn expand_roles(&self, refs: &[RoleId]) -> Result<Vec<RoleResponse>, StoreError> {
        let mut expanded = Vec::with_capacity(refs.len());
        for id in refs {
            let Some(role) = self.roles.get(*id).await? else {
                continue;
            };
            expanded.push(self.role_response(role).await?);
        }
        Ok(expanded)
    }

    /// Expand one role's permission references.
    pub async fn role_response(&self, role: RoleDefinition) -> Result<RoleResponse, StoreError> {
        let mut permissions = Vec::with_capacity(role.permissions.len());
        for id in &role.permissions {
            if let Some(definition) = self.permissions.get(*id).await? {
                permissions.push(PermissionResponse::from(definition));
            }
        }
        Ok(RoleResponse {
            id: role.id,
            name: role.name,
            permissions,
        })
    }
}
