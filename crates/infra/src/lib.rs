//! `backoffice-infra` — store implementations and RBAC wiring behind the
//! auth seams.

pub mod resolver;
pub mod seed;
pub mod store;

pub use resolver::RolePermissionResolver;
pub use seed::seed_default_rbac;
pub use store::memory::{
    MemoryAccountStore, MemoryEntryStore, MemoryPermissionStore, MemoryRoleStore,
};
pub use store::{AccountStore, EntryStore, PermissionStore, RoleStore};

#[cfg(feature = "postgres")]
pub use store::postgres::{
    PgAccountStore, PgEntryStore, PgPermissionStore, PgRoleStore, ensure_schema,
};
