//! Store traits for the four resource collections.
//!
//! The auth core only consumes the narrower `CredentialStore`/`RoleDirectory`
//! seams; these traits add the CRUD the admin surface needs. All operations
//! are single-document reads/writes — no multi-step transactions.

use async_trait::async_trait;

use backoffice_auth::{Account, PermissionDefinition, RoleDefinition, StoreError};
use backoffice_catalog::CatalogEntry;
use backoffice_core::{AccountId, EntryId, PermissionId, RoleId};

pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

/// Full account CRUD used by user administration.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Account>, StoreError>;

    async fn get(&self, id: AccountId) -> Result<Option<Account>, StoreError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;

    async fn insert(&self, account: Account) -> Result<(), StoreError>;

    /// Replace the stored account; `false` when the id is unknown.
    async fn update(&self, account: Account) -> Result<bool, StoreError>;

    async fn delete(&self, id: AccountId) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait RoleStore: Send + Sync {
    async fn list(&self) -> Result<Vec<RoleDefinition>, StoreError>;

    async fn get(&self, id: RoleId) -> Result<Option<RoleDefinition>, StoreError>;

    async fn find_by_name(&self, name: &str) -> Result<Option<RoleDefinition>, StoreError>;

    async fn insert(&self, role: RoleDefinition) -> Result<(), StoreError>;

    async fn update(&self, role: RoleDefinition) -> Result<bool, StoreError>;

    /// Deleting is allowed while accounts still reference the role; the
    /// resolver tolerates the dangling reference.
    async fn delete(&self, id: RoleId) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait PermissionStore: Send + Sync {
    async fn list(&self) -> Result<Vec<PermissionDefinition>, StoreError>;

    async fn get(&self, id: PermissionId) -> Result<Option<PermissionDefinition>, StoreError>;

    async fn find_by_name(&self, name: &str)
        -> Result<Option<PermissionDefinition>, StoreError>;

    async fn insert(&self, permission: PermissionDefinition) -> Result<(), StoreError>;

    async fn update(&self, permission: PermissionDefinition) -> Result<bool, StoreError>;

    async fn delete(&self, id: PermissionId) -> Result<bool, StoreError>;
}

/// Catalog entry CRUD plus the public listing queries. One instance per
/// collection (assets, services).
#[async_trait]
pub trait EntryStore: Send + Sync {
    async fn list(&self) -> Result<Vec<CatalogEntry>, StoreError>;

    async fn get(&self, id: EntryId) -> Result<Option<CatalogEntry>, StoreError>;

    async fn insert(&self, entry: CatalogEntry) -> Result<(), StoreError>;

    async fn update(&self, entry: CatalogEntry) -> Result<bool, StoreError>;

    async fn delete(&self, id: EntryId) -> Result<bool, StoreError>;

    /// Entries for one year, newest `published_at` first.
    async fn list_by_year(&self, year: &str) -> Result<Vec<CatalogEntry>, StoreError>;

    async fn list_by_publisher(&self, publisher: &str)
        -> Result<Vec<CatalogEntry>, StoreError>;

    /// Distinct years, numerically descending.
    async fn years(&self) -> Result<Vec<i32>, StoreError>;
}
