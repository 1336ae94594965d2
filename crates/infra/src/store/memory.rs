//! In-memory stores for dev and tests.
//!
//! `RwLock<HashMap>` keyed by id. Lock poisoning is treated as the store
//! being unavailable rather than panicking the handler.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use backoffice_auth::{
    Account, CredentialStore, PermissionDefinition, RoleDefinition, StoreError,
};
use backoffice_catalog::CatalogEntry;
use backoffice_core::{AccountId, EntryId, PermissionId, RoleId};

use super::{AccountStore, EntryStore, PermissionStore, RoleStore};

fn poisoned(store: &str) -> StoreError {
    StoreError::Unavailable(format!("{store} store lock poisoned"))
}

// ─────────────────────────────────────────────────────────────────────────────
// Accounts
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MemoryAccountStore {
    inner: RwLock<HashMap<AccountId, Account>>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn list(&self) -> Result<Vec<Account>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned("account"))?;
        let mut accounts: Vec<Account> = map.values().cloned().collect();
        accounts.sort_by_key(|a| a.created_at);
        Ok(accounts)
    }

    async fn get(&self, id: AccountId) -> Result<Option<Account>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned("account"))?;
        Ok(map.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned("account"))?;
        Ok(map.values().find(|a| a.username == username).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let needle = email.to_lowercase();
        let map = self.inner.read().map_err(|_| poisoned("account"))?;
        Ok(map.values().find(|a| a.email == needle).cloned())
    }

    async fn insert(&self, account: Account) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned("account"))?;
        map.insert(account.id, account);
        Ok(())
    }

    async fn update(&self, account: Account) -> Result<bool, StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned("account"))?;
        match map.get_mut(&account.id) {
            Some(slot) => {
                *slot = account;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: AccountId) -> Result<bool, StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned("account"))?;
        Ok(map.remove(&id).is_some())
    }
}

#[async_trait]
impl CredentialStore for MemoryAccountStore {
    async fn find_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<Account>, StoreError> {
        if let Some(account) = AccountStore::find_by_username(self, identifier).await? {
            return Ok(Some(account));
        }
        AccountStore::find_by_email(self, identifier).await
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, StoreError> {
        AccountStore::find_by_username(self, username).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        AccountStore::find_by_email(self, email).await
    }

    async fn insert(&self, account: Account) -> Result<(), StoreError> {
        AccountStore::insert(self, account).await
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Roles
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MemoryRoleStore {
    inner: RwLock<HashMap<RoleId, RoleDefinition>>,
}

impl MemoryRoleStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoleStore for MemoryRoleStore {
    async fn list(&self) -> Result<Vec<RoleDefinition>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned("role"))?;
        let mut roles: Vec<RoleDefinition> = map.values().cloned().collect();
        roles.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(roles)
    }

    async fn get(&self, id: RoleId) -> Result<Option<RoleDefinition>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned("role"))?;
        Ok(map.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<RoleDefinition>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned("role"))?;
        Ok(map.values().find(|r| r.name == name).cloned())
    }

    async fn insert(&self, role: RoleDefinition) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned("role"))?;
        map.insert(role.id, role);
        Ok(())
    }

    async fn update(&self, role: RoleDefinition) -> Result<bool, StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned("role"))?;
        match map.get_mut(&role.id) {
            Some(slot) => {
                *slot = role;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: RoleId) -> Result<bool, StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned("role"))?;
        Ok(map.remove(&id).is_some())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Permissions
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MemoryPermissionStore {
    inner: RwLock<HashMap<PermissionId, PermissionDefinition>>,
}

impl MemoryPermissionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PermissionStore for MemoryPermissionStore {
    async fn list(&self) -> Result<Vec<PermissionDefinition>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned("permission"))?;
        let mut permissions: Vec<PermissionDefinition> = map.values().cloned().collect();
        permissions.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(permissions)
    }

    async fn get(
        &self,
        id: PermissionId,
    ) -> Result<Option<PermissionDefinition>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned("permission"))?;
        Ok(map.get(&id).cloned())
    }

    async fn find_by_name(
        &self,
        name: &str,
    ) -> Result<Option<PermissionDefinition>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned("permission"))?;
        Ok(map.values().find(|p| p.name == name).cloned())
    }

    async fn insert(&self, permission: PermissionDefinition) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned("permission"))?;
        map.insert(permission.id, permission);
        Ok(())
    }

    async fn update(&self, permission: PermissionDefinition) -> Result<bool, StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned("permission"))?;
        match map.get_mut(&permission.id) {
            Some(slot) => {
                *slot = permission;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: PermissionId) -> Result<bool, StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned("permission"))?;
        Ok(map.remove(&id).is_some())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Catalog entries
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MemoryEntryStore {
    inner: RwLock<HashMap<EntryId, CatalogEntry>>,
}

impl MemoryEntryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EntryStore for MemoryEntryStore {
    async fn list(&self) -> Result<Vec<CatalogEntry>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned("entry"))?;
        let mut entries: Vec<CatalogEntry> = map.values().cloned().collect();
        entries.sort_by_key(|e| e.created_at);
        Ok(entries)
    }

    async fn get(&self, id: EntryId) -> Result<Option<CatalogEntry>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned("entry"))?;
        Ok(map.get(&id).cloned())
    }

    async fn insert(&self, entry: CatalogEntry) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned("entry"))?;
        map.insert(entry.id, entry);
        Ok(())
    }

    async fn update(&self, entry: CatalogEntry) -> Result<bool, StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned("entry"))?;
        match map.get_mut(&entry.id) {
            Some(slot) => {
                *slot = entry;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: EntryId) -> Result<bool, StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned("entry"))?;
        Ok(map.remove(&id).is_some())
    }

    async fn list_by_year(&self, year: &str) -> Result<Vec<CatalogEntry>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned("entry"))?;
        let mut entries: Vec<CatalogEntry> =
            map.values().filter(|e| e.year == year).cloned().collect();
        entries.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        Ok(entries)
    }

    async fn list_by_publisher(
        &self,
        publisher: &str,
    ) -> Result<Vec<CatalogEntry>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned("entry"))?;
        let mut entries: Vec<CatalogEntry> = map
            .values()
            .filter(|e| e.publisher == publisher)
            .cloned()
            .collect();
        entries.sort_by_key(|e| e.created_at);
        Ok(entries)
    }

    async fn years(&self) -> Result<Vec<i32>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned("entry"))?;
        let mut years: Vec<i32> = map
            .values()
            .filter_map(|e| e.year.parse::<i32>().ok())
            .collect();
        years.sort_unstable_by(|a, b| b.cmp(a));
        years.dedup();
        Ok(years)
    }
}
