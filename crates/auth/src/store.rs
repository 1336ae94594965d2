//! Persistence seams consumed by the auth core.
//!
//! The core needs exactly two collaborators from the credential store:
//! account lookup/creation and role resolution. The wider admin CRUD lives
//! behind the infra store traits, not here.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use backoffice_core::RoleId;

use crate::{Account, Permission, Role};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backing store failed. Logged with detail server-side and
    /// surfaced to clients as an opaque 500.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// A role expanded to its name and granted permission names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedRole {
    pub id: RoleId,
    pub name: Role,
    pub permissions: Vec<Permission>,
}

/// Account lookup and persistence as needed by login and registration.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Find the account whose username **or** email equals `identifier`.
    async fn find_by_identifier(&self, identifier: &str)
        -> Result<Option<Account>, StoreError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;

    async fn insert(&self, account: Account) -> Result<(), StoreError>;
}

/// Role resolution as needed at issuance and for fine-grained checks.
#[async_trait]
pub trait RoleDirectory: Send + Sync {
    async fn find_by_name(&self, name: &str) -> Result<Option<ResolvedRole>, StoreError>;

    /// Expand `refs` in order. Roles that no longer exist are dropped, not
    /// fatal.
    async fn resolve(&self, refs: &[RoleId]) -> Result<Vec<ResolvedRole>, StoreError>;
}
