//! Account record and its public projection.

use chrono::{DateTime, Utc};
use serde::Serialize;

use backoffice_core::{AccountId, RoleId};

use crate::password::HashedPassword;
use crate::Role;

/// A stored account.
///
/// # Invariants
/// - `username` (the login identifier) and `email` are unique across the
///   store; `username` is immutable after creation.
/// - `password_hash` is always derived from a salted hashing function; the
///   clear text is never persisted or logged.
/// - `roles` holds ordered references into the role collection. A reference
///   may dangle after a role deletion; resolution tolerates that.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: AccountId,
    pub username: String,
    pub email: String,
    pub password_hash: HashedPassword,
    pub roles: Vec<RoleId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Public projection with resolved role names.
    pub fn view(&self, roles: Vec<Role>) -> AccountView {
        AccountView {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            roles,
        }
    }
}

/// Outward-facing account shape.
///
/// This is the only account representation handed to clients; the password
/// hash never leaves the store layer.
#[derive(Debug, Clone, Serialize)]
pub struct AccountView {
    pub id: AccountId,
    pub username: String,
    pub email: String,
    pub roles: Vec<Role>,
}
