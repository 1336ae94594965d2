//! Login and registration orchestration.
//!
//! Each attempt is terminal in one step: the first failed stage decides the
//! outcome and nothing is retried. The two store seams are the only
//! suspension points besides hashing itself.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;

use backoffice_core::AccountId;

use crate::account::{Account, AccountView};
use crate::error::AuthError;
use crate::store::{CredentialStore, ResolvedRole, RoleDirectory};
use crate::token::Hs256TokenCodec;
use crate::{password, Role};

/// Role granted when registration supplies none.
pub const DEFAULT_ROLE: &str = "viewer";

/// Registration input.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password: String,
    pub roles: Option<Vec<String>>,
}

/// Successful authentication: a signed token plus the public account view
/// and the roles resolved at issuance.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub token: String,
    pub account: AccountView,
    pub roles: Vec<ResolvedRole>,
}

/// Verifies credentials against the store seams and turns success into an
/// issued token.
pub struct CredentialVerifier {
    accounts: Arc<dyn CredentialStore>,
    roles: Arc<dyn RoleDirectory>,
    codec: Arc<Hs256TokenCodec>,
}

impl CredentialVerifier {
    pub fn new(
        accounts: Arc<dyn CredentialStore>,
        roles: Arc<dyn RoleDirectory>,
        codec: Arc<Hs256TokenCodec>,
    ) -> Self {
        Self {
            accounts,
            roles,
            codec,
        }
    }

    /// One-step login flow.
    ///
    /// Unknown identifiers and wrong passwords yield the same
    /// [`AuthError::InvalidCredentials`].
    pub async fn login(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<AuthSession, AuthError> {
        let Some(account) = self.accounts.find_by_identifier(identifier).await? else {
            return Err(AuthError::InvalidCredentials);
        };

        if !password::verify(password, &account.password_hash) {
            return Err(AuthError::InvalidCredentials);
        }

        let resolved = self.roles.resolve(&account.roles).await?;
        if resolved.is_empty() {
            return Err(AuthError::NoRolesAssigned);
        }

        self.open_session(&account, resolved)
    }

    /// Register a new account and authenticate it in the same step.
    ///
    /// All-or-nothing: a single unknown role name fails the whole request
    /// and nothing is persisted. Hashing happens before the insert.
    pub async fn register(&self, new: NewAccount) -> Result<AuthSession, AuthError> {
        validate_new_account(&new)?;

        let username = new.username.trim().to_string();
        let email = new.email.trim().to_lowercase();

        if self.accounts.find_by_username(&username).await?.is_some()
            || self.accounts.find_by_email(&email).await?.is_some()
        {
            return Err(AuthError::DuplicateAccount);
        }

        let requested = match new.roles {
            Some(names) if !names.is_empty() => names,
            _ => vec![DEFAULT_ROLE.to_string()],
        };

        let mut resolved = Vec::with_capacity(requested.len());
        for name in &requested {
            match self.roles.find_by_name(name).await? {
                Some(role) => resolved.push(role),
                None => return Err(AuthError::InvalidRole(name.clone())),
            }
        }

        let now = Utc::now();
        let account = Account {
            id: AccountId::new(),
            username,
            email,
            password_hash: password::hash(&new.password)?,
            roles: resolved.iter().map(|r| r.id).collect(),
            created_at: now,
            updated_at: now,
        };
        self.accounts.insert(account.clone()).await?;

        self.open_session(&account, resolved)
    }

    fn open_session(
        &self,
        account: &Account,
        resolved: Vec<ResolvedRole>,
    ) -> Result<AuthSession, AuthError> {
        let names: Vec<Role> = resolved.iter().map(|r| r.name.clone()).collect();
        let token = self
            .codec
            .issue(account.id, &account.username, names.clone(), Utc::now())?;

        Ok(AuthSession {
            token,
            account: account.view(names),
            roles: resolved,
        })
    }
}

fn validate_new_account(new: &NewAccount) -> Result<(), AuthError> {
    if new.username.trim().is_empty() {
        return Err(AuthError::Validation("username cannot be empty".into()));
    }
    if new.email.trim().is_empty() || !new.email.contains('@') {
        return Err(AuthError::Validation("invalid email format".into()));
    }
    if new.password.is_empty() {
        return Err(AuthError::Validation("password cannot be empty".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;
    use crate::token::TokenVerifier;
    use crate::Permission;
    use async_trait::async_trait;
    use backoffice_core::RoleId;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// HashMap-backed store double.
    #[derive(Default)]
    struct FakeAccounts {
        inner: Mutex<HashMap<AccountId, Account>>,
    }

    #[async_trait]
    impl CredentialStore for FakeAccounts {
        async fn find_by_identifier(
            &self,
            identifier: &str,
        ) -> Result<Option<Account>, StoreError> {
            let map = self.inner.lock().unwrap();
            Ok(map
                .values()
                .find(|a| a.username == identifier || a.email == identifier.to_lowercase())
                .cloned())
        }

        async fn find_by_username(&self, username: &str) -> Result<Option<Account>, StoreError> {
            let map = self.inner.lock().unwrap();
            Ok(map.values().find(|a| a.username == username).cloned())
        }

        async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
            let map = self.inner.lock().unwrap();
            Ok(map.values().find(|a| a.email == email).cloned())
        }

        async fn insert(&self, account: Account) -> Result<(), StoreError> {
            self.inner.lock().unwrap().insert(account.id, account);
            Ok(())
        }
    }

    /// Fixed role directory with `viewer` and `super_admin`.
    struct FakeRoles {
        roles: Vec<ResolvedRole>,
    }

    impl FakeRoles {
        fn with_defaults() -> Self {
            Self {
                roles: vec![
                    ResolvedRole {
                        id: RoleId::new(),
                        name: Role::new("viewer"),
                        permissions: vec![
                            Permission::new("assets.read"),
                            Permission::new("services.read"),
                        ],
                    },
                    ResolvedRole {
                        id: RoleId::new(),
                        name: Role::new("super_admin"),
                        permissions: vec![Permission::new("users.manage")],
                    },
                ],
            }
        }
    }

    #[async_trait]
    impl RoleDirectory for FakeRoles {
        async fn find_by_name(&self, name: &str) -> Result<Option<ResolvedRole>, StoreError> {
            Ok(self.roles.iter().find(|r| r.name.as_str() == name).cloned())
        }

        async fn resolve(&self, refs: &[RoleId]) -> Result<Vec<ResolvedRole>, StoreError> {
            Ok(refs
                .iter()
                .filter_map(|id| self.roles.iter().find(|r| r.id == *id).cloned())
                .collect())
        }
    }

    fn verifier() -> (CredentialVerifier, Arc<Hs256TokenCodec>) {
        let codec = Arc::new(Hs256TokenCodec::new(b"test-secret"));
        let verifier = CredentialVerifier::new(
            Arc::new(FakeAccounts::default()),
            Arc::new(FakeRoles::with_defaults()),
            codec.clone(),
        );
        (verifier, codec)
    }

    fn new_account(roles: Option<Vec<&str>>) -> NewAccount {
        NewAccount {
            username: "alice".to_string(),
            email: "a@x.com".to_string(),
            password: "secret123".to_string(),
            roles: roles.map(|r| r.into_iter().map(String::from).collect()),
        }
    }

    #[tokio::test]
    async fn register_defaults_to_viewer() {
        let (verifier, codec) = verifier();

        let session = verifier.register(new_account(None)).await.unwrap();

        assert_eq!(session.account.roles, vec![Role::new("viewer")]);
        let claims = codec.verify(&session.token).unwrap();
        assert_eq!(claims.roles, vec![Role::new("viewer")]);
        assert_eq!(claims.username, "alice");
    }

    #[tokio::test]
    async fn register_with_empty_role_list_defaults_to_viewer() {
        let (verifier, _) = verifier();

        let session = verifier.register(new_account(Some(vec![]))).await.unwrap();

        assert_eq!(session.account.roles, vec![Role::new("viewer")]);
    }

    #[tokio::test]
    async fn register_rejects_unknown_role() {
        let (verifier, _) = verifier();

        let err = verifier
            .register(new_account(Some(vec!["viewer", "czar"])))
            .await
            .unwrap_err();

        assert_eq!(err, AuthError::InvalidRole("czar".to_string()));
        // Nothing persisted: the same registration without the bad role works.
        verifier.register(new_account(None)).await.unwrap();
    }

    #[tokio::test]
    async fn register_rejects_duplicate_email() {
        let (verifier, _) = verifier();
        verifier.register(new_account(None)).await.unwrap();

        let mut second = new_account(None);
        second.username = "alice2".to_string();
        let err = verifier.register(second).await.unwrap_err();

        assert_eq!(err, AuthError::DuplicateAccount);
    }

    #[tokio::test]
    async fn login_token_subject_is_account_id() {
        let (verifier, codec) = verifier();
        let registered = verifier.register(new_account(None)).await.unwrap();

        let session = verifier.login("a@x.com", "secret123").await.unwrap();

        let claims = codec.verify(&session.token).unwrap();
        assert_eq!(claims.sub, registered.account.id);
    }

    #[tokio::test]
    async fn login_by_username_works_too() {
        let (verifier, _) = verifier();
        verifier.register(new_account(None)).await.unwrap();

        verifier.login("alice", "secret123").await.unwrap();
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_identifier_are_indistinguishable() {
        let (verifier, _) = verifier();
        verifier.register(new_account(None)).await.unwrap();

        let wrong_password = verifier.login("a@x.com", "nope").await.unwrap_err();
        let unknown_account = verifier.login("b@x.com", "secret123").await.unwrap_err();

        assert_eq!(wrong_password, AuthError::InvalidCredentials);
        assert_eq!(wrong_password, unknown_account);
    }

    #[tokio::test]
    async fn login_with_dangling_roles_only_fails() {
        let codec = Arc::new(Hs256TokenCodec::new(b"test-secret"));
        let accounts = Arc::new(FakeAccounts::default());
        let verifier = CredentialVerifier::new(
            accounts.clone(),
            Arc::new(FakeRoles::with_defaults()),
            codec,
        );

        // Account referencing a role id that no directory entry matches.
        let now = Utc::now();
        accounts
            .insert(Account {
                id: AccountId::new(),
                username: "ghost".to_string(),
                email: "g@x.com".to_string(),
                password_hash: password::hash("secret123").unwrap(),
                roles: vec![RoleId::new()],
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();

        let err = verifier.login("ghost", "secret123").await.unwrap_err();
        assert_eq!(err, AuthError::NoRolesAssigned);
    }

    #[tokio::test]
    async fn register_validates_shape() {
        let (verifier, _) = verifier();

        let mut bad_email = new_account(None);
        bad_email.email = "not-an-email".to_string();
        assert!(matches!(
            verifier.register(bad_email).await.unwrap_err(),
            AuthError::Validation(_)
        ));

        let mut empty_password = new_account(None);
        empty_password.password = String::new();
        assert!(matches!(
            verifier.register(empty_password).await.unwrap_err(),
            AuthError::Validation(_)
        ));
    }
}
