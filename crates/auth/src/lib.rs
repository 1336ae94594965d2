//! `backoffice-auth` — credential verification, token issuance/validation,
//! and role-based authorization.
//!
//! This crate is intentionally decoupled from HTTP; persistence is consumed
//! only through the two seams in [`store`].

pub mod account;
pub mod authorize;
pub mod claims;
pub mod error;
pub mod identity;
pub mod password;
pub mod permissions;
pub mod rbac;
pub mod roles;
pub mod store;
pub mod token;
pub mod verifier;

pub use account::{Account, AccountView};
pub use authorize::permit;
pub use claims::{Claims, TOKEN_TTL_SECS};
pub use error::AuthError;
pub use identity::AuthenticatedIdentity;
pub use password::{HashError, HashedPassword};
pub use permissions::Permission;
pub use rbac::{PermissionDefinition, RoleDefinition};
pub use roles::Role;
pub use store::{CredentialStore, ResolvedRole, RoleDirectory, StoreError};
pub use token::{Hs256TokenCodec, TokenError, TokenVerifier};
pub use verifier::{AuthSession, CredentialVerifier, NewAccount, DEFAULT_ROLE};
