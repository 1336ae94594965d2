//! Auth-domain failure taxonomy.

use thiserror::Error;

use crate::password::HashError;
use crate::store::StoreError;
use crate::token::TokenError;

/// Every variant is recovered at the HTTP boundary and mapped to a
/// structured response with a stable `message` field.
///
/// `InvalidCredentials` deliberately covers both unknown identifiers and
/// password mismatches so responses carry no account-enumeration signal.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Policy: an account with zero (surviving) roles cannot authenticate.
    #[error("no roles assigned")]
    NoRolesAssigned,

    /// Registration hit an existing username or email.
    #[error("account already exists")]
    DuplicateAccount,

    /// A supplied role name has no definition in the role collection.
    #[error("unknown role: {0}")]
    InvalidRole(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Hash(#[from] HashError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
