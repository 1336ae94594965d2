use serde::{Deserialize, Serialize};

use backoffice_core::AccountId;

use crate::Role;

/// Token lifetime: one hour from issuance.
pub const TOKEN_TTL_SECS: i64 = 3600;

/// Claim set embedded in a signed token.
///
/// `roles` is a snapshot taken at issuance. Revoking a role from an account
/// does not invalidate tokens already in flight; they age out with `exp`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject account id.
    pub sub: AccountId,

    /// Username at issuance time.
    pub username: String,

    /// Role names granted at issuance time.
    pub roles: Vec<Role>,

    /// Issued-at (unix seconds).
    pub iat: i64,

    /// Expiry (unix seconds).
    pub exp: i64,
}
