//! Request-scoped authenticated identity.

use backoffice_core::AccountId;

use crate::claims::Claims;
use crate::{Permission, Role};

/// The authenticated caller for the remainder of a request.
///
/// Built once by the session bootstrapper from verified claims and passed
/// along as explicit request state. Owned by the request lifetime, never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedIdentity {
    pub account_id: AccountId,
    pub username: String,

    /// Role names decoded from the token (issuance-time snapshot).
    pub roles: Vec<Role>,

    /// Resolved permissions. Empty on the stateless path; populated only by
    /// the enriched current-permissions lookup.
    pub permissions: Vec<Permission>,
}

impl AuthenticatedIdentity {
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            account_id: claims.sub,
            username: claims.username.clone(),
            roles: claims.roles.clone(),
            permissions: Vec::new(),
        }
    }

    pub fn with_permissions(mut self, permissions: Vec<Permission>) -> Self {
        self.permissions = permissions;
        self
    }

    pub fn role_names(&self) -> Vec<String> {
        self.roles.iter().map(|r| r.as_str().to_string()).collect()
    }
}
