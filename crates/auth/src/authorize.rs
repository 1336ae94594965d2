//! Role-based authorization gate.

use crate::{AuthenticatedIdentity, Role};

/// Grant iff `required` is empty or the identity carries at least one of
/// the required roles.
///
/// - No IO
/// - No panics
/// - No mutation (pure policy check)
///
/// An identity with no roles is denied for any non-empty requirement.
pub fn permit(identity: &AuthenticatedIdentity, required: &[Role]) -> bool {
    if required.is_empty() {
        return true;
    }

    identity
        .roles
        .iter()
        .any(|have| required.iter().any(|want| want == have))
}
