//! In-handler role guard.
//!
//! Enforced at the top of each protected handler, before any store access.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use backoffice_auth::{AuthenticatedIdentity, Role, permit};

/// Allow the request iff the identity carries at least one required role.
///
/// The denial payload lists required-vs-actual roles for diagnosability; it
/// never exposes anyone else's data.
pub fn require_any_role(
    identity: &AuthenticatedIdentity,
    required: &[&'static str],
) -> Result<(), axum::response::Response> {
    let required_roles: Vec<Role> = required.iter().map(|name| Role::new(*name)).collect();
    if permit(identity, &required_roles) {
        return Ok(());
    }

    Err((
        StatusCode::FORBIDDEN,
        axum::Json(json!({
            "error": "forbidden",
            "message": "insufficient role for this route",
            "required_roles": required,
            "user_roles": identity.role_names(),
        })),
    )
        .into_response())
}
