//! Role administration (super_admin only).

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::Utc;
use serde_json::json;

use backoffice_auth::{AuthenticatedIdentity, RoleDefinition};
use backoffice_core::{PermissionId, RoleId};
use backoffice_infra::{PermissionStore, RoleStore};

use crate::app::dto::{CreateRoleRequest, UpdateRoleRequest};
use crate::app::{errors, services::AppServices};
use crate::authz;

const REQUIRED: &[&str] = &["super_admin"];

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_roles).post(create_role))
        .route("/:id", get(get_role).put(update_role).delete(delete_role))
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// GET /api/roles - list roles with permissions expanded.
async fn list_roles(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<AuthenticatedIdentity>,
) -> Response {
    if let Err(denied) = authz::require_any_role(&identity, REQUIRED) {
        return denied;
    }

    let roles = match services.roles.list().await {
        Ok(roles) => roles,
        Err(e) => return errors::store_error_to_response(e),
    };

    let mut expanded = Vec::with_capacity(roles.len());
    for role in roles {
        match services.role_response(role).await {
            Ok(role) => expanded.push(role),
            Err(e) => return errors::store_error_to_response(e),
        }
    }

    (StatusCode::OK, Json(expanded)).into_response()
}

/// POST /api/roles - create a role; every referenced permission must exist.
async fn create_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<AuthenticatedIdentity>,
    Json(body): Json<CreateRoleRequest>,
) -> Response {
    if let Err(denied) = authz::require_any_role(&identity, REQUIRED) {
        return denied;
    }

    let name = body.name.trim().to_string();
    if name.is_empty() {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "role name is required",
        );
    }

    match services.roles.find_by_name(&name).await {
        Ok(Some(_)) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "conflict", "role already exists");
        }
        Err(e) => return errors::store_error_to_response(e),
        _ => {}
    }

    let permissions = match validate_permission_refs(&services, &body.permissions).await {
        Ok(refs) => refs,
        Err(response) => return response,
    };

    let now = Utc::now();
    let role = RoleDefinition {
        id: RoleId::new(),
        name,
        permissions,
        created_at: now,
        updated_at: now,
    };

    if let Err(e) = services.roles.insert(role.clone()).await {
        return errors::store_error_to_response(e);
    }

    match services.role_response(role).await {
        Ok(role) => (StatusCode::CREATED, Json(role)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// GET /api/roles/:id
async fn get_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<AuthenticatedIdentity>,
    Path(id): Path<String>,
) -> Response {
    if let Err(denied) = authz::require_any_role(&identity, REQUIRED) {
        return denied;
    }

    let id: RoleId = match id.parse() {
        Ok(id) => id,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid role id"),
    };

    match services.roles.get(id).await {
        Ok(Some(role)) => match services.role_response(role).await {
            Ok(role) => (StatusCode::OK, Json(role)).into_response(),
            Err(e) => errors::store_error_to_response(e),
        },
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "role not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// PUT /api/roles/:id - rename and/or replace the permission set.
async fn update_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<AuthenticatedIdentity>,
    Path(id): Path<String>,
    Json(body): Json<UpdateRoleRequest>,
) -> Response {
    if let Err(denied) = authz::require_any_role(&identity, REQUIRED) {
        return denied;
    }

    let id: RoleId = match id.parse() {
        Ok(id) => id,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid role id"),
    };

    let mut role = match services.roles.get(id).await {
        Ok(Some(role)) => role,
        Ok(None) => return errors::json_error(StatusCode::NOT_FOUND, "not_found", "role not found"),
        Err(e) => return errors::store_error_to_response(e),
    };

    if let Some(name) = body.name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "validation_error",
                "role name is required",
            );
        }
        match services.roles.find_by_name(&name).await {
            Ok(Some(other)) if other.id != role.id => {
                return errors::json_error(
                    StatusCode::BAD_REQUEST,
                    "conflict",
                    "role already exists",
                );
            }
            Err(e) => return errors::store_error_to_response(e),
            _ => {}
        }
        role.name = name;
    }

    if let Some(permission_refs) = body.permissions {
        role.permissions = match validate_permission_refs(&services, &permission_refs).await {
            Ok(refs) => refs,
            Err(response) => return response,
        };
    }

    role.updated_at = Utc::now();
    match services.roles.update(role.clone()).await {
        Ok(true) => match services.role_response(role).await {
            Ok(role) => (StatusCode::OK, Json(role)).into_response(),
            Err(e) => errors::store_error_to_response(e),
        },
        Ok(false) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "role not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// DELETE /api/roles/:id
///
/// Succeeds even while accounts still reference the role; resolution drops
/// the dangling reference.
async fn delete_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<AuthenticatedIdentity>,
    Path(id): Path<String>,
) -> Response {
    if let Err(denied) = authz::require_any_role(&identity, REQUIRED) {
        return denied;
    }

    let id: RoleId = match id.parse() {
        Ok(id) => id,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid role id"),
    };

    match services.roles.delete(id).await {
        Ok(true) => (StatusCode::OK, Json(json!({ "message": "role deleted" }))).into_response(),
        Ok(false) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "role not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// Parse and existence-check a list of permission ids; all-or-nothing.
async fn validate_permission_refs(
    services: &AppServices,
    refs: &[String],
) -> Result<Vec<PermissionId>, Response> {
    let mut out = Vec::with_capacity(refs.len());
    for raw in refs {
        let id: PermissionId = raw.parse().map_err(|_| {
            errors::json_error(
                StatusCode::BAD_REQUEST,
                "invalid_id",
                format!("invalid permission id: {raw}"),
            )
        })?;
        match services.permissions.get(id).await {
            Ok(Some(_)) => out.push(id),
            Ok(None) => {
                return Err(errors::json_error(
                    StatusCode::BAD_REQUEST,
                    "invalid_permission",
                    format!("unknown permission: {raw}"),
                ));
            }
            Err(e) => return Err(errors::store_error_to_response(e)),
        }
    }
    Ok(out)
}
