//! Permission administration (super_admin only).

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

use backoffice_auth::{AuthenticatedIdentity, PermissionDefinition};
use backoffice_core::PermissionId;
use backoffice_infra::PermissionStore;

use crate::app::dto::{CreatePermissionRequest, PermissionResponse, UpdatePermissionRequest};
use crate::app::{errors, services::AppServices};
use crate::authz;

const REQUIRED: &[&str] = &["super_admin"];

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_permissions).post(create_permission))
        .route(
            "/:id",
            get(get_permission).put(update_permission).delete(delete_permission),
        )
}

async fn list_permissions(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<AuthenticatedIdentity>,
) -> Response {
    if let Err(denied) = authz::require_any_role(&identity, REQUIRED) {
        return denied;
    }

    match services.permissions.list().await {
        Ok(permissions) => {
            let permissions: Vec<PermissionResponse> =
                permissions.into_iter().map(Into::into).collect();
            (StatusCode::OK, Json(permissions)).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

async fn create_permission(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<AuthenticatedIdentity>,
    Json(body): Json<CreatePermissionRequest>,
) -> Response {
    if let Err(denied) = authz::require_any_role(&identity, REQUIRED) {
        return denied;
    }

    let name = body.name.trim().to_string();
    if name.is_empty() {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "permission name is required",
        );
    }

    match services.permissions.find_by_name(&name).await {
        Ok(Some(_)) => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "conflict",
                "permission already exists",
            );
        }
        Err(e) => return errors::store_error_to_response(e),
        _ => {}
    }

    let now = Utc::now();
    let permission = PermissionDefinition {
        id: PermissionId::new(),
        name,
        description: body.description,
        created_at: now,
        updated_at: now,
    };

    match services.permissions.insert(permission.clone()).await {
        Ok(()) => (
            StatusCode::CREATED,
            Json(PermissionResponse::from(permission)),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

async fn get_permission(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<AuthenticatedIdentity>,
    Path(id): Path<String>,
) -> Response {
    if let Err(denied) = authz::require_any_role(&identity, REQUIRED) {
        return denied;
    }

    let id: PermissionId = match id.parse() {
        Ok(id) => id,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid permission id");
        }
    };

    match services.permissions.get(id).await {
        Ok(Some(permission)) => {
            (StatusCode::OK, Json(PermissionResponse::from(permission))).into_response()
        }
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "permission not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// Rename/re-describe only; permissions carry no other state.
async fn update_permission(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<AuthenticatedIdentity>,
    Path(id): Path<String>,
    Json(body): Json<UpdatePermissionRequest>,
) -> Response {
    if let Err(denied) = authz::require_any_role(&identity, REQUIRED) {
        return denied;
    }

    let id: PermissionId = match id.parse() {
        Ok(id) => id,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid permission id");
        }
    };

    let mut permission = match services.permissions.get(id).await {
        Ok(Some(permission)) => permission,
        Ok(None) => {
            return errors::json_error(StatusCode::NOT_FOUND, "not_found", "permission not found");
        }
        Err(e) => return errors::store_error_to_response(e),
    };

    if let Some(name) = body.name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "validation_error",
                "permission name is required",
            );
        }
        match services.permissions.find_by_name(&name).await {
            Ok(Some(other)) if other.id != permission.id => {
                return errors::json_error(
                    StatusCode::BAD_REQUEST,
                    "conflict",
                    "permission already exists",
                );
            }
            Err(e) => return errors::store_error_to_response(e),
            _ => {}
        }
        permission.name = name;
    }

    if let Some(description) = body.description {
        permission.description = Some(description);
    }

    permission.updated_at = Utc::now();
    match services.permissions.update(permission.clone()).await {
        Ok(true) => (StatusCode::OK, Json(PermissionResponse::from(permission))).into_response(),
        Ok(false) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "permission not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

async fn delete_permission(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<AuthenticatedIdentity>,
    Path(id): Path<String>,
) -> Response {
    if let Err(denied) = authz::require_any_role(&identity, REQUIRED) {
        return denied;
    }

    let id: PermissionId = match id.parse() {
        Ok(id) => id,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid permission id");
        }
    };

    match services.permissions.delete(id).await {
        Ok(true) => {
            (StatusCode::OK, Json(json!({ "message": "permission deleted" }))).into_response()
        }
        Ok(false) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "permission not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}
