//! User administration.
//!
//! The whole surface requires the `super_admin` role. Role names supplied on
//! create/update are validated against the role collection — all-or-nothing.

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

use backoffice_auth::{Account, AuthenticatedIdentity, NewAccount, password};
use backoffice_core::AccountId;
use backoffice_infra::{AccountStore, RoleStore};

use crate::app::dto::{UpdateUserRequest, UserResponse};
use crate::app::{errors, services::AppServices};
use crate::authz;

const REQUIRED: &[&str] = &["super_admin"];

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/:id", get(get_user).put(update_user).delete(delete_user))
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// GET /api/users - list accounts with roles and permissions expanded.
async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<AuthenticatedIdentity>,
) -> Response {
    if let Err(denied) = authz::require_any_role(&identity, REQUIRED) {
        return denied;
    }

    let accounts = match services.accounts.list().await {
        Ok(accounts) => accounts,
        Err(e) => return errors::store_error_to_response(e),
    };

    let mut users = Vec::with_capacity(accounts.len());
    for account in &accounts {
        match user_response(&services, account).await {
            Ok(user) => users.push(user),
            Err(e) => return errors::store_error_to_response(e),
        }
    }

    (StatusCode::OK, Json(users)).into_response()
}

/// POST /api/users - create an account (reuses the registration flow, so
/// the response carries the new account's token).
async fn create_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<AuthenticatedIdentity>,
    Json(body): Json<NewAccount>,
) -> Response {
    if let Err(denied) = authz::require_any_role(&identity, REQUIRED) {
        return denied;
    }

    match services.verifier.register(body).await {
        Ok(session) => (
            StatusCode::CREATED,
            Json(json!({
                "message": "user created",
                "token": session.token,
                "user": session.account,
            })),
        )
            .into_response(),
        Err(e) => errors::auth_error_to_response(e),
    }
}

/// GET /api/users/:id
async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<AuthenticatedIdentity>,
    Path(id): Path<String>,
) -> Response {
    if let Err(denied) = authz::require_any_role(&identity, REQUIRED) {
        return denied;
    }

    let id: AccountId = match id.parse() {
        Ok(id) => id,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid user id"),
    };

    match services.accounts.get(id).await {
        Ok(Some(account)) => match user_response(&services, &account).await {
            Ok(user) => (StatusCode::OK, Json(user)).into_response(),
            Err(e) => errors::store_error_to_response(e),
        },
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "user not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// PUT /api/users/:id - update email/password/roles. The username is the
/// login identifier and stays immutable; the password is rehashed only when
/// a new clear text is supplied.
async fn update_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<AuthenticatedIdentity>,
    Path(id): Path<String>,
    Json(body): Json<UpdateUserRequest>,
) -> Response {
    if let Err(denied) = authz::require_any_role(&identity, REQUIRED) {
        return denied;
    }

    let id: AccountId = match id.parse() {
        Ok(id) => id,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid user id"),
    };

    let mut account = match services.accounts.get(id).await {
        Ok(Some(account)) => account,
        Ok(None) => return errors::json_error(StatusCode::NOT_FOUND, "not_found", "user not found"),
        Err(e) => return errors::store_error_to_response(e),
    };

    if let Some(email) = body.email {
        let normalized = email.trim().to_lowercase();
        if normalized.is_empty() || !normalized.contains('@') {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "validation_error",
                "invalid email format",
            );
        }
        match services.accounts.find_by_email(&normalized).await {
            Ok(Some(other)) if other.id != account.id => {
                return errors::json_error(
                    StatusCode::BAD_REQUEST,
                    "duplicate_account",
                    "email already in use",
                );
            }
            Err(e) => return errors::store_error_to_response(e),
            _ => {}
        }
        account.email = normalized;
    }

    if let Some(new_password) = body.password {
        if new_password.is_empty() {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "validation_error",
                "password cannot be empty",
            );
        }
        account.password_hash = match password::hash(&new_password) {
            Ok(hash) => hash,
            Err(e) => return errors::auth_error_to_response(e.into()),
        };
    }

    if let Some(role_names) = body.roles {
        let mut refs = Vec::with_capacity(role_names.len());
        for name in &role_names {
            match services.roles.find_by_name(name).await {
                Ok(Some(role)) => refs.push(role.id),
                Ok(None) => {
                    return errors::json_error(
                        StatusCode::BAD_REQUEST,
                        "invalid_role",
                        format!("unknown role: {name}"),
                    );
                }
                Err(e) => return errors::store_error_to_response(e),
            }
        }
        account.roles = refs;
    }

    account.updated_at = Utc::now();
    match services.accounts.update(account.clone()).await {
        Ok(true) => match user_response(&services, &account).await {
            Ok(user) => (
                StatusCode::OK,
                Json(json!({ "message": "user updated", "user": user })),
            )
                .into_response(),
            Err(e) => errors::store_error_to_response(e),
        },
        Ok(false) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "user not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// DELETE /api/users/:id
async fn delete_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<AuthenticatedIdentity>,
    Path(id): Path<String>,
) -> Response {
    if let Err(denied) = authz::require_any_role(&identity, REQUIRED) {
        return denied;
    }

    let id: AccountId = match id.parse() {
        Ok(id) => id,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid user id"),
    };

    match services.accounts.delete(id).await {
        Ok(true) => (StatusCode::OK, Json(json!({ "message": "user deleted" }))).into_response(),
        Ok(false) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "user not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

async fn user_response(
    services: &AppServices,
    account: &Account,
) -> Result<UserResponse, backoffice_auth::StoreError> {
    let roles = services.expand_roles(&account.roles).await?;
    Ok(UserResponse::from_account(account, roles))
}
