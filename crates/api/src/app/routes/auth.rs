//! Authentication routes: login, register, logout, check, permissions.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;

use backoffice_auth::{
    AuthSession, AuthenticatedIdentity, NewAccount, RoleDirectory, TOKEN_TTL_SECS, TokenVerifier,
};

use backoffice_infra::AccountStore;

use crate::app::dto::LoginRequest;
use crate::app::{errors, services::AppServices};
use crate::middleware::{self, AuthState};

pub fn router(auth: AuthState) -> Router {
    // The enriched permissions lookup is the only auth route that needs an
    // authenticated identity.
    let protected = Router::new()
        .route("/permissions", get(current_permissions))
        .layer(axum::middleware::from_fn_with_state(
            auth,
            middleware::auth_middleware,
        ));

    Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
        .route("/logout", post(logout))
        .route("/check", get(check))
        .merge(protected)
}

async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<LoginRequest>,
) -> Response {
    match services.verifier.login(&body.identifier, &body.password).await {
        Ok(session) => session_response(StatusCode::OK, "authentication successful", session),
        Err(e) => errors::auth_error_to_response(e),
    }
}

async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<NewAccount>,
) -> Response {
    match services.verifier.register(body).await {
        Ok(session) => session_response(StatusCode::CREATED, "account created", session),
        Err(e) => errors::auth_error_to_response(e),
    }
}

/// Clears any cookie-based token; always 200.
async fn logout() -> Response {
    let mut response = (StatusCode::OK, Json(json!({ "message": "logged out" }))).into_response();
    set_cookie(&mut response, clear_cookie());
    response
}

/// Stateless token check against header or cookie; never touches the store.
async fn check(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
) -> Response {
    let Some(token) = middleware::extract_token(&headers) else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "authenticated": false, "message": "no token provided" })),
        )
            .into_response();
    };

    match services.token_verifier.verify(&token) {
        Ok(claims) => (
            StatusCode::OK,
            Json(json!({
                "authenticated": true,
                "user": {
                    "id": claims.sub,
                    "username": claims.username,
                    "roles": claims.roles,
                },
            })),
        )
            .into_response(),
        Err(_) => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "authenticated": false, "message": "invalid or expired token" })),
        )
            .into_response(),
    }
}

/// Enriched variant of `check`: re-resolves the account's *current* roles
/// and permissions from the store instead of trusting the token snapshot.
async fn current_permissions(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<AuthenticatedIdentity>,
) -> Response {
    let account = match services.accounts.get(identity.account_id).await {
        Ok(Some(account)) => account,
        Ok(None) => {
            return errors::json_error(
                StatusCode::NOT_FOUND,
                "not_found",
                "account no longer exists",
            );
        }
        Err(e) => return errors::store_error_to_response(e),
    };

    let resolved = match services.resolver.resolve(&account.roles).await {
        Ok(resolved) => resolved,
        Err(e) => return errors::store_error_to_response(e),
    };

    let mut permissions: Vec<String> = resolved
        .iter()
        .flat_map(|role| role.permissions.iter().map(|p| p.as_str().to_string()))
        .collect();
    permissions.sort();
    permissions.dedup();

    (
        StatusCode::OK,
        Json(json!({ "roles": resolved, "permissions": permissions })),
    )
        .into_response()
}

fn session_response(status: StatusCode, message: &str, session: AuthSession) -> Response {
    let mut response = (
        status,
        Json(json!({
            "message": message,
            "token": session.token,
            "user": session.account,
        })),
    )
        .into_response();
    set_cookie(&mut response, token_cookie(&session.token));
    response
}

/// HTTP-only, strict-same-site session cookie; max age mirrors the TTL.
fn token_cookie(token: &str) -> String {
    format!(
        "{}={token}; Path=/; HttpOnly; SameSite=Strict; Max-Age={TOKEN_TTL_SECS}",
        middleware::TOKEN_COOKIE
    )
}

/// Immediate-expiry overwrite used by logout.
fn clear_cookie() -> String {
    format!(
        "{}=; Path=/; HttpOnly; SameSite=Strict; Max-Age=0",
        middleware::TOKEN_COOKIE
    )
}

fn set_cookie(response: &mut Response, cookie: String) {
    if let Ok(value) = header::HeaderValue::from_str(&cookie) {
        response.headers_mut().append(header::SET_COOKIE, value);
    }
}
