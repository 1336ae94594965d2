//! Consistent error responses.
//!
//! All auth-domain errors are recovered here and mapped to a structured
//! body with stable `error`/`message` fields. Infrastructure faults are
//! logged with detail and returned as an opaque 500.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use backoffice_auth::{AuthError, StoreError, TokenError};
use backoffice_core::DomainError;

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn unauthenticated(message: impl Into<String>) -> axum::response::Response {
    json_error(StatusCode::UNAUTHORIZED, "unauthenticated", message)
}

pub fn token_error_to_response(err: &TokenError) -> axum::response::Response {
    let message = match err {
        TokenError::Expired => "token has expired",
        TokenError::SignatureInvalid | TokenError::Malformed | TokenError::Issuance => {
            "invalid token"
        }
    };
    unauthenticated(message)
}

pub fn auth_error_to_response(err: AuthError) -> axum::response::Response {
    match err {
        AuthError::InvalidCredentials => {
            json_error(StatusCode::BAD_REQUEST, "invalid_credentials", "invalid credentials")
        }
        AuthError::NoRolesAssigned => {
            json_error(StatusCode::BAD_REQUEST, "no_roles_assigned", "no roles assigned")
        }
        AuthError::DuplicateAccount => {
            json_error(StatusCode::BAD_REQUEST, "duplicate_account", "account already exists")
        }
        AuthError::InvalidRole(name) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_role", format!("unknown role: {name}"))
        }
        AuthError::Validation(message) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", message)
        }
        AuthError::Token(e) => token_error_to_response(&e),
        AuthError::Hash(e) => internal(e),
        AuthError::Store(e) => internal(e),
    }
}

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    internal(err)
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(message) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", message)
        }
        DomainError::InvalidId(message) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_id", message)
        }
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        DomainError::Conflict(message) => {
            json_error(StatusCode::BAD_REQUEST, "conflict", message)
        }
    }
}

fn internal(err: impl core::fmt::Display) -> axum::response::Response {
    tracing::error!(error = %err, "internal failure while handling request");
    json_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal_error",
        "internal server error",
    )
}
