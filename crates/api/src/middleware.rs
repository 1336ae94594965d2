//! Session bootstrapper: resolve the bearer into an identity or reject.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};

use backoffice_auth::{AuthenticatedIdentity, TokenVerifier};

use crate::app::errors;

/// Cookie carrying the token for browser clients.
pub const TOKEN_COOKIE: &str = "token";

#[derive(Clone)]
pub struct AuthState {
    pub verifier: Arc<dyn TokenVerifier>,
}

/// Validate the incoming token and attach the [`AuthenticatedIdentity`] as a
/// request extension.
///
/// Purely computational — the credential store is never consulted here, so
/// the roles seen downstream are the issuance-time snapshot.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let Some(token) = extract_token(req.headers()) else {
        return Err(errors::unauthenticated("no token provided"));
    };

    let claims = state
        .verifier
        .verify(&token)
        .map_err(|e| errors::token_error_to_response(&e))?;

    req.extensions_mut()
        .insert(AuthenticatedIdentity::from_claims(&claims));

    Ok(next.run(req).await)
}

/// `Authorization: Bearer …` first, `token` cookie as fallback.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(token) = bearer_token(headers) {
        return Some(token.to_string());
    }
    cookie_token(headers)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

fn cookie_token(headers: &HeaderMap) -> Option<String> {
    for value in headers.get_all(header::COOKIE) {
        let Ok(value) = value.to_str() else { continue };
        for pair in value.split(';') {
            if let Some((name, token)) = pair.trim().split_once('=') {
                if name == TOKEN_COOKIE && !token.is_empty() {
                    return Some(token.to_string());
                }
            }
        }
    }
    None
}
