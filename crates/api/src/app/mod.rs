//! HTTP API application wiring (axum router + service wiring).
//!
//! If you're new to Rust, this folder is structured like:
//! - `services.rs`: infrastructure wiring (stores, resolver, auth core)
//! - `routes/`: HTTP routes + handlers (one file per resource area)
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use crate::middleware::{self, AuthState};

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(jwt_secret: String) -> Router {
    let services = Arc::new(services::build_services(&jwt_secret).await);
    let auth_state = AuthState {
        verifier: services.token_verifier.clone(),
    };

    // Admin surface: every route requires an authenticated identity.
    let admin = Router::new()
        .nest("/api/users", routes::users::router())
        .nest("/api/roles", routes::roles::router())
        .nest("/api/permissions", routes::permissions::router())
        .layer(axum::middleware::from_fn_with_state(
            auth_state.clone(),
            middleware::auth_middleware,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .nest("/api/auth", routes::auth::router(auth_state.clone()))
        .nest("/api/assets", routes::assets::router(auth_state.clone()))
        .nest("/api/services", routes::services_catalog::router(auth_state))
        .merge(admin)
        .layer(Extension(services))
        .layer(ServiceBuilder::new())
}
