//! Asset catalog routes.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    response::Response,
    routing::{get, post},
};

use backoffice_auth::AuthenticatedIdentity;
use backoffice_catalog::{EntryPatch, NewEntry};

use crate::app::routes::catalog::{self, CollectionGuards};
use crate::app::services::AppServices;
use crate::middleware::{self, AuthState};

const GUARDS: CollectionGuards = CollectionGuards {
    publish: &["super_admin", "asset_admin", "asset_publisher"],
    manage: &["super_admin", "asset_admin"],
};

/// Public listings plus the authenticated management surface.
pub fn router(auth: AuthState) -> Router {
    let protected = Router::new()
        .route("/", post(create))
        .route("/publisher/:publisher", get(by_publisher))
        .route("/:id", get(get_one).put(update).delete(delete_one))
        .layer(axum::middleware::from_fn_with_state(
            auth,
            middleware::auth_middleware,
        ));

    Router::new()
        .route("/", get(list))
        .route("/years", get(years))
        .route("/years/:year", get(by_year))
        .merge(protected)
}

async fn list(Extension(services): Extension<Arc<AppServices>>) -> Response {
    catalog::list_entries(services.assets.as_ref()).await
}

async fn years(Extension(services): Extension<Arc<AppServices>>) -> Response {
    catalog::list_years(services.assets.as_ref()).await
}

async fn by_year(
    Extension(services): Extension<Arc<AppServices>>,
    Path(year): Path<String>,
) -> Response {
    catalog::list_by_year(services.assets.as_ref(), &year).await
}

async fn by_publisher(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<AuthenticatedIdentity>,
    Path(publisher): Path<String>,
) -> Response {
    catalog::list_by_publisher(services.assets.as_ref(), &identity, &GUARDS, &publisher).await
}

async fn create(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<AuthenticatedIdentity>,
    Json(body): Json<NewEntry>,
) -> Response {
    catalog::create_entry(services.assets.as_ref(), &identity, &GUARDS, body).await
}

async fn get_one(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<AuthenticatedIdentity>,
    Path(id): Path<String>,
) -> Response {
    catalog::get_entry(services.assets.as_ref(), &identity, &GUARDS, &id).await
}

async fn update(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<AuthenticatedIdentity>,
    Path(id): Path<String>,
    Json(body): Json<EntryPatch>,
) -> Response {
    catalog::update_entry(services.assets.as_ref(), &identity, &GUARDS, &id, body).await
}

async fn delete_one(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<AuthenticatedIdentity>,
    Path(id): Path<String>,
) -> Response {
    catalog::delete_entry(services.assets.as_ref(), &identity, &GUARDS, &id).await
}
