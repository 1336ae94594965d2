//! Shared handler logic for the two catalog collections.
//!
//! Assets and services expose the same surface; the route files bind these
//! functions to their own store and role guards. Catalog responses keep the
//! `{success, data, message}` envelope the public listings ship with.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde_json::json;

use backoffice_auth::AuthenticatedIdentity;
use backoffice_catalog::{EntryPatch, NewEntry};
use backoffice_core::EntryId;
use backoffice_infra::EntryStore;

use crate::app::errors;
use crate::authz;

/// Role guards for one collection.
pub struct CollectionGuards {
    /// May create entries and query by publisher.
    pub publish: &'static [&'static str],
    /// May read single entries, update, and delete.
    pub manage: &'static [&'static str],
}

/// GET / (public)
pub async fn list_entries(store: &dyn EntryStore) -> Response {
    match store.list().await {
        Ok(entries) => {
            (StatusCode::OK, Json(json!({ "success": true, "data": entries }))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

/// GET /years (public) - distinct years, numerically descending.
pub async fn list_years(store: &dyn EntryStore) -> Response {
    match store.years().await {
        Ok(years) => {
            (StatusCode::OK, Json(json!({ "success": true, "data": years }))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

/// GET /years/:year (public) - entries for one year, newest first.
pub async fn list_by_year(store: &dyn EntryStore, year: &str) -> Response {
    if year.parse::<i32>().is_err() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "success": false,
                "message": "the 'year' parameter is required and must be numeric",
            })),
        )
            .into_response();
    }

    match store.list_by_year(year).await {
        Ok(entries) => {
            (StatusCode::OK, Json(json!({ "success": true, "data": entries }))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

/// GET /publisher/:publisher (publish roles)
pub async fn list_by_publisher(
    store: &dyn EntryStore,
    identity: &AuthenticatedIdentity,
    guards: &CollectionGuards,
    publisher: &str,
) -> Response {
    if let Err(denied) = authz::require_any_role(identity, guards.publish) {
        return denied;
    }

    let publisher = publisher.trim();
    if publisher.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "success": false,
                "message": "the 'publisher' parameter is required",
            })),
        )
            .into_response();
    }

    match store.list_by_publisher(publisher).await {
        Ok(entries) => {
            (StatusCode::OK, Json(json!({ "success": true, "data": entries }))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

/// POST / (publish roles)
pub async fn create_entry(
    store: &dyn EntryStore,
    identity: &AuthenticatedIdentity,
    guards: &CollectionGuards,
    input: NewEntry,
) -> Response {
    if let Err(denied) = authz::require_any_role(identity, guards.publish) {
        return denied;
    }

    let entry = match input.into_entry(Utc::now()) {
        Ok(entry) => entry,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match store.insert(entry.clone()).await {
        Ok(()) => (
            StatusCode::CREATED,
            Json(json!({ "success": true, "data": entry, "message": "entry created" })),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// GET /:id (manage roles)
pub async fn get_entry(
    store: &dyn EntryStore,
    identity: &AuthenticatedIdentity,
    guards: &CollectionGuards,
    id: &str,
) -> Response {
    if let Err(denied) = authz::require_any_role(identity, guards.manage) {
        return denied;
    }

    let id = match parse_id(id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match store.get(id).await {
        Ok(Some(entry)) => {
            (StatusCode::OK, Json(json!({ "success": true, "data": entry }))).into_response()
        }
        Ok(None) => not_found(),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// PUT /:id (manage roles)
pub async fn update_entry(
    store: &dyn EntryStore,
    identity: &AuthenticatedIdentity,
    guards: &CollectionGuards,
    id: &str,
    patch: EntryPatch,
) -> Response {
    if let Err(denied) = authz::require_any_role(identity, guards.manage) {
        return denied;
    }

    let id = match parse_id(id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let mut entry = match store.get(id).await {
        Ok(Some(entry)) => entry,
        Ok(None) => return not_found(),
        Err(e) => return errors::store_error_to_response(e),
    };

    if let Err(e) = patch.apply(&mut entry, Utc::now()) {
        return errors::domain_error_to_response(e);
    }

    match store.update(entry.clone()).await {
        Ok(true) => (
            StatusCode::OK,
            Json(json!({ "success": true, "data": entry, "message": "entry updated" })),
        )
            .into_response(),
        Ok(false) => not_found(),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// DELETE /:id (manage roles)
pub async fn delete_entry(
    store: &dyn EntryStore,
    identity: &AuthenticatedIdentity,
    guards: &CollectionGuards,
    id: &str,
) -> Response {
    if let Err(denied) = authz::require_any_role(identity, guards.manage) {
        return denied;
    }

    let id = match parse_id(id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match store.delete(id).await {
        Ok(true) => (
            StatusCode::OK,
            Json(json!({ "success": true, "message": "entry deleted" })),
        )
            .into_response(),
        Ok(false) => not_found(),
        Err(e) => errors::store_error_to_response(e),
    }
}

fn parse_id(raw: &str) -> Result<EntryId, Response> {
    raw.parse().map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "success": false, "message": "the supplied id is not valid" })),
        )
            .into_response()
    })
}

fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "success": false, "message": "entry not found" })),
    )
        .into_response()
}
