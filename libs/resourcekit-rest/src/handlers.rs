use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, RawQuery};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use http::{HeaderValue, StatusCode, Uri, header};
use resourcekit_db::{Dao, Page, ResourceError, StoredResource};
use resourcekit_meta::Resource;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::resource_error_to_problem;
use crate::patch::merge_patch;
use crate::problem::{ApiResult, Problem};
use crate::query::ListParams;

/// Shared state of one registered resource type.
pub struct ResourceState<R> {
    pub dao: Dao<R>,
    pub base_path: String,
}

/// Parse a path id: ASCII digits only, within the signed 64-bit range.
///
/// # Errors
/// Returns [`ResourceError::MalformedId`] for anything else.
pub fn parse_id(raw: &str) -> Result<i64, ResourceError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ResourceError::malformed_id(raw));
    }
    raw.parse().map_err(|_| ResourceError::malformed_id(raw))
}

fn decode<R: Resource>(body: &[u8]) -> Result<R, ResourceError> {
    serde_json::from_slice(body).map_err(|e| ResourceError::decode(e.to_string()))
}

fn apply_patch<R: Resource>(current: &R, patch: &Value) -> Result<R, ResourceError> {
    let mut doc =
        serde_json::to_value(current).map_err(|e| ResourceError::internal(e.to_string()))?;
    merge_patch(&mut doc, patch);
    serde_json::from_value(doc).map_err(|e| ResourceError::decode(e.to_string()))
}

fn problem_at(uri: &Uri) -> impl Fn(ResourceError) -> Problem + Copy + '_ {
    move |e| resource_error_to_problem(&e, uri.path())
}

/// Create a resource from the request body.
#[tracing::instrument(skip_all, fields(kind = R::KIND))]
pub async fn create<R: StoredResource>(
    uri: Uri,
    Extension(state): Extension<Arc<ResourceState<R>>>,
    body: Bytes,
) -> ApiResult<Response> {
    let problem = problem_at(&uri);

    let resource: R = decode(&body).map_err(problem)?;
    let created = state.dao.create(resource).await.map_err(problem)?;

    let location = created
        .metadata()
        .id
        .and_then(|id| HeaderValue::from_str(&format!("{}/{id}", state.base_path)).ok());
    info!(id = created.metadata().id, "Created resource");

    let mut resp = (StatusCode::CREATED, Json(created)).into_response();
    if let Some(location) = location {
        resp.headers_mut().insert(header::LOCATION, location);
    }
    Ok(resp)
}

/// List resources, one page at a time.
#[tracing::instrument(skip_all, fields(kind = R::KIND, query = query.as_deref()))]
pub async fn list<R: StoredResource>(
    uri: Uri,
    Extension(state): Extension<Arc<ResourceState<R>>>,
    RawQuery(query): RawQuery,
) -> ApiResult<Json<Page<R>>> {
    let problem = problem_at(&uri);

    let params = ListParams::parse(query.as_deref(), state.dao.limits().default_page_size)
        .map_err(problem)?;
    let page = state
        .dao
        .list(params.page, params.size, Some(&params.filter))
        .await
        .map_err(problem)?;
    debug!(
        total = page.total,
        pages = page.page_count(),
        "Listed resources"
    );
    Ok(Json(page))
}

#[tracing::instrument(skip_all, fields(kind = R::KIND, id = %raw_id))]
pub async fn get<R: StoredResource>(
    uri: Uri,
    Extension(state): Extension<Arc<ResourceState<R>>>,
    Path(raw_id): Path<String>,
) -> ApiResult<Json<R>> {
    let problem = problem_at(&uri);

    let id = parse_id(&raw_id).map_err(problem)?;
    let resource = state.dao.get(id).await.map_err(problem)?;
    Ok(Json(resource))
}

/// Update a resource by merging the request body into its stored representation.
#[tracing::instrument(skip_all, fields(kind = R::KIND, id = %raw_id))]
pub async fn update<R: StoredResource>(
    uri: Uri,
    Extension(state): Extension<Arc<ResourceState<R>>>,
    Path(raw_id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<R>> {
    let problem = problem_at(&uri);

    let id = parse_id(&raw_id).map_err(problem)?;
    let patch: Value = serde_json::from_slice(&body)
        .map_err(|e| problem(ResourceError::decode(e.to_string())))?;
    if !patch.is_object() {
        let err = ResourceError::decode("request body must be a JSON object");
        return Err(problem(err));
    }

    let updated = state
        .dao
        .update_with(id, move |current| apply_patch(&current, &patch))
        .await
        .map_err(problem)?;
    info!(version = updated.metadata().resource_version, "Updated resource");
    Ok(Json(updated))
}

#[tracing::instrument(skip_all, fields(kind = R::KIND, id = %raw_id))]
pub async fn delete<R: StoredResource>(
    uri: Uri,
    Extension(state): Extension<Arc<ResourceState<R>>>,
    Path(raw_id): Path<String>,
) -> ApiResult<StatusCode> {
    let problem = problem_at(&uri);

    let id = parse_id(&raw_id).map_err(problem)?;
    state.dao.delete(id).await.map_err(problem)?;
    info!("Deleted resource");
    Ok(StatusCode::NO_CONTENT)
}
