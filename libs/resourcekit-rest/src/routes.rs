use std::sync::Arc;

use axum::routing::{get, post};
use axum::{Extension, Router};
use resourcekit_db::{Dao, StoredResource};

use crate::handlers::{self, ResourceState};

/// Register the CRUD endpoints of `R` under `base_path`.
///
/// | method | path              | success            |
/// |--------|-------------------|--------------------|
/// | POST   | `{base_path}`      | 201 + resource     |
/// | GET    | `{base_path}`      | 200 + page         |
/// | GET    | `{base_path}/{id}` | 200 + resource     |
/// | PUT    | `{base_path}/{id}` | 200 + resource     |
/// | DELETE | `{base_path}/{id}` | 204                |
///
/// `base_path` must start with `/`; a trailing slash is ignored.
#[must_use]
pub fn register_resource<R: StoredResource>(
    router: Router,
    base_path: &str,
    dao: Dao<R>,
) -> Router {
    let base = base_path.trim_end_matches('/').to_owned();
    let item = format!("{base}/{{id}}");

    let state = Arc::new(ResourceState {
        dao,
        base_path: base.clone(),
    });

    let resource_routes = Router::new()
        .route(&base, post(handlers::create::<R>).get(handlers::list::<R>))
        .route(
            &item,
            get(handlers::get::<R>)
                .put(handlers::update::<R>)
                .delete(handlers::delete::<R>),
        )
        .layer(Extension(state));

    tracing::info!(kind = R::KIND, path = %base, "Registered resource routes");
    router.merge(resource_routes)
}
