#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::time::Duration;

use axum::Router;
use axum::body::Body;
use http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use resource_server::AppConfig;
use resource_server::server::{REQUEST_ID_HEADER, build_router, modules, serve};
use resourcekit_db::{ConnectOpts, connect_db};
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

async fn router(cfg: &AppConfig) -> Router {
    let db = connect_db(
        "sqlite::memory:",
        ConnectOpts {
            max_conns: Some(1),
            min_conns: Some(1),
            ..Default::default()
        },
    )
    .await
    .expect("Failed to connect to database");
    build_router(&db, cfg, &modules()).await.unwrap()
}

fn request(method: Method, uri: &str, body: Body) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body)
        .unwrap()
}

#[tokio::test]
async fn healthz_answers_ok_with_request_id() {
    let app = router(&AppConfig::default()).await;

    let resp = app
        .oneshot(request(Method::GET, "/healthz", Body::empty()))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key(REQUEST_ID_HEADER));
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"ok");
}

#[tokio::test]
async fn incoming_request_id_is_propagated() {
    let app = router(&AppConfig::default()).await;

    let req = Request::builder()
        .uri("/healthz")
        .header(REQUEST_ID_HEADER, "req-123")
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.headers().get(REQUEST_ID_HEADER).unwrap(), "req-123");
}

#[tokio::test]
async fn users_are_served_with_configured_page_size() {
    let mut cfg = AppConfig::default();
    cfg.pagination.default_page_size = 3;
    let app = router(&cfg).await;

    let resp = app
        .oneshot(request(Method::GET, "/api/v1/users", Body::empty()))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    let page: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(page["size"], 3);
    assert_eq!(page["total"], 0);
}

#[tokio::test]
async fn oversized_bodies_are_rejected() {
    let mut cfg = AppConfig::default();
    cfg.server.body_limit_bytes = 64;
    let app = router(&cfg).await;

    let big = format!(r#"{{"username":"{}","email":"a@example.com","password":"pw"}}"#, "x".repeat(256));
    let resp = app
        .oneshot(request(Method::POST, "/api/v1/users", Body::from(big)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn serve_stops_when_cancelled() {
    let mut cfg = AppConfig::default();
    cfg.server.bind_addr = "127.0.0.1:0".to_owned();
    cfg.server.shutdown_grace_secs = 1;
    cfg.database.url = "sqlite::memory:".to_owned();
    cfg.database.max_conns = Some(1);
    cfg.database.min_conns = Some(1);

    let cancel = CancellationToken::new();
    let handle = {
        let cancel = cancel.clone();
        tokio::spawn(async move { serve(&cfg, cancel).await })
    };

    tokio::time::sleep(Duration::from_millis(200)).await;
    cancel.cancel();

    let res = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("server did not stop")
        .unwrap();
    assert!(res.is_ok(), "{res:?}");
}

#[test]
fn users_module_is_hosted() {
    let names: Vec<_> = modules().iter().map(|m| m.name()).collect();
    assert_eq!(names, ["users"]);
}
