use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use axum::body::Body;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use http::{HeaderName, Request, Response, StatusCode};
use resourcekit_db::connect_db;
use resourcekit_rest::ResourceModule;
use sea_orm::DatabaseConnection;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::field::Empty;
use users::UsersModule;

use crate::config::{AppConfig, ServerConfig};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Every module hosted by this binary.
#[must_use]
pub fn modules() -> Vec<Arc<dyn ResourceModule>> {
    vec![Arc::new(UsersModule::default())]
}

/// Initialize `modules` against `db` and assemble the full router with middleware.
///
/// All modules are initialized (schema migrated) before any route is registered.
///
/// # Errors
/// Returns an error if a module fails to initialize or register its routes.
pub async fn build_router(
    db: &DatabaseConnection,
    cfg: &AppConfig,
    modules: &[Arc<dyn ResourceModule>],
) -> anyhow::Result<Router> {
    for module in modules {
        module
            .init(db, cfg.pagination)
            .await
            .with_context(|| format!("module `{}` failed to initialize", module.name()))?;
    }

    let mut router = Router::new().route("/healthz", get(|| async { "ok" }));
    for module in modules {
        router = module
            .register_rest(router)
            .with_context(|| format!("module `{}` failed to register routes", module.name()))?;
    }

    Ok(apply_middleware(router, &cfg.server))
}

fn apply_middleware(router: Router, cfg: &ServerConfig) -> Router {
    let x_request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    // Innermost first.
    router
        .layer(RequestBodyLimitLayer::new(cfg.body_limit_bytes))
        .layer(DefaultBodyLimit::max(cfg.body_limit_bytes))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::GATEWAY_TIMEOUT,
            cfg.request_timeout(),
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &Request<Body>| {
                    let rid = req
                        .headers()
                        .get(REQUEST_ID_HEADER)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("n/a");
                    tracing::info_span!(
                        "http_request",
                        method = %req.method(),
                        uri = %req.uri().path(),
                        request_id = %rid,
                        status = Empty,
                        latency_ms = Empty,
                    )
                })
                .on_response(
                    |res: &Response<Body>, latency: std::time::Duration, span: &tracing::Span| {
                        span.record("status", res.status().as_u16());
                        span.record("latency_ms", latency.as_millis());
                    },
                ),
        )
        .layer(PropagateRequestIdLayer::new(x_request_id.clone()))
        .layer(SetRequestIdLayer::new(x_request_id, MakeRequestUuid))
}

/// Connect, migrate, bind and serve until `cancel` fires.
///
/// After cancellation the listener stops accepting; in-flight requests get
/// `server.shutdown_grace_secs` to finish before they are dropped. The pool is closed last.
///
/// # Errors
/// Returns an error if the database is unreachable, a module fails to initialize, the
/// address cannot be bound, or the server fails while running.
pub async fn serve(cfg: &AppConfig, cancel: CancellationToken) -> anyhow::Result<()> {
    let db = connect_db(&cfg.database.url, cfg.database.connect_opts())
        .await
        .context("failed to connect to database")?;
    let router = build_router(&db, cfg, &modules()).await?;

    let listener = TcpListener::bind(&cfg.server.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", cfg.server.bind_addr))?;
    tracing::info!(addr = %listener.local_addr()?, "HTTP server bound");

    let shutdown = {
        let cancel = cancel.clone();
        async move {
            cancel.cancelled().await;
            tracing::info!("HTTP server shutting down gracefully");
        }
    };
    let mut server = tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
    });

    let grace = cfg.server.shutdown_grace();
    let drain_deadline = async {
        cancel.cancelled().await;
        tokio::time::sleep(grace).await;
    };

    tokio::select! {
        res = &mut server => {
            res.context("HTTP server task failed")?
                .context("HTTP server error")?;
        }
        () = drain_deadline => {
            tracing::warn!(grace_secs = grace.as_secs(), "Drain deadline elapsed, dropping in-flight requests");
            server.abort();
        }
    }

    db.close().await.context("failed to close database pool")?;
    tracing::info!("HTTP server stopped");
    Ok(())
}

/// Resolve on SIGINT or SIGTERM and cancel `cancel`.
pub async fn wait_for_signal(cancel: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
    tracing::info!("Shutdown signal received");
    cancel.cancel();
}
