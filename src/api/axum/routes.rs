use axum::Router;
use axum::http::StatusCode;
use axum::middleware;
use axum::routing::get;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::services::ServeDir;
use tower_http::timeout::{RequestBodyTimeoutLayer, TimeoutLayer};

use super::handlers;
use super::middleware::{handle_panic, request_logger};
use crate::config::ServerConfig;
use crate::session::{SessionNegotiator, SessionStore};

#[derive(Clone)]
pub struct AppState<S> {
    pub negotiator: SessionNegotiator<S>,
}

impl<S> AppState<S> {
    pub fn new(negotiator: SessionNegotiator<S>) -> Self {
        Self { negotiator }
    }
}

/// Session-aware pages, the health check and the 404 fallback.
pub fn page_routes<S>() -> Router<AppState<S>>
where
    S: SessionStore + Clone + 'static,
{
    Router::new()
        .route("/", get(handlers::index::<S>))
        .route("/test", get(handlers::test_page::<S>))
        .route("/health", get(handlers::health))
        .route("/404", get(handlers::not_found))
        .fallback(handlers::not_found)
}

/// Builds the complete application: routes, static files and middleware.
///
/// Layers, outermost first: request logging, panic recovery, request body
/// timeout, response timeout.
pub fn app<S>(state: AppState<S>, server: &ServerConfig) -> Router
where
    S: SessionStore + Clone + 'static,
{
    let router = page_routes::<S>().nest_service("/static", ServeDir::new(&server.static_dir));

    with_timeouts(router, server)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(middleware::from_fn(request_logger))
        .with_state(state)
}

/// Applies the response and request body timeouts. A zero timeout is not applied.
///
/// A response that misses the write timeout becomes `408 Request Timeout`.
fn with_timeouts<T>(mut router: Router<T>, server: &ServerConfig) -> Router<T>
where
    T: Clone + Send + Sync + 'static,
{
    let read_timeout = server.read_timeout.to_std().unwrap_or_default();
    let write_timeout = server.write_timeout.to_std().unwrap_or_default();

    if !write_timeout.is_zero() {
        router = router.layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            write_timeout,
        ));
    }
    if !read_timeout.is_zero() {
        router = router.layer(RequestBodyTimeoutLayer::new(read_timeout));
    }
    router
}
