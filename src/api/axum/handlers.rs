//! HTTP handlers for the page and health endpoints.

use axum::Json;
use axum::extract::{Extension, State};
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue, StatusCode, Uri};
use axum::response::{Html, IntoResponse, Response};
use chrono::Utc;

use super::error::AppError;
use super::middleware::RequestId;
use super::routes::AppState;
use crate::api::HealthResponse;
use crate::api::pages;
use crate::session::{SessionCookie, SessionStore};

/// Renders the index page.
///
/// GET /
pub async fn index<S>(
    State(state): State<AppState<S>>,
    Extension(request_id): Extension<RequestId>,
    headers: HeaderMap,
) -> Result<Response, AppError>
where
    S: SessionStore + Clone + 'static,
{
    tracing::info!(request_id = %request_id, "handling index request");
    render_with_session(&state, &headers, pages::INDEX).await
}

/// Renders the test page.
///
/// GET /test
pub async fn test_page<S>(
    State(state): State<AppState<S>>,
    Extension(request_id): Extension<RequestId>,
    headers: HeaderMap,
) -> Result<Response, AppError>
where
    S: SessionStore + Clone + 'static,
{
    tracing::info!(request_id = %request_id, "handling test request");
    render_with_session(&state, &headers, pages::TEST).await
}

/// GET /health
pub async fn health(Extension(request_id): Extension<RequestId>) -> impl IntoResponse {
    tracing::debug!(request_id = %request_id, "handling health check");
    (StatusCode::OK, Json(HealthResponse::healthy(Utc::now())))
}

/// Serves the 404 page for `/404` and every unmatched route.
pub async fn not_found(Extension(request_id): Extension<RequestId>, uri: Uri) -> Response {
    tracing::info!(request_id = %request_id, path = uri.path(), "handling 404 request");
    (StatusCode::NOT_FOUND, Html(pages::NOT_FOUND)).into_response()
}

async fn render_with_session<S>(
    state: &AppState<S>,
    headers: &HeaderMap,
    body: &'static str,
) -> Result<Response, AppError>
where
    S: SessionStore,
{
    // Lossy so a stray non-ASCII pair doesn't hide the session cookie.
    let cookie_headers: Vec<_> = headers
        .get_all(COOKIE)
        .iter()
        .map(|value| String::from_utf8_lossy(value.as_bytes()))
        .collect();
    let negotiated = state
        .negotiator
        .negotiate(cookie_headers.iter().map(|header| &**header))
        .await?;

    tracing::debug!(outcome = ?negotiated.outcome, "session resolved");

    let mut response = Html(body).into_response();
    set_session_cookie(&mut response, &negotiated.cookie);
    Ok(response)
}

fn set_session_cookie(response: &mut Response, cookie: &SessionCookie) {
    match HeaderValue::from_str(&cookie.to_header_value()) {
        Ok(value) => {
            response.headers_mut().append(SET_COOKIE, value);
        }
        Err(e) => {
            tracing::warn!(error = %e, "session cookie is not a valid header value");
        }
    }
}
