//! Per-request breaker filter.
//!
//! # Responsibilities
//! - Derive the breaker key from route identity and request path
//! - Run the upstream call through the interception core
//! - Classify upstream status codes; a match is a failure even though no
//!   error was thrown
//! - Translate errors at the edge: circuit open → 503, timeout → 504
//! - Dispatch to the configured fallback target after a failed call
//!
//! # Design Decisions
//! - Status classification happens inside the wrapped producer, so a
//!   classified response travels the tracker's error path and the gate
//!   sees the failure before the edge decides what the caller sees
//! - The per-call deadline wraps the upstream call here, so a timeout is a
//!   reportable outcome rather than an ambient cancellation
//! - Fallback dispatch is not breaker-protected

use std::time::Duration;

use axum::body::Body;
use axum::http::request::Parts;
use axum::http::uri::{Authority, PathAndQuery, Scheme, Uri};
use axum::http::{HeaderMap, HeaderValue, Method, Request, Response, StatusCode};
use axum::response::IntoResponse;
use futures_util::StreamExt;
use thiserror::Error;
use tokio::time::timeout;

use crate::breaker::BreakerKey;
use crate::gateway::request_id::X_REQUEST_ID;
use crate::gateway::server::AppState;
use crate::intercept::{intercept_call, GateError};
use crate::observability::metrics;
use crate::routing::{CompiledRoute, FallbackTarget};

/// Failure of one wrapped upstream call.
#[derive(Debug, Error)]
pub enum ChainError {
    /// The per-call deadline elapsed. Translated to 504, never retried.
    #[error("upstream call exceeded {0:?} deadline")]
    Timeout(Duration),

    /// Transport-level failure talking to the upstream.
    #[error("upstream request failed: {0}")]
    Upstream(#[source] hyper_util::client::legacy::Error),

    /// The response arrived but its status is classified as a failure. The
    /// response is carried along so it can be surfaced unmodified when no
    /// fallback is configured.
    #[error("upstream status {status} is classified as a failure")]
    Status {
        status: StatusCode,
        response: Response<Body>,
    },
}

/// Run one request through the breaker filter for its matched route.
pub async fn run(
    state: &AppState,
    route: &CompiledRoute,
    request: Request<Body>,
    request_id: &str,
) -> Response<Body> {
    let key = BreakerKey::new(&route.name, request.uri().path());
    let gate = state.breakers.obtain(&key);

    let (parts, body) = request.into_parts();

    // Fallback dispatch may need these later; the body itself is consumed
    // by the upstream attempt.
    let method = parts.method.clone();
    let headers = parts.headers.clone();

    let upstream_req = match build_upstream_request(&parts, body, &route.upstream, request_id) {
        Ok(req) => req,
        Err(response) => return response,
    };

    let deadline = Duration::from_secs(state.timeouts.request_secs);
    let client = state.client.clone();
    let classification = route.classification.clone();

    let chain = Box::pin(async move {
        let response = match timeout(deadline, client.request(upstream_req)).await {
            Err(_) => return Err(ChainError::Timeout(deadline)),
            Ok(Err(error)) => return Err(ChainError::Upstream(error)),
            Ok(Ok(response)) => into_body_response(response),
        };

        let status = response.status();
        if classification.matches(status) {
            return Err(ChainError::Status { status, response });
        }
        Ok(response)
    });

    let mut intercepted = intercept_call(gate, chain);

    match intercepted.next().await {
        Some(Ok(response)) => {
            metrics::record_permission(&route.name, true);
            metrics::record_outcome(&route.name, true);
            response
        }
        Some(Err(GateError::Open(denied))) => {
            metrics::record_permission(&route.name, false);
            tracing::debug!(
                request_id = %request_id,
                route = %route.name,
                error = %denied,
                "circuit open, rejecting call"
            );
            error_response(StatusCode::SERVICE_UNAVAILABLE, "Circuit breaker is open")
        }
        Some(Err(GateError::Call(error))) => {
            metrics::record_permission(&route.name, true);
            metrics::record_outcome(&route.name, false);
            handle_chain_error(state, route, error, method, headers, request_id).await
        }
        None => error_response(StatusCode::BAD_GATEWAY, "Upstream produced no response"),
    }
}

/// Edge handling of a failed call. The gate has already been told.
async fn handle_chain_error(
    state: &AppState,
    route: &CompiledRoute,
    error: ChainError,
    method: Method,
    headers: HeaderMap,
    request_id: &str,
) -> Response<Body> {
    match error {
        ChainError::Timeout(deadline) => {
            tracing::warn!(
                request_id = %request_id,
                route = %route.name,
                deadline_secs = deadline.as_secs(),
                "upstream call timed out"
            );
            error_response(StatusCode::GATEWAY_TIMEOUT, "Upstream call timed out")
        }
        ChainError::Status { status, response } => {
            tracing::debug!(
                request_id = %request_id,
                route = %route.name,
                status = %status,
                "response status classified as failure"
            );
            match &route.fallback {
                Some(target) => {
                    // Discard the failed response before anything is
                    // written to the client.
                    drop(response);
                    dispatch_fallback(state, route, target, method, headers, request_id).await
                }
                None => response,
            }
        }
        ChainError::Upstream(error) => {
            tracing::error!(
                request_id = %request_id,
                route = %route.name,
                error = %error,
                "upstream request failed"
            );
            if let Some(target) = &route.fallback {
                dispatch_fallback(state, route, target, method, headers, request_id).await
            } else if route.resume_without_error {
                // The gate has seen the true outcome; only the caller is
                // shielded.
                Response::new(Body::empty())
            } else {
                error_response(StatusCode::BAD_GATEWAY, "Upstream request failed")
            }
        }
    }
}

/// Re-dispatch a failed request to the configured fallback destination.
async fn dispatch_fallback(
    state: &AppState,
    route: &CompiledRoute,
    target: &FallbackTarget,
    method: Method,
    headers: HeaderMap,
    request_id: &str,
) -> Response<Body> {
    metrics::record_fallback(&route.name);

    let uri = match resolve_fallback_uri(state, target) {
        Some(uri) => uri,
        None => {
            tracing::error!(
                request_id = %request_id,
                route = %route.name,
                "no route for fallback target"
            );
            return error_response(StatusCode::BAD_GATEWAY, "No route for fallback target");
        }
    };

    tracing::info!(
        request_id = %request_id,
        route = %route.name,
        target = %uri,
        "dispatching fallback"
    );

    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(out) = builder.headers_mut() {
        for (name, value) in headers.iter() {
            out.insert(name.clone(), value.clone());
        }
    }
    let request = match builder.body(Body::empty()) {
        Ok(request) => request,
        Err(error) => {
            tracing::error!(request_id = %request_id, error = %error, "failed to build fallback request");
            return error_response(StatusCode::BAD_GATEWAY, "Fallback dispatch failed");
        }
    };

    // Fallback dispatch is not breaker-protected: it is assumed to be
    // low-risk, static, local content.
    match state.client.request(request).await {
        Ok(response) => into_body_response(response),
        Err(error) => {
            tracing::error!(request_id = %request_id, error = %error, "fallback dispatch failed");
            error_response(StatusCode::BAD_GATEWAY, "Fallback dispatch failed")
        }
    }
}

/// Absolute URIs dispatch directly; absolute paths re-enter the route table.
fn resolve_fallback_uri(state: &AppState, target: &FallbackTarget) -> Option<Uri> {
    match target {
        FallbackTarget::Uri(uri) => Some(uri.clone()),
        FallbackTarget::Path(path) => {
            let route = state.router.match_path(path)?;
            Uri::builder()
                .scheme(Scheme::HTTP)
                .authority(route.upstream.clone())
                .path_and_query(path.as_str())
                .build()
                .ok()
        }
    }
}

/// Rewrite the incoming request to target the route's upstream.
fn build_upstream_request(
    parts: &Parts,
    body: Body,
    upstream: &Authority,
    request_id: &str,
) -> Result<Request<Body>, Response<Body>> {
    let mut builder = Request::builder()
        .method(parts.method.clone())
        .version(parts.version);

    if let Some(headers) = builder.headers_mut() {
        for (name, value) in parts.headers.iter() {
            headers.insert(name.clone(), value.clone());
        }
        if let Ok(value) = HeaderValue::from_str(request_id) {
            headers.insert(X_REQUEST_ID, value);
        }
    }

    let mut uri_parts = parts.uri.clone().into_parts();
    uri_parts.scheme = Some(Scheme::HTTP);
    uri_parts.authority = Some(upstream.clone());
    if uri_parts.path_and_query.is_none() {
        uri_parts.path_and_query = Some(PathAndQuery::from_static("/"));
    }
    let uri = Uri::from_parts(uri_parts).unwrap_or_else(|_| parts.uri.clone());

    match builder.uri(uri).body(body) {
        Ok(request) => Ok(request),
        Err(error) => {
            tracing::error!(request_id = %request_id, error = %error, "failed to build upstream request");
            Err(error_response(
                StatusCode::BAD_GATEWAY,
                "Failed to build upstream request",
            ))
        }
    }
}

/// Convert the client's streaming body into the axum body type.
fn into_body_response(response: Response<hyper::body::Incoming>) -> Response<Body> {
    let (parts, body) = response.into_parts();
    Response::from_parts(parts, Body::new(body))
}

fn error_response(status: StatusCode, message: &'static str) -> Response<Body> {
    (status, message).into_response()
}
