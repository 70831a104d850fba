//! Request ID handling.
//!
//! # Responsibilities
//! - Stamp a unique request ID on requests that arrive without one
//! - Keep the ID flowing to upstream calls and logs
//!
//! # Design Decisions
//! - Added as early as possible so every log line can carry it
//! - Incoming IDs are trusted and preserved

use std::task::{Context, Poll};

use axum::http::{HeaderValue, Request};
use tower::{Layer, Service};
use uuid::Uuid;

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Layer that stamps `x-request-id` on incoming requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestIdLayer;

impl<S> Layer<S> for RequestIdLayer {
    type Service = RequestIdService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestIdService { inner }
    }
}

/// Service produced by [`RequestIdLayer`].
#[derive(Debug, Clone)]
pub struct RequestIdService<S> {
    inner: S,
}

impl<S, B> Service<Request<B>> for RequestIdService<S>
where
    S: Service<Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<B>) -> Self::Future {
        if !request.headers().contains_key(X_REQUEST_ID) {
            if let Ok(value) = HeaderValue::from_str(&Uuid::new_v4().to_string()) {
                request.headers_mut().insert(X_REQUEST_ID, value);
            }
        }
        self.inner.call(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    use std::sync::{Arc, Mutex};

    /// Probe service that records the request ID it received.
    struct Probe {
        seen: Arc<Mutex<Option<String>>>,
    }

    impl Service<Request<Body>> for Probe {
        type Response = ();
        type Error = std::convert::Infallible;
        type Future = std::future::Ready<Result<(), Self::Error>>;

        fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }

        fn call(&mut self, request: Request<Body>) -> Self::Future {
            *self.seen.lock().unwrap() = request
                .headers()
                .get(X_REQUEST_ID)
                .and_then(|v| v.to_str().ok())
                .map(|v| v.to_string());
            std::future::ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn test_missing_id_is_stamped() {
        let seen = Arc::new(Mutex::new(None));
        let mut service = RequestIdLayer.layer(Probe { seen: seen.clone() });

        let request = Request::builder().body(Body::empty()).unwrap();
        service.call(request).await.unwrap();

        let id = seen.lock().unwrap().clone().expect("id should be stamped");
        assert!(!id.is_empty());
    }

    #[tokio::test]
    async fn test_existing_id_is_preserved() {
        let seen = Arc::new(Mutex::new(None));
        let mut service = RequestIdLayer.layer(Probe { seen: seen.clone() });

        let request = Request::builder()
            .header(X_REQUEST_ID, "abc-123")
            .body(Body::empty())
            .unwrap();
        service.call(request).await.unwrap();

        assert_eq!(seen.lock().unwrap().as_deref(), Some("abc-123"));
    }
}
