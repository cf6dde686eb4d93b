//! Request identification middleware.
//!
//! # Responsibilities
//! - Stamp a UUID v4 request ID on every inbound request
//! - Respect an `x-request-id` supplied by the client
//! - Echo the ID on the response for correlation
//!
//! # Design Decisions
//! - Request ID added as early as possible so every log line carries it
//! - Stored both as a header and a request extension

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::{HeaderMap, HeaderValue, Request};
use axum::response::Response;
use tower::{Layer, Service};
use uuid::Uuid;

/// Header carrying the request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Correlation ID attached to the request extensions.
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

/// Convenience accessor for the ID stamped by [`RequestIdLayer`].
pub trait RequestIdExt {
    fn request_id(&self) -> &str;
}

impl RequestIdExt for HeaderMap {
    fn request_id(&self) -> &str {
        self.get(X_REQUEST_ID)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("unknown")
    }
}

/// Tower layer that stamps a request ID on every request.
#[derive(Clone, Copy, Debug, Default)]
pub struct RequestIdLayer;

impl<S> Layer<S> for RequestIdLayer {
    type Service = RequestIdService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestIdService { inner }
    }
}

#[derive(Clone)]
pub struct RequestIdService<S> {
    inner: S,
}

impl<S> Service<Request<Body>> for RequestIdService<S>
where
    S: Service<Request<Body>, Response = Response> + Send,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Response, S::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<Body>) -> Self::Future {
        let id = request
            .headers()
            .get(X_REQUEST_ID)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        if let Ok(value) = HeaderValue::from_str(&id) {
            request.headers_mut().insert(X_REQUEST_ID, value);
        }
        request.extensions_mut().insert(RequestId(id.clone()));

        let future = self.inner.call(request);
        Box::pin(async move {
            let mut response = future.await?;
            if !response.headers().contains_key(X_REQUEST_ID) {
                if let Ok(value) = HeaderValue::from_str(&id) {
                    response.headers_mut().insert(X_REQUEST_ID, value);
                }
            }
            Ok(response)
        })
    }
}
