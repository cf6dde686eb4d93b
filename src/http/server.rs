//! HTTP server setup and request handlers.
//!
//! # Responsibilities
//! - Create Axum Router with the /api and /health handlers
//! - Wire up middleware (tracing, CORS, timeout, body limit, request ID)
//! - Bind server to listener, drain gracefully on shutdown
//! - Dispatch GET / POST requests to the forwarder

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{DefaultBodyLimit, FromRequest, Multipart, RawQuery, Request, State},
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use url::Url;

use crate::config::ForwarderConfig;
use crate::forward::{query_param, ForwardError, Forwarder, UploadedFile};
use crate::http::request::{RequestIdExt, RequestIdLayer};
use crate::http::response::{error_response, relay_response};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub forwarder: Arc<Forwarder>,
    pub max_body_bytes: usize,
}

/// HTTP server for the forwarding proxy.
pub struct HttpServer {
    router: Router,
    config: ForwarderConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ForwarderConfig) -> Result<Self, ForwardError> {
        let target = Url::parse(&config.target.url)?;
        let timeout = Duration::from_secs(config.timeouts.request_secs);
        let forwarder = Arc::new(Forwarder::new(target, timeout)?);

        let state = AppState {
            forwarder,
            max_body_bytes: config.limits.max_body_bytes,
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ForwarderConfig, state: AppState) -> Router {
        // Permissive CORS: any origin, GET/POST plus preflight.
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

        Router::new()
            .route("/api", get(api_get).post(api_post))
            .route("/health", get(health))
            .with_state(state)
            .layer(DefaultBodyLimit::max(config.limits.max_body_bytes))
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(RequestIdLayer)
            .layer(TraceLayer::new_for_http())
            .layer(cors)
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        let app = self.router.into_make_service();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ForwarderConfig {
        &self.config
    }
}

/// Health check endpoint. Never touches the upstream.
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// GET /api: copy the query onto the target URL and relay the reply.
async fn api_get(
    State(state): State<AppState>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Response {
    let request_id = headers.request_id().to_owned();
    let query = query.unwrap_or_default();

    let Some(action) = query_param(&query, "action").filter(|a| !a.is_empty()) else {
        tracing::warn!(request_id = %request_id, "Missing action parameter");
        return error_response(StatusCode::BAD_REQUEST, "Missing action parameter");
    };

    tracing::debug!(
        request_id = %request_id,
        action = %action,
        "Handling GET request"
    );

    match state.forwarder.forward_get(&query).await {
        Ok(reply) => relay_response(reply),
        Err(err) => {
            tracing::error!(request_id = %request_id, action = %action, error = %err, "Proxy error");
            err.into_response()
        }
    }
}

/// POST /api: forward uploads as a rebuilt multipart form, other bodies verbatim.
async fn api_post(State(state): State<AppState>, request: Request<Body>) -> Response {
    let request_id = request.headers().request_id().to_owned();
    let query = request.uri().query().unwrap_or_default().to_owned();

    let Some(action) = query_param(&query, "action").filter(|a| !a.is_empty()) else {
        tracing::warn!(request_id = %request_id, "Missing action parameter");
        return error_response(StatusCode::BAD_REQUEST, "Missing action parameter");
    };

    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let is_multipart = content_type
        .as_deref()
        .map(|ct| ct.starts_with("multipart/form-data"))
        .unwrap_or(false);

    tracing::debug!(
        request_id = %request_id,
        action = %action,
        multipart = is_multipart,
        "Handling POST request"
    );

    let result = if is_multipart {
        match read_multipart(&state, request).await {
            Ok((data, files)) => {
                state
                    .forwarder
                    .forward_form(&query, &action, data, files)
                    .await
            }
            Err(err) => Err(err),
        }
    } else {
        match axum::body::to_bytes(request.into_body(), state.max_body_bytes).await {
            Ok(bytes) => {
                state
                    .forwarder
                    .forward_body(&query, content_type, bytes.to_vec())
                    .await
            }
            Err(err) => Err(ForwardError::InboundBody(err.to_string())),
        }
    };

    match result {
        Ok(reply) => relay_response(reply),
        Err(err) => {
            tracing::error!(request_id = %request_id, action = %action, error = %err, "Proxy error");
            err.into_response()
        }
    }
}

/// Drain an inbound multipart body into the optional `data` field and the
/// buffered file list. Fields with a filename count as files; other text
/// fields besides `data` are ignored (the query already carries them).
async fn read_multipart(
    state: &AppState,
    request: Request<Body>,
) -> Result<(Option<String>, Vec<UploadedFile>), ForwardError> {
    let mut multipart = Multipart::from_request(request, state)
        .await
        .map_err(|err| ForwardError::InboundBody(err.to_string()))?;

    let mut data = None;
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ForwardError::InboundBody(err.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_owned();
        let filename = field.file_name().map(str::to_owned);
        let content_type = field.content_type().map(str::to_owned);

        if filename.is_some() {
            let bytes = field
                .bytes()
                .await
                .map_err(|err| ForwardError::InboundBody(err.to_string()))?
                .to_vec();
            files.push(UploadedFile {
                filename,
                content_type,
                bytes,
            });
        } else if name == "data" {
            data = Some(
                field
                    .text()
                    .await
                    .map_err(|err| ForwardError::InboundBody(err.to_string()))?,
            );
        }
    }

    Ok((data, files))
}
