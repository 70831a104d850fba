//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the axum Router with the wildcard proxy handler
//! - Wire up middleware (tracing, backstop timeout, request ID)
//! - Hold shared state: route table, breaker registry, upstream client
//! - Serve with graceful shutdown

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::breaker::BreakerRegistry;
use crate::config::schema::{GatewayConfig, TimeoutConfig};
use crate::config::validation::ValidationError;
use crate::gateway::filter;
use crate::gateway::request_id::{RequestIdLayer, X_REQUEST_ID};
use crate::observability::metrics;
use crate::routing::Router as RouteTable;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<RouteTable>,
    pub breakers: Arc<BreakerRegistry>,
    pub client: Client<HttpConnector, Body>,
    pub timeouts: TimeoutConfig,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    /// Create a server with operator-controlled gates.
    pub fn new(config: GatewayConfig) -> Result<Self, ValidationError> {
        Self::with_registry(config, Arc::new(BreakerRegistry::with_manual_gates()))
    }

    /// Create a server with an injected gate registry (custom gate
    /// factories, tests).
    pub fn with_registry(
        config: GatewayConfig,
        breakers: Arc<BreakerRegistry>,
    ) -> Result<Self, ValidationError> {
        let route_table = Arc::new(RouteTable::from_config(&config.routes)?);

        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(config.timeouts.connect_secs)));
        let client = Client::builder(TokioExecutor::new()).build(connector);

        let state = AppState {
            router: route_table,
            breakers,
            client,
            timeouts: config.timeouts.clone(),
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        // The authoritative per-call deadline lives in the filter, where a
        // timeout is a reportable outcome; this outer layer is a backstop.
        let backstop = Duration::from_secs(config.timeouts.request_secs.saturating_mul(2));

        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(backstop))
            .layer(RequestIdLayer)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self.router.into_make_service();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Main proxy handler: look up the route and run the breaker filter.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> impl IntoResponse {
    let start_time = Instant::now();
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let path = request.uri().path().to_string();
    let method = request.method().to_string();

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        "proxying request"
    );

    let Some(route) = state.router.match_path(&path) else {
        tracing::warn!(request_id = %request_id, path = %path, "no route matched");
        metrics::record_request(&method, 404, "none", start_time);
        return (StatusCode::NOT_FOUND, "No matching route found").into_response();
    };

    let response: Response = filter::run(&state, route, request, &request_id).await;
    metrics::record_request(&method, response.status().as_u16(), &route.name, start_time);
    response
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received");
}
