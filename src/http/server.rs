//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with a single catch-all handler
//! - Wire up middleware (tracing, timeout, request ID)
//! - Dispatch every path to the routing engine against the current snapshot
//! - Serve until the shutdown signal

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ConfigStore;
use crate::http::request::{request_id, UuidRequestId};
use crate::http::response;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::routing::{self, DispatchError};

/// Upper bound on a single request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ConfigStore>,
}

/// HTTP server answering NoCloud requests.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(store: Arc<ConfigStore>) -> Self {
        let router = Self::build_router(AppState { store });
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(state: AppState) -> Router {
        Router::new()
            .fallback(nocloud_handler)
            .with_state(state)
            .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
    }

    /// The router, for embedding or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(Shutdown::wait(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Catch-all handler: match the path and render the NoCloud document.
async fn nocloud_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let path = request.uri().path();
    let request_id = request_id(request.headers());
    let remote_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    // One snapshot for the whole request, even if a reload lands meanwhile.
    let snapshot = state.store.current();

    let dispatched =
        routing::decode_path(path).and_then(|decoded| routing::dispatch(&snapshot, &decoded));
    match dispatched {
        Ok(dispatched) => {
            tracing::info!(
                request_id = %request_id,
                remote_addr = %remote_addr,
                rule = %dispatched.rule.name(),
                path = %path,
                "Returning config"
            );
            metrics::record_request(dispatched.rule.name(), dispatched.endpoint.as_str(), 200);
            response::ok(dispatched.body)
        }
        Err(err) => {
            let status = response::status_of(&err);
            match &err {
                DispatchError::Render { rule, source } => tracing::error!(
                    request_id = %request_id,
                    remote_addr = %remote_addr,
                    rule = %rule,
                    path = %path,
                    error = %source,
                    "Failed to render meta-data"
                ),
                _ => tracing::debug!(
                    request_id = %request_id,
                    remote_addr = %remote_addr,
                    path = %path,
                    reason = %err,
                    "Not found"
                ),
            }
            metrics::record_request(err.rule().unwrap_or("none"), "none", status.as_u16());
            err.into_response()
        }
    }
}
