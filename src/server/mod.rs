//! Local HTTP API. Requests are routed by [routes::route_request] on tokio's blocking pool so
//! a long simulation never stalls the async runtime.

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{Method, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::AppConfig;
use crate::data::DataRegistry;

pub mod api;
pub mod routes;

/// Shared per-server state handed to every request.
#[derive(Debug, Clone)]
pub struct AppState {
    pub registry: Arc<DataRegistry>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(registry: Arc<DataRegistry>, config: AppConfig) -> Self {
        Self {
            registry,
            config: Arc::new(config),
        }
    }
}

/// Static frontend build served for non-API paths when present.
const FRONTEND_DIST: &str = "frontend/dist";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", any(dispatch))
        .route("/api/*rest", any(dispatch))
        .fallback_service(ServeDir::new(PathBuf::from(FRONTEND_DIST)))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn dispatch(State(state): State<AppState>, method: Method, uri: Uri, body: Bytes) -> Response {
    let path = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());
    let method = method.as_str().to_string();
    let body = String::from_utf8_lossy(&body).into_owned();

    let task = tokio::task::spawn_blocking(move || {
        routes::route_request(&method, &path, &body, &state)
    });
    match task.await {
        Ok(response) => response.into_response(),
        Err(err) => {
            error!(error = %err, "request task failed");
            routes::error_response(500, "Internal Server Error", "request task failed")
                .into_response()
        }
    }
}

pub async fn serve(state: AppState) -> std::io::Result<()> {
    let bind_addr = state.config.bind_addr.clone();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("nshot server listening on http://{bind_addr}");
    axum::serve(listener, router(state)).await
}

/// Blocking entry point for the CLI.
pub fn run_server(state: AppState) -> std::io::Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(serve(state))
}
