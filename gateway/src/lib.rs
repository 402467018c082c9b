//! HTTP API summarizing Azure DevOps work items.

pub mod api;
pub mod config;
pub mod errors;
mod headers;
pub mod metrics_defs;

#[cfg(test)]
mod testutils;

use axum::extract::{MatchedPath, Request};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use azure_devops::{Client, ClientError};
use errors::GatewayError;
use metrics_defs::REQUEST_DURATION;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

pub use errors::ApiError;

/// Shared by every request. Read only once built.
#[derive(Clone)]
pub struct AppState {
    pub api: Arc<config::Config>,
    pub defaults: Arc<azure_devops::config::Config>,
    pub client: Client,
}

impl AppState {
    pub fn new(
        api: config::Config,
        defaults: azure_devops::config::Config,
    ) -> Result<Self, ClientError> {
        let client = Client::new(&defaults.timeouts)?;

        Ok(AppState {
            api: Arc::new(api),
            defaults: Arc::new(defaults),
            client,
        })
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(api::health::root))
        .route("/health", get(api::health::health))
        .route("/work-items", get(api::work_items::handler))
        .route("/work-item-details", get(api::work_item_details::handler))
        .route("/my-iterations", get(api::iterations::handler))
        .route("/test-connection", post(api::test_connection::handler))
        .layer(middleware::from_fn(record_request_metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves the API until ctrl-c is received.
pub async fn serve(state: AppState) -> Result<(), GatewayError> {
    let address = state.api.listener.address();
    let app = router(state);

    let listener = TcpListener::bind(&address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

async fn record_request_metrics(request: Request, next: Next) -> Response {
    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let start = Instant::now();
    let response = next.run(request).await;

    shared::histogram!(
        REQUEST_DURATION,
        "endpoint" => endpoint,
        "status" => response.status().as_u16().to_string()
    )
    .record(start.elapsed().as_secs_f64());

    response
}
