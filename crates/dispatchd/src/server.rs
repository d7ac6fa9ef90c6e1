//! HTTP server for dispatchd.

use crate::routes;
use anyhow::Result;
use axum::Router;
use dispatch_common::DispatchPredictor;
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Application state shared across handlers.
///
/// The predictor is immutable after load, so concurrent requests share it
/// without locking; nothing here is ever reassigned while serving.
pub struct AppState {
    pub predictor: Arc<DispatchPredictor>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(predictor: DispatchPredictor) -> Self {
        Self {
            predictor: Arc::new(predictor),
            start_time: Instant::now(),
        }
    }
}

/// Build the full application router.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(routes::predict_routes())
        .merge(routes::health_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Run the HTTP server until the process is stopped.
pub async fn run(state: AppState, addr: &str) -> Result<()> {
    let state = Arc::new(state);
    let router = app(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("  Listening on http://{}", addr);

    axum::serve(listener, router).await?;
    Ok(())
}
