//! Dispatch daemon - serves ticket dispatch predictions over HTTP.
//!
//! Loads the trained model artifact once at startup and shares it
//! read-only across requests. A missing or corrupt artifact is fatal: the
//! daemon must not come up in a state where it would return garbage.

use anyhow::{Context, Result};
use dispatch_common::{DispatchConfig, DispatchPredictor};
use dispatchd::server::{self, AppState};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config = DispatchConfig::load();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log.level.clone())),
        )
        .init();

    info!("dispatchd v{} starting", env!("CARGO_PKG_VERSION"));

    let predictor = DispatchPredictor::load(&config.paths.model_file)
        .with_context(|| {
            format!(
                "cannot load model artifact from {}",
                config.paths.model_file.display()
            )
        })?;
    info!(
        "Model loaded: {} techs, trained {}",
        predictor.classes().len(),
        predictor.trained_at().to_rfc3339()
    );

    let state = AppState::new(predictor);
    server::run(state, &config.server.listen_addr).await
}
