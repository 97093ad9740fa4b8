use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

mod config;
mod dashboard;
mod predictor;

use config::Config;
use dashboard::AppState;
use predictor::model::SUPPORTED_FORMAT_VERSION;
use predictor::{LogisticPipeline, WinModel};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    // A model that cannot be loaded is fatal: no predictions are served.
    let model = load_model(&config.model_path)?;
    let info = model.describe();
    info!(
        "Model loaded from {} ({} v{}, trained with {})",
        config.model_path,
        info.kind,
        info.format_version,
        info.trained_with.as_deref().unwrap_or("unknown toolchain")
    );

    let app = dashboard::router(AppState {
        model: Arc::new(model),
    });
    let addr: SocketAddr = config.listen_addr.parse()?;
    info!("Prediction form listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}

/// Load the classifier, attaching the supported format version so a stale
/// export is diagnosable from the exit message alone.
fn load_model(path: impl AsRef<Path>) -> Result<LogisticPipeline> {
    let path = path.as_ref();
    LogisticPipeline::load(path).with_context(|| {
        format!(
            "loading model from {} (this build reads format version {}; re-export the \
             classifier from the training environment)",
            path.display(),
            SUPPORTED_FORMAT_VERSION
        )
    })
}
