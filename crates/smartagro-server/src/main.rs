use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use smartagro_ai::ModelRegistry;
use smartagro_server::{AppState, Config, app};
use smartagro_store::CsvTelemetry;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();
    info!("smartagro v{}", env!("CARGO_PKG_VERSION"));

    let registry = load_registry(&config);
    let telemetry = CsvTelemetry::new(&config.telemetry_csv);
    if !telemetry.path().exists() {
        warn!(path = %telemetry.path().display(), "telemetry csv not found, field analysis will fail");
    }

    let addr = config.bind_address();
    let state = Arc::new(AppState::new(config, registry, telemetry));
    let router = app(state)?;

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "listening");
    axum::serve(listener, router).await?;
    Ok(())
}

#[cfg(feature = "onnx")]
fn load_registry(config: &Config) -> ModelRegistry {
    ModelRegistry::load(&config.models_dir)
}

#[cfg(not(feature = "onnx"))]
fn load_registry(config: &Config) -> ModelRegistry {
    warn!(dir = %config.models_dir.display(), "built without onnx support, no models loaded");
    ModelRegistry::new()
}
