//! Shared application state.

use std::sync::Arc;
use std::time::Instant;

use smartagro_ai::ModelRegistry;
use smartagro_store::TelemetrySource;

use crate::config::Config;

pub struct AppState {
    pub config: Config,
    pub registry: Arc<ModelRegistry>,
    pub telemetry: Arc<dyn TelemetrySource>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(
        config: Config,
        registry: ModelRegistry,
        telemetry: impl TelemetrySource + 'static,
    ) -> Self {
        Self {
            config,
            registry: Arc::new(registry),
            telemetry: Arc::new(telemetry),
            started_at: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

pub type SharedState = Arc<AppState>;
