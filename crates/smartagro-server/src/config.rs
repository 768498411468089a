use std::path::PathBuf;

use clap::Parser;

/// Five megabytes, the largest accepted upload.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// SmartAgro inference server
#[derive(Parser, Debug, Clone)]
#[command(name = "smartagro", version, about = "HTTP API for leaf diagnosis and field analysis")]
pub struct Config {
    /// Host to bind to
    #[arg(long, env = "SMARTAGRO_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "SMARTAGRO_PORT", default_value_t = 5000)]
    pub port: u16,

    /// Directory holding the model artifacts
    #[arg(long, env = "SMARTAGRO_MODELS_DIR", default_value = "models")]
    pub models_dir: PathBuf,

    /// Telemetry CSV sampled by the field analysis endpoints
    #[arg(long, env = "SMARTAGRO_TELEMETRY_CSV", default_value = "mock_agro_solar_data.csv")]
    pub telemetry_csv: PathBuf,

    /// Front-end origin allowed to call the API with credentials
    #[arg(long, env = "SMARTAGRO_CORS_ORIGIN", default_value = "http://localhost:5173")]
    pub cors_origin: String,

    /// Request body limit in bytes
    #[arg(long, env = "SMARTAGRO_MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
