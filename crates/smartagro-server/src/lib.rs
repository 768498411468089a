//! HTTP surface: routes, error rendering and shared state.

pub mod config;
mod error;
pub mod routes;
pub mod state;

use anyhow::Context;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method, header};
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use config::Config;
pub use error::ApiError;
pub use state::{AppState, SharedState};

/// Build the router with its middleware stack.
pub fn app(state: SharedState) -> anyhow::Result<Router> {
    let origin: HeaderValue = state
        .config
        .cors_origin
        .parse()
        .with_context(|| format!("invalid CORS origin {:?}", state.config.cors_origin))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);
    let body_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Ok(Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/api/analyze", post(routes::analyze::analyze))
        .route("/api/analyze-data", post(routes::data::analyze_data))
        .route("/api/analyze-datas", get(routes::data::analyze_datas))
        .with_state(state)
        .layer(body_limit)
        .layer(TraceLayer::new_for_http())
        .layer(cors))
}
