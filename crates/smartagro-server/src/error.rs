//! HTTP error responses.
//!
//! Every failure is rendered as a one-key JSON object. Upload failures and
//! the raw prediction endpoint use `"error"`; the field analysis endpoint
//! uses `"message"`, which the front end reads.

use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{Map, Value};
use smartagro_ai::AiError;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Model not available, server configuration issue")]
    ModelUnavailable,

    #[error("No image file part in the request")]
    MissingField,

    #[error("No selected file")]
    EmptyFilename,

    #[error("Invalid file type.")]
    InvalidFileType,

    #[error("Request body exceeds the upload limit")]
    PayloadTooLarge,

    #[error("Malformed multipart body: {0}")]
    Multipart(String),

    /// Detail is logged, never returned.
    #[error("An unexpected error occurred during image processing")]
    ImageProcessing(String),

    #[error("Error: {0}")]
    Analysis(anyhow::Error),

    #[error("{0}")]
    Prediction(anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingField | Self::EmptyFilename | Self::InvalidFileType | Self::Multipart(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::ModelUnavailable
            | Self::ImageProcessing(_)
            | Self::Analysis(_)
            | Self::Prediction(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn key(&self) -> &'static str {
        match self {
            Self::Analysis(_) => "message",
            _ => "error",
        }
    }
}

impl From<AiError> for ApiError {
    fn from(err: AiError) -> Self {
        match err {
            AiError::ModelUnavailable { .. } => Self::ModelUnavailable,
            other => Self::ImageProcessing(other.to_string()),
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::PayloadTooLarge
        } else {
            Self::Multipart(err.body_text())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            Self::ImageProcessing(detail) => error!(%detail, "image analysis failed"),
            Self::Analysis(err) | Self::Prediction(err) => error!(error = ?err, "field analysis failed"),
            _ if status.is_server_error() => error!(error = %self, "request failed"),
            _ => warn!(error = %self, "rejected request"),
        }
        let mut body = Map::new();
        body.insert(self.key().to_string(), Value::String(self.to_string()));
        (status, Json(body)).into_response()
    }
}
