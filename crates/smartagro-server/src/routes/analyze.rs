//! POST /api/analyze - leaf photo diagnosis

use axum::Json;
use axum::body::Bytes;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use smartagro_ai::{ModelKind, analyze_image, is_allowed_upload};
use smartagro_core::DiagnosisReport;
use tracing::debug;

use crate::error::ApiError;
use crate::state::SharedState;

/// Multipart field carrying the photo.
pub const IMAGE_FIELD: &str = "image";

struct Upload {
    filename: String,
    bytes: Bytes,
}

pub async fn analyze(
    State(state): State<SharedState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<DiagnosisReport>, ApiError> {
    if !state.registry.is_available(ModelKind::LeafClassifier) {
        return Err(ApiError::ModelUnavailable);
    }

    // A body that is not multipart at all carries no file part.
    let mut multipart = multipart.map_err(|_| ApiError::MissingField)?;
    let upload = read_image(&mut multipart)
        .await?
        .ok_or(ApiError::MissingField)?;

    if upload.filename.is_empty() {
        return Err(ApiError::EmptyFilename);
    }
    if !is_allowed_upload(&upload.filename) {
        return Err(ApiError::InvalidFileType);
    }
    debug!(filename = %upload.filename, bytes = upload.bytes.len(), "received upload");

    let registry = state.registry.clone();
    let report = tokio::task::spawn_blocking(move || analyze_image(&registry, &upload.bytes))
        .await
        .map_err(|e| ApiError::ImageProcessing(e.to_string()))??;
    Ok(Json(report))
}

/// First file part named [`IMAGE_FIELD`]. Plain form fields of that name are
/// not uploads and are skipped.
async fn read_image(multipart: &mut Multipart) -> Result<Option<Upload>, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        let bytes = field.bytes().await?;
        return Ok(Some(Upload { filename, bytes }));
    }
    Ok(None)
}
