use smartagro_core::CoreError;
use thiserror::Error;

use crate::ModelKind;

#[derive(Debug, Error)]
pub enum AiError {
    #[error("unsupported image: {0}")]
    UnsupportedImage(String),

    #[error("{model} model is not available")]
    ModelUnavailable { model: ModelKind },

    #[error("prediction failed: {0}")]
    Prediction(String),

    #[error("crop health label index {0} is not known to the encoder")]
    UnknownLabel(i64),
}

impl From<CoreError> for AiError {
    fn from(err: CoreError) -> Self {
        Self::Prediction(err.to_string())
    }
}
