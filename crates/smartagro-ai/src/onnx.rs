//! ONNX Runtime adapters.
//!
//! Sessions need exclusive access to run, so each one sits behind a mutex.
//! Inference calls are synchronous; callers on an async runtime should move
//! them onto a blocking thread.

use std::fmt::Display;
use std::path::Path;
use std::sync::Mutex;

use ort::session::Session;
use ort::value::{DynValue, Tensor};
use tracing::{info, warn};

use crate::model::{CropHealthLabels, ModelKind};
use crate::{AiError, ImageTensor, LeafClassifier, ModelRegistry, TabularModel};

fn prediction_error(err: impl Display) -> AiError {
    AiError::Prediction(err.to_string())
}

fn open_session(path: &Path) -> anyhow::Result<Session> {
    anyhow::ensure!(path.exists(), "{} not found", path.display());
    Ok(Session::builder()?.commit_from_file(path)?)
}

/// Leaf-disease CNN taking a `(1, 128, 128, 3)` float input.
pub struct OnnxLeafClassifier {
    session: Mutex<Session>,
}

impl OnnxLeafClassifier {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let session = open_session(path)?;
        info!(model = %path.display(), "loaded leaf classifier");
        Ok(Self {
            session: Mutex::new(session),
        })
    }
}

impl LeafClassifier for OnnxLeafClassifier {
    fn predict(&self, input: &ImageTensor) -> Result<Vec<f32>, AiError> {
        let shape = input.shape().map(|d| d as i64);
        let tensor = Tensor::from_array((shape, input.data().to_vec().into_boxed_slice()))
            .map_err(prediction_error)?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| AiError::Prediction("leaf classifier session poisoned".into()))?;
        let outputs = session
            .run(ort::inputs![tensor])
            .map_err(prediction_error)?;
        let (_, scores) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(prediction_error)?;
        Ok(scores.to_vec())
    }
}

/// Tabular model exported from a fitted estimator, taking a `(1, n)` float
/// row. The first output is read whether the estimator emits floats or an
/// integer class label.
pub struct OnnxTabularModel {
    kind: ModelKind,
    session: Mutex<Session>,
}

impl OnnxTabularModel {
    pub fn load(kind: ModelKind, path: &Path) -> anyhow::Result<Self> {
        let session = open_session(path)?;
        info!(model = %kind, path = %path.display(), "loaded tabular model");
        Ok(Self {
            kind,
            session: Mutex::new(session),
        })
    }
}

impl TabularModel for OnnxTabularModel {
    fn predict(&self, features: &[f32]) -> Result<f64, AiError> {
        let shape = [1_i64, features.len() as i64];
        let tensor = Tensor::from_array((shape, features.to_vec().into_boxed_slice()))
            .map_err(prediction_error)?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| AiError::Prediction(format!("{} session poisoned", self.kind)))?;
        let outputs = session
            .run(ort::inputs![tensor])
            .map_err(prediction_error)?;
        first_scalar(&outputs[0])
            .ok_or_else(|| AiError::Prediction(format!("{} model produced no output", self.kind)))
    }
}

fn first_scalar(value: &DynValue) -> Option<f64> {
    if let Ok((_, data)) = value.try_extract_tensor::<f32>() {
        return data.first().map(|&v| f64::from(v));
    }
    if let Ok((_, data)) = value.try_extract_tensor::<i64>() {
        return data.first().map(|&v| v as f64);
    }
    if let Ok((_, data)) = value.try_extract_tensor::<f64>() {
        return data.first().copied();
    }
    None
}

impl ModelRegistry {
    /// Load every artifact found in `models_dir`.
    ///
    /// An artifact that is missing or fails to load is logged and left out;
    /// the remaining ones are still served.
    pub fn load(models_dir: &Path) -> Self {
        let mut registry = ModelRegistry::new();

        let path = models_dir.join(ModelKind::LeafClassifier.file_name());
        match OnnxLeafClassifier::load(&path) {
            Ok(model) => registry = registry.with_leaf_classifier(model),
            Err(e) => warn!(model = %ModelKind::LeafClassifier, error = %e, "model unavailable"),
        }

        for kind in [ModelKind::Irrigation, ModelKind::SolarOutput, ModelKind::CropHealth] {
            let path = models_dir.join(kind.file_name());
            match OnnxTabularModel::load(kind, &path) {
                Ok(model) => {
                    registry = match kind {
                        ModelKind::Irrigation => registry.with_irrigation(model),
                        ModelKind::SolarOutput => registry.with_solar_output(model),
                        _ => registry.with_crop_health(model),
                    }
                }
                Err(e) => warn!(model = %kind, error = %e, "model unavailable"),
            }
        }

        let path = models_dir.join(ModelKind::CropHealthLabels.file_name());
        match CropHealthLabels::from_json_file(&path) {
            Ok(labels) => {
                info!(labels = labels.len(), "loaded crop health labels");
                registry = registry.with_crop_labels(labels);
            }
            Err(e) => warn!(model = %ModelKind::CropHealthLabels, error = %e, "model unavailable"),
        }

        let status = registry.status();
        info!(?status, dir = %models_dir.display(), "model registry ready");
        registry
    }
}
