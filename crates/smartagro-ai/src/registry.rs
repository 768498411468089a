//! The four inference artifacts behind one handle.
//!
//! Every slot is optional. A missing artifact only disables the operations
//! that need it; each of those then fails with [`AiError::ModelUnavailable`].

use serde::Serialize;
use smartagro_core::{ClassificationResult, NUM_LEAF_CLASSES};
use tracing::debug;

use crate::model::{CropHealthLabels, LeafClassifier, ModelKind, TabularModel, into_probabilities};
use crate::{AiError, ImageTensor};

/// Which artifacts are loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModelStatus {
    pub leaf_classifier: bool,
    pub irrigation: bool,
    pub solar_output: bool,
    pub crop_health: bool,
    pub crop_health_labels: bool,
}

/// Read-only after construction; shared across request handlers.
#[derive(Default)]
pub struct ModelRegistry {
    leaf: Option<Box<dyn LeafClassifier>>,
    irrigation: Option<Box<dyn TabularModel>>,
    solar: Option<Box<dyn TabularModel>>,
    crop_health: Option<Box<dyn TabularModel>>,
    crop_labels: Option<CropHealthLabels>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_leaf_classifier(mut self, model: impl LeafClassifier + 'static) -> Self {
        self.leaf = Some(Box::new(model));
        self
    }

    pub fn with_irrigation(mut self, model: impl TabularModel + 'static) -> Self {
        self.irrigation = Some(Box::new(model));
        self
    }

    pub fn with_solar_output(mut self, model: impl TabularModel + 'static) -> Self {
        self.solar = Some(Box::new(model));
        self
    }

    pub fn with_crop_health(mut self, model: impl TabularModel + 'static) -> Self {
        self.crop_health = Some(Box::new(model));
        self
    }

    pub fn with_crop_labels(mut self, labels: CropHealthLabels) -> Self {
        self.crop_labels = Some(labels);
        self
    }

    pub fn is_available(&self, kind: ModelKind) -> bool {
        match kind {
            ModelKind::LeafClassifier => self.leaf.is_some(),
            ModelKind::Irrigation => self.irrigation.is_some(),
            ModelKind::SolarOutput => self.solar.is_some(),
            ModelKind::CropHealth => self.crop_health.is_some(),
            ModelKind::CropHealthLabels => self.crop_labels.is_some(),
        }
    }

    pub fn status(&self) -> ModelStatus {
        ModelStatus {
            leaf_classifier: self.is_available(ModelKind::LeafClassifier),
            irrigation: self.is_available(ModelKind::Irrigation),
            solar_output: self.is_available(ModelKind::SolarOutput),
            crop_health: self.is_available(ModelKind::CropHealth),
            crop_health_labels: self.is_available(ModelKind::CropHealthLabels),
        }
    }

    /// Class probabilities for a preprocessed leaf image, one per leaf class.
    pub fn classify_leaf(&self, input: &ImageTensor) -> Result<Vec<f32>, AiError> {
        let model = self.leaf.as_deref().ok_or(AiError::ModelUnavailable {
            model: ModelKind::LeafClassifier,
        })?;

        let scores = model.predict(input)?;
        if scores.len() != NUM_LEAF_CLASSES {
            return Err(AiError::Prediction(format!(
                "leaf classifier returned {} scores, expected {NUM_LEAF_CLASSES}",
                scores.len()
            )));
        }
        if let Some(bad) = scores.iter().find(|s| !s.is_finite()) {
            return Err(AiError::Prediction(format!(
                "leaf classifier returned non-finite score {bad}"
            )));
        }
        Ok(into_probabilities(scores))
    }

    /// Classify a leaf image and keep the winning class.
    pub fn classify(&self, input: &ImageTensor) -> Result<ClassificationResult, AiError> {
        let probabilities = self.classify_leaf(input)?;
        Ok(ClassificationResult::from_probabilities(&probabilities)?)
    }

    /// Whether the field needs irrigation. Inputs: soil moisture, soil
    /// temperature, humidity.
    pub fn predict_irrigation(&self, soil: f64, temp: f64, humidity: f64) -> Result<bool, AiError> {
        let score = tabular(&self.irrigation, ModelKind::Irrigation, &[soil, temp, humidity])?;
        Ok(score.round() == 1.0)
    }

    /// Estimated solar output. Inputs: irradiance, light, humidity, soil
    /// temperature.
    pub fn predict_solar_output(
        &self,
        irradiance: f64,
        light: f64,
        humidity: f64,
        temp: f64,
    ) -> Result<f64, AiError> {
        tabular(
            &self.solar,
            ModelKind::SolarOutput,
            &[irradiance, light, humidity, temp],
        )
    }

    /// Raw crop-health score, an encoded class value. Inputs: soil moisture,
    /// soil temperature, humidity, light.
    pub fn predict_crop_health(
        &self,
        soil: f64,
        temp: f64,
        humidity: f64,
        light: f64,
    ) -> Result<f64, AiError> {
        tabular(
            &self.crop_health,
            ModelKind::CropHealth,
            &[soil, temp, humidity, light],
        )
    }

    /// Decode a crop-health class index into its label.
    pub fn decode_crop_health_label(&self, encoded: i64) -> Result<String, AiError> {
        let labels = self.crop_labels.as_ref().ok_or(AiError::ModelUnavailable {
            model: ModelKind::CropHealthLabels,
        })?;
        labels.decode(encoded).map(str::to_string)
    }
}

fn tabular(
    slot: &Option<Box<dyn TabularModel>>,
    kind: ModelKind,
    inputs: &[f64],
) -> Result<f64, AiError> {
    let model = slot
        .as_deref()
        .ok_or(AiError::ModelUnavailable { model: kind })?;
    let row: Vec<f32> = inputs.iter().map(|&v| v as f32).collect();
    let score = model.predict(&row)?;
    if !score.is_finite() {
        return Err(AiError::Prediction(format!("{kind} model returned {score}")));
    }
    debug!(model = %kind, ?inputs, score, "tabular prediction");
    Ok(score)
}
