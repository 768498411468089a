//! Model seams: the leaf classifier, the tabular field models and the
//! crop-health label decoder.

use std::fmt;
use std::path::Path;

use anyhow::Context;
use serde::Serialize;

use crate::{AiError, ImageTensor};

/// The artifacts held by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    LeafClassifier,
    Irrigation,
    SolarOutput,
    CropHealth,
    CropHealthLabels,
}

impl ModelKind {
    pub const ALL: [ModelKind; 5] = [
        Self::LeafClassifier,
        Self::Irrigation,
        Self::SolarOutput,
        Self::CropHealth,
        Self::CropHealthLabels,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LeafClassifier => "leaf_classifier",
            Self::Irrigation => "irrigation",
            Self::SolarOutput => "solar_output",
            Self::CropHealth => "crop_health",
            Self::CropHealthLabels => "crop_health_labels",
        }
    }

    /// Artifact file name inside the models directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::LeafClassifier => "leaf_disease.onnx",
            Self::Irrigation => "irrigation.onnx",
            Self::SolarOutput => "solar_output.onnx",
            Self::CropHealth => "crop_health.onnx",
            Self::CropHealthLabels => "crop_health_labels.json",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Leaf-disease image classifier.
pub trait LeafClassifier: Send + Sync {
    /// Class scores for one image, one per leaf class. Scores may be
    /// probabilities or logits; the registry normalises them.
    fn predict(&self, input: &ImageTensor) -> Result<Vec<f32>, AiError>;
}

/// Single-row tabular regressor or classifier.
pub trait TabularModel: Send + Sync {
    /// First output value for one feature row.
    fn predict(&self, features: &[f32]) -> Result<f64, AiError>;
}

/// Inverse of the label encoder fitted alongside the crop-health model.
#[derive(Debug, Clone, PartialEq)]
pub struct CropHealthLabels {
    labels: Vec<String>,
}

impl CropHealthLabels {
    pub fn new(labels: Vec<String>) -> Self {
        Self { labels }
    }

    /// Load from a JSON array of label strings, ordered by encoded value.
    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let labels: Vec<String> = serde_json::from_str(&raw)
            .with_context(|| format!("parsing {}", path.display()))?;
        anyhow::ensure!(!labels.is_empty(), "{} holds no labels", path.display());
        Ok(Self { labels })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Label for an encoded class value.
    pub fn decode(&self, encoded: i64) -> Result<&str, AiError> {
        usize::try_from(encoded)
            .ok()
            .and_then(|i| self.labels.get(i))
            .map(String::as_str)
            .ok_or(AiError::UnknownLabel(encoded))
    }
}

/// Turn raw class scores into a probability distribution.
///
/// Scores that already form a distribution are returned unchanged; anything
/// else is treated as logits and passed through a softmax.
pub fn into_probabilities(scores: Vec<f32>) -> Vec<f32> {
    let in_range = scores.iter().all(|s| (0.0..=1.0).contains(s));
    let sum: f32 = scores.iter().sum();
    if in_range && (sum - 1.0).abs() < 1e-3 {
        return scores;
    }
    softmax(&scores)
}

fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&x| (x - max).exp()).collect();
    let total: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}
