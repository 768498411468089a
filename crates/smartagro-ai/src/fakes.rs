//! In-memory models for unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use smartagro_core::NUM_LEAF_CLASSES;

use crate::{AiError, ImageTensor, LeafClassifier, TabularModel};

/// Returns the same scores for every image and counts calls.
pub struct FixedClassifier {
    scores: Vec<f32>,
    calls: Arc<AtomicUsize>,
}

impl FixedClassifier {
    pub fn new(scores: Vec<f32>) -> Self {
        Self {
            scores,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A distribution with `confidence` on `index` and the rest spread evenly.
    pub fn winner(index: usize, confidence: f32) -> Self {
        let rest = (1.0 - confidence) / (NUM_LEAF_CLASSES as f32 - 1.0);
        let mut scores = vec![rest; NUM_LEAF_CLASSES];
        scores[index] = confidence;
        Self::new(scores)
    }

    pub fn calls(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

impl LeafClassifier for FixedClassifier {
    fn predict(&self, input: &ImageTensor) -> Result<Vec<f32>, AiError> {
        assert_eq!(input.shape(), ImageTensor::SHAPE);
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.scores.clone())
    }
}

/// Always predicts the same value.
pub struct FixedScore(pub f64);

impl TabularModel for FixedScore {
    fn predict(&self, _features: &[f32]) -> Result<f64, AiError> {
        Ok(self.0)
    }
}

/// Records the last feature row it was given.
pub struct RecordingModel {
    score: f64,
    inputs: Arc<Mutex<Vec<f32>>>,
}

impl RecordingModel {
    pub fn new(score: f64) -> Self {
        Self {
            score,
            inputs: Arc::default(),
        }
    }

    pub fn inputs(&self) -> Arc<Mutex<Vec<f32>>> {
        self.inputs.clone()
    }
}

impl TabularModel for RecordingModel {
    fn predict(&self, features: &[f32]) -> Result<f64, AiError> {
        *self.inputs.lock().unwrap() = features.to_vec();
        Ok(self.score)
    }
}
