//! Leaf classification results and the diagnosis report derived from them.

use serde::{Deserialize, Serialize};

use crate::CoreError;
use crate::classes::{LEAF_CLASSES, NUM_LEAF_CLASSES, is_healthy_label};

/// Growth stage reported for every diagnosis.
///
/// Placeholder: not derived from the image. A stage model would replace this.
pub const PLACEHOLDER_GROWTH_STAGE: &str = "Vegetative";

/// Affected plant part reported when disease risk is non-zero.
///
/// Placeholder: not derived from the image.
pub const PLACEHOLDER_AFFECTED_STAGE: &str = "Leaves";

/// Affected plant part reported for healthy leaves.
pub const UNAFFECTED_STAGE: &str = "None";

pub const ANALYSIS_COMPLETE: &str = "Analysis complete";

/// Winning class of a leaf classification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    /// Member of [`LEAF_CLASSES`].
    pub label: &'static str,
    /// Probability of `label`, in `[0, 1]`.
    pub confidence: f32,
}

impl ClassificationResult {
    /// Pick the most probable class from a full probability vector.
    ///
    /// Ties resolve to the lowest index.
    pub fn from_probabilities(probabilities: &[f32]) -> Result<Self, CoreError> {
        if probabilities.len() != NUM_LEAF_CLASSES {
            return Err(CoreError::ClassCount {
                expected: NUM_LEAF_CLASSES,
                actual: probabilities.len(),
            });
        }
        if probabilities.iter().any(|p| !p.is_finite()) {
            return Err(CoreError::NonFinite);
        }

        let mut best = 0;
        for (i, &p) in probabilities.iter().enumerate().skip(1) {
            if p > probabilities[best] {
                best = i;
            }
        }

        Ok(Self {
            label: LEAF_CLASSES[best],
            confidence: probabilities[best].clamp(0.0, 1.0),
        })
    }

    /// The `k` most probable classes, highest first.
    pub fn top_k(probabilities: &[f32], k: usize) -> Vec<(&'static str, f32)> {
        let mut indexed: Vec<(usize, f32)> = probabilities
            .iter()
            .copied()
            .enumerate()
            .take(NUM_LEAF_CLASSES)
            .collect();
        indexed.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        indexed
            .into_iter()
            .take(k)
            .map(|(i, p)| (LEAF_CLASSES[i], p))
            .collect()
    }
}

/// Diagnosis returned for an analysed leaf image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisReport {
    pub prediction: String,
    pub confidence: f32,
    /// 0 for healthy labels, otherwise `round(confidence * 100)`.
    pub disease_risk: u8,
    pub growth_stage: String,
    pub affected_stage: String,
    pub message: String,
}

/// Build a [`DiagnosisReport`] from a classification.
pub fn compose(classification: &ClassificationResult) -> DiagnosisReport {
    let disease_risk = disease_risk(classification.label, classification.confidence);
    let affected_stage = if disease_risk > 0 {
        PLACEHOLDER_AFFECTED_STAGE
    } else {
        UNAFFECTED_STAGE
    };

    DiagnosisReport {
        prediction: classification.label.to_string(),
        confidence: classification.confidence,
        disease_risk,
        growth_stage: PLACEHOLDER_GROWTH_STAGE.to_string(),
        affected_stage: affected_stage.to_string(),
        message: ANALYSIS_COMPLETE.to_string(),
    }
}

/// Risk score in `0..=100`.
pub fn disease_risk(label: &str, confidence: f32) -> u8 {
    if is_healthy_label(label) {
        return 0;
    }
    (confidence.clamp(0.0, 1.0) * 100.0).round() as u8
}
