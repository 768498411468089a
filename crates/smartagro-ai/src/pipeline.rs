//! End-to-end analyses built from the registry and the core rules.

use smartagro_core::{
    ClassificationResult, DiagnosisReport, EnvironmentAssessment, RawTelemetryRow, advise,
    compose, normalize, round2,
};
use tracing::{debug, info};

use crate::{AiError, ModelKind, ModelRegistry, preprocess};

/// Diagnose a leaf photo.
///
/// The classifier must be loaded before the upload is even decoded.
pub fn analyze_image(registry: &ModelRegistry, bytes: &[u8]) -> Result<DiagnosisReport, AiError> {
    if !registry.is_available(ModelKind::LeafClassifier) {
        return Err(AiError::ModelUnavailable {
            model: ModelKind::LeafClassifier,
        });
    }

    let tensor = preprocess(bytes)?;
    let probabilities = registry.classify_leaf(&tensor)?;
    debug!(top = ?ClassificationResult::top_k(&probabilities, 3), "leaf classification");

    let classification = ClassificationResult::from_probabilities(&probabilities)?;
    let report = compose(&classification);
    info!(
        prediction = %report.prediction,
        confidence = report.confidence,
        disease_risk = report.disease_risk,
        "leaf diagnosed"
    );
    Ok(report)
}

/// Run the three field models over one telemetry row and derive advisories.
pub fn assess_environment(
    registry: &ModelRegistry,
    row: &RawTelemetryRow,
) -> Result<EnvironmentAssessment, AiError> {
    let f = normalize(row);

    let irrigation_needed =
        registry.predict_irrigation(f.soil_moisture_pct, f.soil_temp_c, f.humidity_pct)?;
    let solar = registry.predict_solar_output(
        f.solar_irradiance_wm2,
        f.light_lux,
        f.humidity_pct,
        f.soil_temp_c,
    )?;
    let crop_score =
        registry.predict_crop_health(f.soil_moisture_pct, f.soil_temp_c, f.humidity_pct, f.light_lux)?;
    // Ties round to even.
    let crop_health_label = registry.decode_crop_health_label(crop_score.round_ties_even() as i64)?;

    let suggestions = advise(&f, irrigation_needed);
    info!(
        irrigation_needed,
        solar_output = solar,
        crop_health = %crop_health_label,
        suggestions = suggestions.len(),
        "environment assessed"
    );

    Ok(EnvironmentAssessment {
        features: f,
        irrigation_needed,
        solar_output_estimate: round2(solar),
        crop_health_label,
        suggestions,
    })
}
