//! Field analysis over a sampled telemetry row.
//!
//! POST /api/analyze-data returns predictions plus advisories.
//! GET /api/analyze-datas returns the predictions alone.

use axum::Json;
use axum::extract::State;
use serde::Serialize;
use smartagro_ai::assess_environment;
use smartagro_core::EnvironmentAssessment;

use crate::error::ApiError;
use crate::state::SharedState;

#[derive(Debug, Serialize)]
pub struct FieldPredictions {
    pub soil: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub irradiance: f64,
    pub light: f64,
    pub irrigation: &'static str,
    pub solar_output: f64,
    pub crop_health: String,
}

#[derive(Debug, Serialize)]
pub struct DataAnalysis {
    #[serde(flatten)]
    pub predictions: FieldPredictions,
    pub irrigation_needed: &'static str,
    pub suggestions: Vec<String>,
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "Yes" } else { "No" }
}

impl From<&EnvironmentAssessment> for FieldPredictions {
    fn from(a: &EnvironmentAssessment) -> Self {
        Self {
            soil: a.features.soil_moisture_pct,
            temperature: a.features.soil_temp_c,
            humidity: a.features.humidity_pct,
            irradiance: a.features.solar_irradiance_wm2,
            light: a.features.light_lux,
            irrigation: yes_no(a.irrigation_needed),
            solar_output: a.solar_output_estimate,
            crop_health: a.crop_health_label.clone(),
        }
    }
}

impl From<EnvironmentAssessment> for DataAnalysis {
    fn from(a: EnvironmentAssessment) -> Self {
        Self {
            predictions: FieldPredictions::from(&a),
            irrigation_needed: yes_no(a.irrigation_needed),
            suggestions: a.suggestions,
        }
    }
}

/// POST /api/analyze-data
pub async fn analyze_data(
    State(state): State<SharedState>,
) -> Result<Json<DataAnalysis>, ApiError> {
    let assessment = assess(state).await.map_err(ApiError::Analysis)?;
    Ok(Json(DataAnalysis::from(assessment)))
}

/// GET /api/analyze-datas
pub async fn analyze_datas(
    State(state): State<SharedState>,
) -> Result<Json<FieldPredictions>, ApiError> {
    let assessment = assess(state).await.map_err(ApiError::Prediction)?;
    Ok(Json(FieldPredictions::from(&assessment)))
}

/// Sample a fresh row and run the field models on a blocking thread.
async fn assess(state: SharedState) -> anyhow::Result<EnvironmentAssessment> {
    tokio::task::spawn_blocking(move || -> anyhow::Result<EnvironmentAssessment> {
        let row = state.telemetry.sample()?;
        Ok(assess_environment(&state.registry, &row)?)
    })
    .await?
}
