//! Threshold advisories for field conditions.
//!
//! Rules are evaluated independently, in a fixed order, and every rule that
//! applies contributes its message. Each rule has a low and a high branch with
//! strict inequalities, so a reading exactly on a threshold fires neither.

use serde::Serialize;

use crate::telemetry::CanonicalFeatures;

pub const LOW_SOIL_MOISTURE: &str = "💧 Soil moisture is low. Irrigation recommended.";
pub const SOIL_OVERSATURATED: &str = "⚠️ Soil is oversaturated. Avoid overwatering.";
pub const HEAT_STRESS: &str = "🔥 High temperature — crops might suffer heat stress.";
pub const SLOW_GROWTH: &str = "❄️ Low temperature — growth may slow down.";
pub const FUNGAL_RISK: &str = "🌫️ High humidity — fungal risk.";
pub const LOW_HUMIDITY: &str = "🥵 Low humidity — increase irrigation.";
pub const LOW_IRRADIANCE: &str = "☁️ Low irradiance — low solar output.";
pub const HIGH_IRRADIANCE: &str = "🔆 High solar input — optimize storage.";
pub const LOW_LIGHT: &str = "🌑 Low light — may affect photosynthesis.";
pub const EXCESSIVE_LIGHT: &str = "🔆 Excessive light — crop sunburn risk.";
pub const IRRIGATION_REQUIRED: &str = "💧 Model predicts irrigation is required.";

/// A two-sided threshold rule over one feature.
struct Band {
    read: fn(&CanonicalFeatures) -> f64,
    low: f64,
    low_message: &'static str,
    high: f64,
    high_message: &'static str,
}

impl Band {
    fn evaluate(&self, features: &CanonicalFeatures) -> Option<&'static str> {
        let value = (self.read)(features);
        if value < self.low {
            Some(self.low_message)
        } else if value > self.high {
            Some(self.high_message)
        } else {
            None
        }
    }
}

const RULES: [Band; 5] = [
    Band {
        read: |f| f.soil_moisture_pct,
        low: 30.0,
        low_message: LOW_SOIL_MOISTURE,
        high: 80.0,
        high_message: SOIL_OVERSATURATED,
    },
    Band {
        read: |f| f.soil_temp_c,
        low: 15.0,
        low_message: SLOW_GROWTH,
        high: 40.0,
        high_message: HEAT_STRESS,
    },
    Band {
        read: |f| f.humidity_pct,
        low: 30.0,
        low_message: LOW_HUMIDITY,
        high: 80.0,
        high_message: FUNGAL_RISK,
    },
    Band {
        read: |f| f.solar_irradiance_wm2,
        low: 300.0,
        low_message: LOW_IRRADIANCE,
        high: 800.0,
        high_message: HIGH_IRRADIANCE,
    },
    Band {
        read: |f| f.light_lux,
        low: 10_000.0,
        low_message: LOW_LIGHT,
        high: 100_000.0,
        high_message: EXCESSIVE_LIGHT,
    },
];

/// Advisories for the given conditions, in rule order.
///
/// `irrigation_needed` is the irrigation model's verdict; when set, its
/// advisory is appended last regardless of the soil-moisture rule.
pub fn advise(features: &CanonicalFeatures, irrigation_needed: bool) -> Vec<String> {
    let mut suggestions: Vec<String> = RULES
        .iter()
        .filter_map(|rule| rule.evaluate(features))
        .map(str::to_string)
        .collect();

    if irrigation_needed {
        suggestions.push(IRRIGATION_REQUIRED.to_string());
    }
    suggestions
}

/// Outcome of analysing one telemetry row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnvironmentAssessment {
    pub features: CanonicalFeatures,
    pub irrigation_needed: bool,
    /// Rounded to two decimals.
    pub solar_output_estimate: f64,
    pub crop_health_label: String,
    pub suggestions: Vec<String>,
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
