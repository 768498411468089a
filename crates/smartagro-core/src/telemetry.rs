//! Sensor telemetry rows and their mapping onto canonical model features.
//!
//! Telemetry exports name their columns inconsistently: units may be dropped
//! ("Soil Moisture" vs "Soil Moisture (%)") and the degree and superscript-2
//! signs frequently arrive mis-decoded, either as U+FFFD replacement
//! characters or as Latin-1 mojibake ("Â°", "Â²").
//!
//! Each canonical feature therefore carries an ordered alias list. Lookup
//! walks the list and takes the first column that holds a numeric value;
//! when none does the feature resolves to `0.0`. Normalisation never fails.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Aliases for soil moisture, canonical name first.
pub const SOIL_MOISTURE_COLUMNS: &[&str] = &["Soil Moisture (%)", "Soil Moisture"];

/// Aliases for soil temperature, canonical name first.
pub const SOIL_TEMP_COLUMNS: &[&str] = &[
    "Soil Temp (°C)",
    "Soil Temp (\u{FFFD}C)",
    "Soil Temp (Â°C)",
    "Soil Temp (C)",
    "Soil Temp",
];

/// Aliases for relative humidity, canonical name first.
pub const HUMIDITY_COLUMNS: &[&str] = &["Humidity (%)", "Humidity"];

/// Aliases for solar irradiance, canonical name first.
pub const SOLAR_IRRADIANCE_COLUMNS: &[&str] = &[
    "Solar Irradiance (W/m²)",
    "Solar Irradiance (W/m\u{FFFD})",
    "Solar Irradiance (W/mÂ²)",
    "Solar Irradiance (W/m2)",
    "Solar Irradiance",
];

/// Aliases for illuminance, canonical name first.
pub const LIGHT_COLUMNS: &[&str] = &["Light (Lux)", "Light Lux", "Light"];

/// Known corrupted spellings and their repaired form.
const REPAIRS: &[(&str, &str)] = &[
    ("Â°", "°"),
    ("Â²", "²"),
    ("\u{FFFD}C", "°C"),
    ("m\u{FFFD}", "m²"),
];

/// A single telemetry cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Null,
}

impl CellValue {
    /// Numeric reading of the cell, parsing text cells when they hold a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(v) if v.is_finite() => Some(*v),
            Self::Number(_) | Self::Null => None,
            Self::Text(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        }
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

/// One row of raw telemetry keyed by column name as it appeared in the source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTelemetryRow {
    cells: HashMap<String, CellValue>,
}

impl RawTelemetryRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a cell. Column names are trimmed.
    pub fn insert(&mut self, column: impl AsRef<str>, value: impl Into<CellValue>) {
        self.cells
            .insert(column.as_ref().trim().to_string(), value.into());
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, column: impl AsRef<str>, value: impl Into<CellValue>) -> Self {
        self.insert(column, value);
        self
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.cells.get(column.trim())
    }

    /// First numeric value found among `aliases`, in priority order.
    pub fn lookup(&self, aliases: &[&str]) -> Option<f64> {
        aliases
            .iter()
            .find_map(|alias| self.get(alias).and_then(CellValue::as_f64))
    }
}

impl<K: AsRef<str>, V: Into<CellValue>> FromIterator<(K, V)> for RawTelemetryRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Self::new();
        for (k, v) in iter {
            row.insert(k, v);
        }
        row
    }
}

/// Canonical feature vector consumed by the tabular models.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CanonicalFeatures {
    pub soil_moisture_pct: f64,
    pub soil_temp_c: f64,
    pub humidity_pct: f64,
    pub solar_irradiance_wm2: f64,
    pub light_lux: f64,
}

/// Map a raw telemetry row onto [`CanonicalFeatures`].
///
/// Missing or non-numeric columns resolve to `0.0`.
pub fn normalize(row: &RawTelemetryRow) -> CanonicalFeatures {
    CanonicalFeatures {
        soil_moisture_pct: resolve(row, "soil_moisture_pct", SOIL_MOISTURE_COLUMNS),
        soil_temp_c: resolve(row, "soil_temp_c", SOIL_TEMP_COLUMNS),
        humidity_pct: resolve(row, "humidity_pct", HUMIDITY_COLUMNS),
        solar_irradiance_wm2: resolve(row, "solar_irradiance_wm2", SOLAR_IRRADIANCE_COLUMNS),
        light_lux: resolve(row, "light_lux", LIGHT_COLUMNS),
    }
}

fn resolve(row: &RawTelemetryRow, feature: &'static str, aliases: &[&str]) -> f64 {
    row.lookup(aliases).unwrap_or_else(|| {
        debug!(feature, "no usable telemetry column, defaulting to 0");
        0.0
    })
}

/// Repair a mis-decoded column name and strip surrounding whitespace.
///
/// "Soil Temp (\u{FFFD}C)" → "Soil Temp (°C)",
/// "Solar Irradiance (W/mÂ²)" → "Solar Irradiance (W/m²)".
/// Names without known corruption pass through trimmed.
pub fn repair_column_name(name: &str) -> String {
    let mut repaired = name.trim().to_string();
    for (broken, fixed) in REPAIRS {
        repaired = repaired.replace(broken, fixed);
    }
    repaired
}
