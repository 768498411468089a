//! Core types and decision rules: leaf class set, telemetry normalisation,
//! diagnosis composition and threshold advisories.

pub mod advisory;
pub mod classes;
pub mod diagnosis;
mod error;
pub mod telemetry;

pub use advisory::{EnvironmentAssessment, advise, round2};
pub use classes::{LEAF_CLASSES, NUM_LEAF_CLASSES, is_healthy_label};
pub use diagnosis::{ClassificationResult, DiagnosisReport, compose};
pub use error::CoreError;
pub use telemetry::{CanonicalFeatures, CellValue, RawTelemetryRow, normalize, repair_column_name};
