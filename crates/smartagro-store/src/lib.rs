//! Telemetry sources: one raw sensor row per request.

mod csv_source;
mod error;

pub use csv_source::{CsvTelemetry, read_telemetry_csv, row_at};
pub use error::StoreError;

use smartagro_core::RawTelemetryRow;

/// A provider of raw telemetry rows.
pub trait TelemetrySource: Send + Sync {
    /// Draw one row.
    fn sample(&self) -> Result<RawTelemetryRow, StoreError>;
}
