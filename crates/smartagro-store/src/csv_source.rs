//! CSV telemetry source.
//!
//! The file is re-read on every sample so that an updated export is picked up
//! without a restart. Bytes are decoded lossily: header cells written in a
//! legacy code page come through with U+FFFD in place of "°" or "²" and are
//! repaired with [`repair_column_name`] before the schema is built.

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::csv::ReaderBuilder;
use arrow::csv::reader::Format;
use arrow::datatypes::{DataType, Field, Float64Type, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::display::array_value_to_string;
use rand::Rng;
use smartagro_core::{CellValue, RawTelemetryRow, repair_column_name};
use tracing::{debug, info};

use crate::{StoreError, TelemetrySource};

/// Telemetry sampled uniformly at random from a CSV export.
#[derive(Debug, Clone)]
pub struct CsvTelemetry {
    path: PathBuf,
}

impl CsvTelemetry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Draw one row using the supplied random source.
    pub fn sample_with<R: Rng>(&self, rng: &mut R) -> Result<RawTelemetryRow, StoreError> {
        let batches = read_telemetry_csv(&self.path)?;
        let rows: usize = batches.iter().map(|b| b.num_rows()).sum();
        if rows == 0 {
            return Err(StoreError::Empty);
        }
        let index = rng.gen_range(0..rows);
        debug!(index, rows, "sampled telemetry row");
        row_at(&batches, index)
    }
}

impl TelemetrySource for CsvTelemetry {
    fn sample(&self) -> Result<RawTelemetryRow, StoreError> {
        self.sample_with(&mut rand::thread_rng())
    }
}

/// Read a telemetry CSV into Arrow batches with repaired column names.
pub fn read_telemetry_csv(path: &Path) -> Result<Vec<RecordBatch>, StoreError> {
    if !path.exists() {
        return Err(StoreError::NotFound(path.to_path_buf()));
    }

    let bytes = std::fs::read(path)?;
    let text = String::from_utf8_lossy(&bytes).into_owned();
    let mut cursor = Cursor::new(text.into_bytes());

    let format = Format::default().with_header(true);
    let (inferred, _) = format.infer_schema(&mut cursor, None)?;
    cursor.set_position(0);

    let schema = Arc::new(repair_schema(&inferred));
    let reader = ReaderBuilder::new(schema.clone())
        .with_header(true)
        .build(cursor)?;
    let batches = reader.collect::<Result<Vec<_>, _>>()?;

    let rows: usize = batches.iter().map(|b| b.num_rows()).sum();
    info!(rows, columns = schema.fields().len(), path = %path.display(), "read telemetry csv");
    Ok(batches)
}

fn repair_schema(schema: &Schema) -> Schema {
    let fields: Vec<Field> = schema
        .fields()
        .iter()
        .map(|f| {
            Field::new(
                repair_column_name(f.name()),
                f.data_type().clone(),
                f.is_nullable(),
            )
        })
        .collect();
    Schema::new(fields)
}

/// Extract row `index` (counted across all batches) as a [`RawTelemetryRow`].
pub fn row_at(batches: &[RecordBatch], index: usize) -> Result<RawTelemetryRow, StoreError> {
    let mut offset = index;
    for batch in batches {
        if offset < batch.num_rows() {
            let schema = batch.schema();
            let mut row = RawTelemetryRow::new();
            for (field, column) in schema.fields().iter().zip(batch.columns()) {
                row.insert(field.name(), cell_value(column, offset)?);
            }
            return Ok(row);
        }
        offset -= batch.num_rows();
    }

    Err(StoreError::RowOutOfRange {
        index,
        rows: batches.iter().map(|b| b.num_rows()).sum(),
    })
}

fn cell_value(column: &ArrayRef, row: usize) -> Result<CellValue, StoreError> {
    if column.is_null(row) {
        return Ok(CellValue::Null);
    }

    let value = match column.data_type() {
        dt if dt.is_numeric() => {
            let single = cast(column.slice(row, 1).as_ref(), &DataType::Float64)?;
            CellValue::Number(single.as_primitive::<Float64Type>().value(0))
        }
        DataType::Boolean => {
            CellValue::Number(if column.as_boolean().value(row) { 1.0 } else { 0.0 })
        }
        DataType::Utf8 => CellValue::Text(column.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::Text(column.as_string::<i64>().value(row).to_string()),
        _ => CellValue::Text(array_value_to_string(column.as_ref(), row)?),
    };
    Ok(value)
}
