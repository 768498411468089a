use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("telemetry file not found: {0}")]
    NotFound(std::path::PathBuf),

    #[error("telemetry table is empty")]
    Empty,

    #[error("row {index} out of range ({rows} rows)")]
    RowOutOfRange { index: usize, rows: usize },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}
