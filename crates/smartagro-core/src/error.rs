use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("expected {expected} class probabilities, got {actual}")]
    ClassCount { expected: usize, actual: usize },

    #[error("probability vector contains a non-finite value")]
    NonFinite,
}
