//! Inference layer: image preprocessing, the model registry and ONNX Runtime
//! adapters for the leaf classifier and the tabular field models.

mod error;
pub mod model;
#[cfg(feature = "onnx")]
mod onnx;
pub mod pipeline;
pub mod preprocess;
mod registry;

#[cfg(test)]
mod fakes;

pub use error::AiError;
pub use model::{CropHealthLabels, LeafClassifier, ModelKind, TabularModel};
#[cfg(feature = "onnx")]
pub use onnx::{OnnxLeafClassifier, OnnxTabularModel};
pub use pipeline::{analyze_image, assess_environment};
pub use preprocess::{ImageTensor, is_allowed_upload, preprocess};
pub use registry::{ModelRegistry, ModelStatus};
