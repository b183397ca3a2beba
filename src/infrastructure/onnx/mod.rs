pub mod chatterbox;
pub mod phonikud;

use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use std::path::Path;

pub use chatterbox::{ChatterboxModel, GenerationSettings};
pub use phonikud::PhonikudModel;

#[derive(thiserror::Error, Debug)]
pub enum InferenceError {
    #[error("ONNX runtime error: {0}")]
    Ort(#[from] ort::Error),
    #[error("Array shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
    #[error("Tokenizer error: {0}")]
    Tokenizer(String),
    #[error("Reference audio error: {0}")]
    Audio(String),
    #[error("Model output '{0}' missing")]
    MissingOutput(String),
    #[error("Model file not found: {0}")]
    ModelNotFound(String),
}

/// Build a CPU inference session for an ONNX file
pub(crate) fn build_session(path: &Path, num_threads: Option<usize>) -> Result<Session, InferenceError> {
    if !path.is_file() {
        return Err(InferenceError::ModelNotFound(path.display().to_string()));
    }

    tracing::info!(path = %path.display(), "Loading ONNX model");

    let mut builder = Session::builder()?
        .with_optimization_level(GraphOptimizationLevel::Level3)?
        .with_execution_providers([CPUExecutionProvider::default().build()])?;

    if let Some(threads) = num_threads {
        builder = builder.with_intra_threads(threads)?;
    }

    Ok(builder.commit_from_file(path)?)
}

/// Index of the largest value, first one wins on ties
pub(crate) fn argmax(values: &[f32]) -> usize {
    values
        .iter()
        .enumerate()
        .fold((0, f32::NEG_INFINITY), |(best_idx, best), (idx, &value)| {
            if value > best {
                (idx, value)
            } else {
                (best_idx, best)
            }
        })
        .0
}
