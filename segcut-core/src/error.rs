//! Error types for segcut-core

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SegmentationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unknown class: {0}")]
    UnknownClass(String),

    #[error("Class id {0} out of range")]
    InvalidClassId(u8),

    #[error("Empty prediction: the model returned no pixels")]
    EmptyPrediction,

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}
