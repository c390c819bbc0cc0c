//! segcut-core: Semantic Segmentation Post-Processing
//!
//! Turns a per-pixel class-id map into a class inventory, alpha-masked
//! per-class cutouts, and a colorized overlay of everything the model
//! found. Rendering is deterministic: the same map and source image
//! always produce byte-identical outputs.
//!
//! Model inference is pluggable through the [`models::Segmenter`] trait;
//! the bundled DeepLab ONNX backend lives behind the `onnx` feature.

pub mod classes;
pub mod config;
pub mod error;
pub mod export;
pub mod models;
pub mod palette;
pub mod pipeline;
pub mod prediction;
pub mod render;

pub use classes::ClassRegistry;
pub use config::PipelineConfig;
pub use error::SegmentationError;
pub use pipeline::{ProcessedImage, SegmentationPipeline};
pub use prediction::{PredictionResult, SegmentationMap};
pub use render::{MaskRenderer, RenderRequest};
