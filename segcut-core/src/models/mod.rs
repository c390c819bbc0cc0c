//! Model boundary: the segmentation backend contract

use image::RgbImage;

use crate::error::SegmentationError;
use crate::prediction::SegmentationMap;

#[cfg(feature = "onnx")]
pub mod deeplab;

#[cfg(feature = "onnx")]
pub use deeplab::DeepLabModel;

/// A frozen semantic-segmentation model.
///
/// Takes the canonical-size RGB frame and returns one class id per pixel,
/// row-major, with the frame's dimensions. Loading and initialization are
/// backend concerns; the pipeline only ever sees this call.
pub trait Segmenter: Send + Sync {
    fn segment(&self, image: &RgbImage) -> Result<SegmentationMap, SegmentationError>;
}
