//! DeepLab segmentation backend on ONNX Runtime

use std::path::Path;
use std::sync::Mutex;

use image::RgbImage;
use ndarray::Array4;
use ort::session::Session;
use ort::value::Value;
use tracing::{debug, info};

use crate::classes::NUM_CLASSES;
use crate::error::SegmentationError;
use crate::models::Segmenter;
use crate::prediction::SegmentationMap;

// ImageNet normalization
const MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const STD: [f32; 3] = [0.229, 0.224, 0.225];

/// DeepLab model running on ONNX Runtime.
///
/// Accepts exports emitting either per-class logits `[1, C, H, W]` (argmax
/// over the class axis) or a ready `[1, H, W]` i64 label map.
pub struct DeepLabModel {
    session: Mutex<Session>,
    input_name: String,
}

impl DeepLabModel {
    /// Load the model from an ONNX file.
    pub fn new(model_path: &Path, intra_threads: usize) -> Result<Self, SegmentationError> {
        let session = Session::builder()
            .map_err(|e| {
                SegmentationError::Model(format!("Failed to create session builder: {}", e))
            })?
            .with_intra_threads(intra_threads)
            .map_err(|e| SegmentationError::Model(format!("Failed to set thread count: {}", e)))?
            .commit_from_file(model_path)
            .map_err(|e| {
                SegmentationError::Model(format!(
                    "Failed to load model from {}: {}",
                    model_path.display(),
                    e
                ))
            })?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "input".to_string());

        info!(
            "DeepLab model loaded from {} (input '{}')",
            model_path.display(),
            input_name
        );

        Ok(Self {
            session: Mutex::new(session),
            input_name,
        })
    }

    /// Build the normalized NCHW input tensor.
    fn preprocess(&self, image: &RgbImage) -> Array4<f32> {
        let (width, height) = image.dimensions();
        let mut input = Array4::<f32>::zeros((1, 3, height as usize, width as usize));
        for (x, y, pixel) in image.enumerate_pixels() {
            for c in 0..3 {
                input[[0, c, y as usize, x as usize]] =
                    (pixel[c] as f32 / 255.0 - MEAN[c]) / STD[c];
            }
        }
        input
    }
}

impl Segmenter for DeepLabModel {
    fn segment(&self, image: &RgbImage) -> Result<SegmentationMap, SegmentationError> {
        let (width, height) = image.dimensions();
        debug!("Running DeepLab inference on {}x{} frame", width, height);

        let input = self.preprocess(image);
        let input_value = Value::from_array(input).map_err(|e| {
            SegmentationError::Inference(format!("Failed to build input tensor: {}", e))
        })?;

        let labels = {
            let mut session = self.session.lock().map_err(|_| {
                SegmentationError::Inference("Inference session lock poisoned".to_string())
            })?;
            let outputs = session
                .run(ort::inputs![self.input_name.as_str() => input_value])
                .map_err(|e| {
                    SegmentationError::Inference(format!("DeepLab inference failed: {}", e))
                })?;

            if let Ok(logits) = outputs[0].try_extract_array::<f32>() {
                let flat: Vec<f32> = logits.iter().copied().collect();
                labels_from_logits(logits.shape(), &flat, width, height)?
            } else {
                let ids = outputs[0].try_extract_array::<i64>().map_err(|e| {
                    SegmentationError::Inference(format!("Unsupported model output type: {}", e))
                })?;
                let flat: Vec<i64> = ids.iter().copied().collect();
                labels_from_ids(ids.shape(), &flat, width, height)?
            }
        };

        SegmentationMap::new(labels, width, height)
    }
}

/// Argmax a `[1, C, H, W]` (or `[C, H, W]`) logits tensor into labels.
fn labels_from_logits(
    shape: &[usize],
    flat: &[f32],
    width: u32,
    height: u32,
) -> Result<Vec<u8>, SegmentationError> {
    let (num_classes, oh, ow) = match shape.len() {
        4 => (shape[1], shape[2], shape[3]),
        3 => (shape[0], shape[1], shape[2]),
        _ => {
            return Err(SegmentationError::Inference(format!(
                "unexpected logits shape {:?}",
                shape
            )))
        }
    };

    if (ow, oh) != (width as usize, height as usize) {
        return Err(SegmentationError::Inference(format!(
            "model output is {}x{}, expected {}x{}",
            ow, oh, width, height
        )));
    }
    if num_classes == 0 || num_classes > NUM_CLASSES {
        return Err(SegmentationError::Inference(format!(
            "model emits {} classes, expected at most {}",
            num_classes, NUM_CLASSES
        )));
    }

    let mut labels = vec![0u8; ow * oh];
    for y in 0..oh {
        for x in 0..ow {
            let mut best_value = f32::MIN;
            let mut best_class = 0u8;
            for c in 0..num_classes {
                let idx = c * oh * ow + y * ow + x;
                let value = flat.get(idx).copied().unwrap_or(f32::MIN);
                if value > best_value {
                    best_value = value;
                    best_class = c as u8;
                }
            }
            labels[y * ow + x] = best_class;
        }
    }
    Ok(labels)
}

/// Validate and narrow a `[1, H, W]` (or `[H, W]`) i64 label map.
fn labels_from_ids(
    shape: &[usize],
    flat: &[i64],
    width: u32,
    height: u32,
) -> Result<Vec<u8>, SegmentationError> {
    let (oh, ow) = match shape.len() {
        3 => (shape[1], shape[2]),
        2 => (shape[0], shape[1]),
        _ => {
            return Err(SegmentationError::Inference(format!(
                "unexpected label map shape {:?}",
                shape
            )))
        }
    };

    if (ow, oh) != (width as usize, height as usize) {
        return Err(SegmentationError::Inference(format!(
            "model output is {}x{}, expected {}x{}",
            ow, oh, width, height
        )));
    }

    flat.iter()
        .map(|&v| {
            if (0..NUM_CLASSES as i64).contains(&v) {
                Ok(v as u8)
            } else {
                Err(SegmentationError::Inference(format!(
                    "model emitted class id {}, expected 0..{}",
                    v, NUM_CLASSES
                )))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_from_logits_argmax() {
        // 2 classes over a 2x2 frame: class 1 wins on the right column
        let flat = vec![
            1.0, 0.0, // class 0, row 0
            1.0, 0.0, // class 0, row 1
            0.0, 2.0, // class 1, row 0
            0.0, 2.0, // class 1, row 1
        ];
        let labels = labels_from_logits(&[1, 2, 2, 2], &flat, 2, 2).unwrap();
        assert_eq!(labels, vec![0, 1, 0, 1]);
    }

    #[test]
    fn test_labels_from_logits_rejects_class_overflow() {
        let flat = vec![0.0; 22 * 4];
        let result = labels_from_logits(&[1, 22, 2, 2], &flat, 2, 2);
        assert!(result.is_err());
    }

    #[test]
    fn test_labels_from_logits_rejects_size_mismatch() {
        let flat = vec![0.0; 2 * 4];
        let result = labels_from_logits(&[1, 2, 2, 2], &flat, 3, 3);
        assert!(result.is_err());
    }

    #[test]
    fn test_labels_from_ids_narrows() {
        let flat = vec![0i64, 5, 20, 0];
        let labels = labels_from_ids(&[1, 2, 2], &flat, 2, 2).unwrap();
        assert_eq!(labels, vec![0, 5, 20, 0]);
    }

    #[test]
    fn test_labels_from_ids_rejects_out_of_range() {
        assert!(labels_from_ids(&[1, 2, 2], &[0, 1, 2, 21], 2, 2).is_err());
        assert!(labels_from_ids(&[1, 2, 2], &[0, -1, 2, 3], 2, 2).is_err());
    }
}
