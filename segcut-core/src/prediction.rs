//! Segmentation map and prediction parsing

use std::collections::BTreeMap;

use crate::classes::{BACKGROUND_ID, CLASS_NAMES, NUM_CLASSES};
use crate::error::SegmentationError;

/// Flat per-pixel class ids for one canonical-size image, row-major.
///
/// Construction validates length and value range, so every id held in a
/// map indexes `CLASS_NAMES` safely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentationMap {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl SegmentationMap {
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Result<Self, SegmentationError> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .ok_or_else(|| {
                SegmentationError::Inference(format!(
                    "segmentation map dimensions {}x{} overflow",
                    width, height
                ))
            })?;
        if data.len() != expected {
            return Err(SegmentationError::Inference(format!(
                "segmentation map has {} values, expected {} ({}x{})",
                data.len(),
                expected,
                width,
                height
            )));
        }
        if let Some(&bad) = data.iter().find(|&&v| v as usize >= NUM_CLASSES) {
            return Err(SegmentationError::InvalidClassId(bad));
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Row-major class ids, one per pixel.
    pub fn values(&self) -> &[u8] {
        &self.data
    }
}

/// Parsed model output: the detected-class inventory plus the map itself.
#[derive(Debug, Clone)]
pub struct PredictionResult {
    class_ids: Vec<u8>,
    class_names: Vec<&'static str>,
    pixel_counts: BTreeMap<&'static str, usize>,
    map: SegmentationMap,
}

impl PredictionResult {
    /// Parse a segmentation map into the detected-class inventory.
    ///
    /// A single linear pass accumulates per-class counts; distinct ids
    /// come out sorted ascending regardless of pixel scan order.
    /// Background is listed like any other detected class.
    pub fn from_map(map: SegmentationMap) -> Result<Self, SegmentationError> {
        if map.is_empty() {
            return Err(SegmentationError::EmptyPrediction);
        }

        let mut counts = [0usize; NUM_CLASSES];
        for &v in map.values() {
            counts[v as usize] += 1;
        }

        let class_ids: Vec<u8> = (0..NUM_CLASSES as u8)
            .filter(|&id| counts[id as usize] > 0)
            .collect();
        let class_names: Vec<&'static str> = class_ids
            .iter()
            .map(|&id| CLASS_NAMES[id as usize])
            .collect();
        let pixel_counts: BTreeMap<&'static str, usize> = class_ids
            .iter()
            .map(|&id| (CLASS_NAMES[id as usize], counts[id as usize]))
            .collect();

        Ok(Self {
            class_ids,
            class_names,
            pixel_counts,
            map,
        })
    }

    /// Distinct class ids present, sorted ascending, background included.
    pub fn class_ids(&self) -> &[u8] {
        &self.class_ids
    }

    /// Names of the detected classes, in id order.
    pub fn class_names(&self) -> &[&'static str] {
        &self.class_names
    }

    /// Pixel count per detected class name.
    pub fn pixel_counts(&self) -> &BTreeMap<&'static str, usize> {
        &self.pixel_counts
    }

    /// Detected ids with background removed, for color assignment.
    pub fn non_background_ids(&self) -> Vec<u8> {
        self.class_ids
            .iter()
            .copied()
            .filter(|&id| id != BACKGROUND_ID)
            .collect()
    }

    /// Whether a class name was detected in this image.
    pub fn contains(&self, name: &str) -> bool {
        self.class_names.iter().any(|&n| n == name)
    }

    pub fn map(&self) -> &SegmentationMap {
        &self.map
    }
}
