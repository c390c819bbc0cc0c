//! Fixed class registry for the segmentation model

use std::collections::HashMap;

use crate::error::SegmentationError;

/// Pascal VOC segmentation classes, indexed by model output id.
pub const CLASS_NAMES: [&str; 21] = [
    "background",
    "airplane",
    "bicycle",
    "bird",
    "boat",
    "bottle",
    "bus",
    "car",
    "cat",
    "chair",
    "cow",
    "dining table",
    "dog",
    "horse",
    "motorbike",
    "person",
    "potted plant",
    "sheep",
    "sofa",
    "train",
    "tv",
];

/// Number of classes the model can emit, background included.
pub const NUM_CLASSES: usize = CLASS_NAMES.len();

/// Class id reserved for pixels belonging to no object.
pub const BACKGROUND_ID: u8 = 0;

/// Bidirectional class name <-> id lookup over the fixed table.
///
/// Construction verifies the table is a bijection, so a bad edit to
/// `CLASS_NAMES` fails loudly instead of shadowing an entry.
#[derive(Debug, Clone)]
pub struct ClassRegistry {
    ids: HashMap<&'static str, u8>,
}

impl ClassRegistry {
    pub fn new() -> Result<Self, SegmentationError> {
        let mut ids = HashMap::with_capacity(NUM_CLASSES);
        for (id, name) in CLASS_NAMES.iter().enumerate() {
            if ids.insert(*name, id as u8).is_some() {
                return Err(SegmentationError::Config(format!(
                    "duplicate class name '{}' in registry",
                    name
                )));
            }
        }
        Ok(Self { ids })
    }

    /// Resolve a class name to its id.
    pub fn id_of(&self, name: &str) -> Result<u8, SegmentationError> {
        self.ids
            .get(name)
            .copied()
            .ok_or_else(|| SegmentationError::UnknownClass(name.to_string()))
    }

    /// Resolve a class id to its name.
    pub fn name_of(&self, id: u8) -> Result<&'static str, SegmentationError> {
        CLASS_NAMES
            .get(id as usize)
            .copied()
            .ok_or(SegmentationError::InvalidClassId(id))
    }

    /// Whether a name is in the registry at all (detected or not).
    pub fn contains(&self, name: &str) -> bool {
        self.ids.contains_key(name)
    }
}
