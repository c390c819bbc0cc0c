//! Overlay palette and per-image color assignment

use std::collections::BTreeMap;

use crate::classes::BACKGROUND_ID;

/// Overlay colors, handed out to detected classes in rank order.
pub const PALETTE: [[u8; 3]; 8] = [
    [0, 128, 0],     // green
    [255, 0, 0],     // red
    [0, 0, 255],     // blue
    [160, 32, 240],  // purple
    [255, 185, 80],  // pink
    [0, 128, 128],   // teal
    [255, 255, 0],   // yellow
    [192, 192, 192], // gray
];

/// Alpha applied to every colored overlay pixel.
pub const OVERLAY_ALPHA: u8 = 200;

/// Mapping from detected non-background class ids to palette colors.
///
/// Rank is the position of an id in the ascending-sorted distinct id set,
/// so the assignment depends only on which classes are present, never on
/// pixel scan order. More than 8 detected classes wrap around the palette.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorAssignment {
    colors: BTreeMap<u8, [u8; 3]>,
}

impl ColorAssignment {
    /// Build the assignment for the class ids detected in one image.
    ///
    /// Background and duplicates are dropped and the input is sorted
    /// internally, so caller ordering cannot change the result.
    pub fn new(class_ids: &[u8]) -> Self {
        let mut ids: Vec<u8> = class_ids
            .iter()
            .copied()
            .filter(|&id| id != BACKGROUND_ID)
            .collect();
        ids.sort_unstable();
        ids.dedup();

        let colors = ids
            .into_iter()
            .enumerate()
            .map(|(rank, id)| (id, PALETTE[rank % PALETTE.len()]))
            .collect();

        Self { colors }
    }

    /// Color assigned to a class id, if the id was in the detected set.
    pub fn color_of(&self, class_id: u8) -> Option<[u8; 3]> {
        self.colors.get(&class_id).copied()
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}
