//! Configuration for segcut-core

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Segmentation pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Canonical processing resolution (width, height) fed to the model
    pub canonical_size: (u32, u32),
    /// Path to the segmentation model file
    pub model_path: Option<PathBuf>,
    /// Directory for saved segment files; None means next to the source image
    pub output_dir: Option<PathBuf>,
    /// Intra-op thread count for the inference session
    pub intra_threads: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            canonical_size: (513, 513),
            model_path: None,
            output_dir: None,
            intra_threads: 4,
        }
    }
}

impl PipelineConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.canonical_size.0 == 0 || self.canonical_size.1 == 0 {
            return Err("Canonical size must be non-zero".to_string());
        }

        // Check for potential overflow in pixel buffer calculations
        let total_pixels = self.canonical_size.0
            .checked_mul(self.canonical_size.1)
            .ok_or_else(|| "Canonical size would cause integer overflow".to_string())?;

        if total_pixels > 100_000_000 {
            return Err("Canonical size too large (max 100M pixels)".to_string());
        }

        if self.intra_threads == 0 {
            return Err("Intra-op thread count must be at least 1".to_string());
        }

        if self.intra_threads > 256 {
            return Err("Intra-op thread count too large (max 256)".to_string());
        }

        Ok(())
    }
}
