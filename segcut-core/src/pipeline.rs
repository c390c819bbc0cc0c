//! Image processing pipeline: validate, decode, canonicalize, infer, parse

use std::path::Path;
use std::sync::Arc;

use image::imageops::FilterType;
use image::RgbaImage;
use tracing::{debug, info};

use crate::config::PipelineConfig;
use crate::error::SegmentationError;
use crate::models::Segmenter;
use crate::prediction::PredictionResult;

/// File extensions accepted as input images.
pub const IMAGE_EXTENSIONS: [&str; 5] = ["bmp", "gif", "jpg", "jpeg", "png"];

/// Whether a path carries one of the accepted image extensions.
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Reject a path that cannot serve as pipeline input. Runs before any
/// model or decoder is touched, so callers can check cheaply up front.
pub fn validate_input(path: &Path) -> Result<(), SegmentationError> {
    if !is_supported_image(path) {
        return Err(SegmentationError::InvalidInput(format!(
            "'{}' is not a supported image file (expected one of: {})",
            path.display(),
            IMAGE_EXTENSIONS.join(", ")
        )));
    }
    if !path.is_file() {
        return Err(SegmentationError::InvalidInput(format!(
            "input file '{}' not found",
            path.display()
        )));
    }
    Ok(())
}

/// One processed image: the canonical RGBA frame plus the parsed
/// prediction over it. Both share the canonical resolution, so any
/// segment can be rendered from them without further resizing.
#[derive(Debug, Clone)]
pub struct ProcessedImage {
    pub image: RgbaImage,
    pub prediction: PredictionResult,
}

/// Segmentation pipeline over a frozen model backend.
pub struct SegmentationPipeline {
    config: PipelineConfig,
    model: Arc<dyn Segmenter>,
}

impl std::fmt::Debug for SegmentationPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // `dyn Segmenter` carries no Debug bound, so only the config is shown.
        f.debug_struct("SegmentationPipeline")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SegmentationPipeline {
    /// Create a new pipeline with a validated configuration.
    pub fn new(
        config: PipelineConfig,
        model: Arc<dyn Segmenter>,
    ) -> Result<Self, SegmentationError> {
        config.validate().map_err(SegmentationError::Config)?;
        Ok(Self { config, model })
    }

    /// Run the full pipeline on one image file.
    ///
    /// Input validation failures are fatal before any decoding happens;
    /// decode and inference failures abort the run with context.
    pub fn process_file(&self, path: &Path) -> Result<ProcessedImage, SegmentationError> {
        validate_input(path)?;

        info!("Processing image {}", path.display());
        let decoded = image::open(path)?;

        // Both the render copy and the model input come from the same
        // resized frame, so the map length always matches the pixel count.
        let (width, height) = self.config.canonical_size;
        let canonical = decoded.resize_exact(width, height, FilterType::Triangle);
        debug!(
            "Canonicalized {}x{} -> {}x{}",
            decoded.width(),
            decoded.height(),
            width,
            height
        );

        let map = self.model.segment(&canonical.to_rgb8())?;
        let prediction = PredictionResult::from_map(map)?;
        debug!(
            "Detected {} classes: {:?}",
            prediction.class_names().len(),
            prediction.class_names()
        );

        Ok(ProcessedImage {
            image: canonical.to_rgba8(),
            prediction,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }
}
