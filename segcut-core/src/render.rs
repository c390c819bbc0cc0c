//! Mask rendering: per-class cutouts and the colormap overlay

use image::{Rgba, RgbaImage};
use tracing::debug;

use crate::classes::{BACKGROUND_ID, ClassRegistry};
use crate::error::SegmentationError;
use crate::palette::{ColorAssignment, OVERLAY_ALPHA};
use crate::prediction::PredictionResult;

/// Segment name reserved for the colormap overlay.
pub const COLORMAP_SEGMENT: &str = "colormap";

/// One renderable segment: a single-class cutout or the colormap overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderRequest {
    Cutout(String),
    Colormap,
}

impl RenderRequest {
    /// Build the request for a segment name ("colormap" or a class name).
    pub fn from_segment(segment: &str) -> Self {
        if segment == COLORMAP_SEGMENT {
            RenderRequest::Colormap
        } else {
            RenderRequest::Cutout(segment.to_string())
        }
    }

    /// Segment name as used in reports and output filenames.
    pub fn segment_name(&self) -> &str {
        match self {
            RenderRequest::Cutout(name) => name,
            RenderRequest::Colormap => COLORMAP_SEGMENT,
        }
    }
}

/// Pure mask renderer.
///
/// Every call allocates a fresh output buffer; the source image and the
/// prediction are never mutated, so renders can run concurrently over the
/// same inputs.
#[derive(Debug, Clone)]
pub struct MaskRenderer {
    registry: ClassRegistry,
}

impl MaskRenderer {
    pub fn new() -> Result<Self, SegmentationError> {
        Ok(Self {
            registry: ClassRegistry::new()?,
        })
    }

    /// Render one segment of the canonical image.
    pub fn render(
        &self,
        source: &RgbaImage,
        prediction: &PredictionResult,
        request: &RenderRequest,
    ) -> Result<RgbaImage, SegmentationError> {
        let map = prediction.map();
        if source.width() != map.width() || source.height() != map.height() {
            return Err(SegmentationError::Render(format!(
                "image is {}x{} but the segmentation map is {}x{}",
                source.width(),
                source.height(),
                map.width(),
                map.height()
            )));
        }

        match request {
            RenderRequest::Cutout(name) => self.render_cutout(source, prediction, name),
            RenderRequest::Colormap => Ok(self.render_colormap(source, prediction)),
        }
    }

    /// Alpha-mask the source down to one class.
    ///
    /// RGB channels are copied untouched; only alpha changes, to 0 outside
    /// the target class. A registered-but-undetected class yields a fully
    /// transparent cutout rather than an error.
    fn render_cutout(
        &self,
        source: &RgbaImage,
        prediction: &PredictionResult,
        name: &str,
    ) -> Result<RgbaImage, SegmentationError> {
        let target = self.registry.id_of(name)?;
        let values = prediction.map().values();

        let mut out = source.clone();
        for (i, pixel) in out.pixels_mut().enumerate() {
            if values[i] != target {
                pixel.0[3] = 0;
            }
        }

        debug!(
            "Rendered cutout for '{}' ({} matching pixels)",
            name,
            prediction.pixel_counts().get(name).copied().unwrap_or(0)
        );
        Ok(out)
    }

    /// Recolor every detected-class pixel with its palette color at the
    /// fixed overlay alpha. Background pixels, and any id outside the
    /// assignment, come out fully transparent.
    fn render_colormap(&self, source: &RgbaImage, prediction: &PredictionResult) -> RgbaImage {
        let assignment = ColorAssignment::new(&prediction.non_background_ids());
        let values = prediction.map().values();

        // RgbaImage::new zeroes the buffer, so untouched pixels are (0,0,0,0)
        let mut out = RgbaImage::new(source.width(), source.height());
        for (i, pixel) in out.pixels_mut().enumerate() {
            let v = values[i];
            if v == BACKGROUND_ID {
                continue;
            }
            if let Some([r, g, b]) = assignment.color_of(v) {
                *pixel = Rgba([r, g, b, OVERLAY_ALPHA]);
            }
        }

        debug!("Rendered colormap with {} assigned classes", assignment.len());
        out
    }
}
