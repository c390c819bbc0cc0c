//! Export and display orchestration

use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::RgbaImage;
use tracing::{debug, error};

use crate::error::SegmentationError;
use crate::prediction::PredictionResult;
use crate::render::{COLORMAP_SEGMENT, MaskRenderer, RenderRequest};

/// Literal save target meaning "every available segment".
pub const SAVE_ALL_SEGMENT: &str = "all";

/// Usage hint printed when --show has no usable segment.
pub const SHOW_HINT: &str = "After the --show flag, provide an object name from the list above, or 'colormap' to view the highlighted object colormap.";

/// Usage hint printed when --save has no usable segment.
pub const SAVE_HINT: &str = "After the --save flag, provide an object name from the list above, or 'all' to save each segment individually.";

/// A tri-state command-line segment request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentRequest {
    /// Flag not given at all.
    Absent,
    /// Flag given without a value.
    Flag,
    /// Flag given with a segment name.
    Named(String),
}

impl From<Option<Option<String>>> for SegmentRequest {
    fn from(value: Option<Option<String>>) -> Self {
        match value {
            None => SegmentRequest::Absent,
            Some(None) => SegmentRequest::Flag,
            Some(Some(name)) => SegmentRequest::Named(name),
        }
    }
}

/// What the orchestrator does for a --show request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShowAction {
    /// Print the detected-segments report.
    Report,
    /// Print the report followed by the show usage hint.
    ReportWithHint,
    /// Render one segment and display it.
    Display(RenderRequest),
}

/// What the orchestrator does for a --save request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveAction {
    /// No save requested.
    Skip,
    /// Save every available segment.
    All,
    /// Save one segment.
    One(RenderRequest),
    /// Print the save usage hint.
    Hint,
}

/// Segments a user can request for one image: every detected class name
/// plus the colormap overlay.
pub fn available_segments(prediction: &PredictionResult) -> Vec<String> {
    let mut segments: Vec<String> = prediction
        .class_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    segments.push(COLORMAP_SEGMENT.to_string());
    segments
}

fn is_available(name: &str, prediction: &PredictionResult) -> bool {
    name == COLORMAP_SEGMENT || prediction.contains(name)
}

/// Detected-segments report line for one image.
pub fn report(prediction: &PredictionResult, source: &Path) -> String {
    format!(
        "The image '{}' contains the following segments: {}.",
        source.display(),
        prediction.class_names().join(", ")
    )
}

/// Decide the show action. A bare flag or an unavailable segment falls
/// back to the report plus the usage hint, with no rendering attempted.
pub fn decide_show(request: &SegmentRequest, prediction: &PredictionResult) -> ShowAction {
    match request {
        SegmentRequest::Absent => ShowAction::Report,
        SegmentRequest::Flag => ShowAction::ReportWithHint,
        SegmentRequest::Named(name) => {
            if is_available(name, prediction) {
                ShowAction::Display(RenderRequest::from_segment(name))
            } else {
                ShowAction::ReportWithHint
            }
        }
    }
}

/// Decide the save action. "all" fans out to every available segment; a
/// bare flag or an unavailable segment produces the usage hint only.
pub fn decide_save(request: &SegmentRequest, prediction: &PredictionResult) -> SaveAction {
    match request {
        SegmentRequest::Absent => SaveAction::Skip,
        SegmentRequest::Flag => SaveAction::Hint,
        SegmentRequest::Named(name) if name == SAVE_ALL_SEGMENT => SaveAction::All,
        SegmentRequest::Named(name) => {
            if is_available(name, prediction) {
                SaveAction::One(RenderRequest::from_segment(name))
            } else {
                SaveAction::Hint
            }
        }
    }
}

/// Output path for one segment: `<stem>-<segment>.png`, next to the
/// source unless an output directory overrides it.
pub fn output_path(source: &Path, segment: &str, output_dir: Option<&Path>) -> PathBuf {
    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("image");
    let file_name = format!("{}-{}.png", stem, segment);
    output_dir
        .map(Path::to_path_buf)
        .or_else(|| source.parent().map(Path::to_path_buf))
        .unwrap_or_default()
        .join(file_name)
}

/// Result of one save attempt within a batch.
#[derive(Debug)]
pub struct SaveOutcome {
    pub segment: String,
    pub path: PathBuf,
    pub result: Result<(), SegmentationError>,
}

/// Render one segment and write it as a PNG.
pub fn save_segment(
    renderer: &MaskRenderer,
    image: &RgbaImage,
    prediction: &PredictionResult,
    request: &RenderRequest,
    path: &Path,
) -> Result<(), SegmentationError> {
    let rendered = renderer.render(image, prediction, request)?;
    rendered.save(path)?;
    debug!(
        "Saved segment '{}' to {}",
        request.segment_name(),
        path.display()
    );
    Ok(())
}

/// Save every available segment, one blocking task per file.
///
/// Every task is awaited before returning, and a failed write never
/// aborts or skips its siblings; callers get one outcome per segment,
/// in no guaranteed file-write order.
pub async fn save_all(
    renderer: &MaskRenderer,
    image: Arc<RgbaImage>,
    prediction: Arc<PredictionResult>,
    source: &Path,
    output_dir: Option<&Path>,
) -> Vec<SaveOutcome> {
    let mut handles = Vec::new();
    for segment in available_segments(&prediction) {
        let renderer = renderer.clone();
        let image = Arc::clone(&image);
        let prediction = Arc::clone(&prediction);
        let request = RenderRequest::from_segment(&segment);
        let path = output_path(source, &segment, output_dir);
        let task_path = path.clone();
        let handle = tokio::task::spawn_blocking(move || {
            save_segment(&renderer, &image, &prediction, &request, &task_path)
        });
        handles.push((segment, path, handle));
    }

    let mut outcomes = Vec::with_capacity(handles.len());
    for (segment, path, handle) in handles {
        let result = match handle.await {
            Ok(result) => result,
            Err(e) => Err(SegmentationError::Render(format!(
                "save task for '{}' did not complete: {}",
                segment, e
            ))),
        };
        if let Err(e) = &result {
            error!("Failed to save segment '{}': {}", segment, e);
        }
        outcomes.push(SaveOutcome {
            segment,
            path,
            result,
        });
    }
    outcomes
}
