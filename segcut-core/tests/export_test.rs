//! Tests for segment export: single saves and the save-all fan-out

use std::path::Path;
use std::sync::Arc;

use image::{Rgba, RgbaImage};
use tempfile::TempDir;

use segcut_core::export::{save_all, save_segment};
use segcut_core::render::RenderRequest;
use segcut_core::{MaskRenderer, PredictionResult, SegmentationMap};

/// Quadrant scene: background in two corners, cat top-right, dog
/// bottom-left.
fn quadrant_scene() -> (RgbaImage, PredictionResult) {
    let data = vec![
        0, 0, 8, 8, //
        0, 0, 8, 8, //
        12, 12, 0, 0, //
        12, 12, 0, 0, //
    ];
    let map = SegmentationMap::new(data, 4, 4).unwrap();
    let prediction = PredictionResult::from_map(map).unwrap();
    let image = RgbaImage::from_fn(4, 4, |x, y| Rgba([(x * 60) as u8, (y * 60) as u8, 90, 255]));
    (image, prediction)
}

#[test]
fn test_save_segment_writes_png() {
    let dir = TempDir::new().unwrap();
    let (image, prediction) = quadrant_scene();
    let renderer = MaskRenderer::new().unwrap();
    let path = dir.path().join("scene-cat.png");

    save_segment(
        &renderer,
        &image,
        &prediction,
        &RenderRequest::Cutout("cat".to_string()),
        &path,
    )
    .unwrap();

    let reloaded = image::open(&path).unwrap().to_rgba8();
    assert_eq!(reloaded.dimensions(), (4, 4));
    // Cat pixels keep their source color, everything else is masked out
    assert_eq!(*reloaded.get_pixel(2, 0), *image.get_pixel(2, 0));
    assert_eq!(reloaded.get_pixel(0, 0).0[3], 0);
    let opaque = reloaded.pixels().filter(|p| p.0[3] == 255).count();
    assert_eq!(opaque, 4);
}

#[test]
fn test_save_segment_unknown_class_fails_without_file() {
    let dir = TempDir::new().unwrap();
    let (image, prediction) = quadrant_scene();
    let renderer = MaskRenderer::new().unwrap();
    let path = dir.path().join("scene-giraffe.png");

    let result = save_segment(
        &renderer,
        &image,
        &prediction,
        &RenderRequest::Cutout("giraffe".to_string()),
        &path,
    );
    assert!(result.is_err());
    assert!(!path.exists());
}

#[tokio::test]
async fn test_save_all_writes_every_segment() {
    let dir = TempDir::new().unwrap();
    let (image, prediction) = quadrant_scene();
    let renderer = MaskRenderer::new().unwrap();

    let outcomes = save_all(
        &renderer,
        Arc::new(image),
        Arc::new(prediction),
        Path::new("scene.jpg"),
        Some(dir.path()),
    )
    .await;

    let segments: Vec<&str> = outcomes.iter().map(|o| o.segment.as_str()).collect();
    assert_eq!(segments, vec!["background", "cat", "dog", "colormap"]);
    for outcome in &outcomes {
        assert!(outcome.result.is_ok(), "failed: {}", outcome.segment);
        assert!(outcome.path.exists());
    }
    assert!(dir.path().join("scene-colormap.png").exists());

    // The colormap file is a fresh overlay, not a masked copy
    let colormap = image::open(dir.path().join("scene-colormap.png"))
        .unwrap()
        .to_rgba8();
    assert_eq!(colormap.get_pixel(2, 0).0[3], 200);
    assert_eq!(*colormap.get_pixel(0, 0), Rgba([0, 0, 0, 0]));
}

#[tokio::test]
async fn test_save_all_isolates_failures() {
    let dir = TempDir::new().unwrap();
    // Two classes, no background: cat left, dog right
    let data = vec![
        8, 8, 12, 12, //
        8, 8, 12, 12, //
        8, 8, 12, 12, //
        8, 8, 12, 12, //
    ];
    let map = SegmentationMap::new(data, 4, 4).unwrap();
    let prediction = PredictionResult::from_map(map).unwrap();
    let image = RgbaImage::from_pixel(4, 4, Rgba([120, 130, 140, 255]));
    let renderer = MaskRenderer::new().unwrap();

    // Occupy one target path with a directory so that write fails
    std::fs::create_dir(dir.path().join("scene-cat.png")).unwrap();

    let outcomes = save_all(
        &renderer,
        Arc::new(image),
        Arc::new(prediction),
        Path::new("scene.jpg"),
        Some(dir.path()),
    )
    .await;

    // Exactly one outcome per available segment, the failure contained
    let segments: Vec<&str> = outcomes.iter().map(|o| o.segment.as_str()).collect();
    assert_eq!(segments, vec!["cat", "dog", "colormap"]);
    for outcome in &outcomes {
        if outcome.segment == "cat" {
            assert!(outcome.result.is_err());
        } else {
            assert!(outcome.result.is_ok(), "failed: {}", outcome.segment);
            assert!(outcome.path.is_file());
        }
    }
}

#[tokio::test]
async fn test_save_all_single_class_scene() {
    let dir = TempDir::new().unwrap();
    let map = SegmentationMap::new(vec![15; 9], 3, 3).unwrap();
    let prediction = PredictionResult::from_map(map).unwrap();
    let image = RgbaImage::from_pixel(3, 3, Rgba([10, 20, 30, 255]));
    let renderer = MaskRenderer::new().unwrap();

    let outcomes = save_all(
        &renderer,
        Arc::new(image),
        Arc::new(prediction),
        Path::new("portrait.png"),
        Some(dir.path()),
    )
    .await;

    // Person plus the colormap, no background entry
    let segments: Vec<&str> = outcomes.iter().map(|o| o.segment.as_str()).collect();
    assert_eq!(segments, vec!["person", "colormap"]);
    assert!(dir.path().join("portrait-person.png").exists());
    assert!(dir.path().join("portrait-colormap.png").exists());
}
