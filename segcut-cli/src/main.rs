// segcut - semantic segment cutouts from the command line
// Point it at an image, then list, show, or save what the model finds

mod display;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use tracing::debug;

use segcut_core::export::{self, SaveAction, SegmentRequest, ShowAction, SAVE_HINT, SHOW_HINT};
use segcut_core::models::Segmenter;
use segcut_core::pipeline::validate_input;
use segcut_core::{
    MaskRenderer, PipelineConfig, ProcessedImage, SegmentationError, SegmentationPipeline,
};

/// Model file used when --model is not given.
#[cfg(feature = "onnx")]
const DEFAULT_MODEL_PATH: &str = "models/deeplabv3.onnx";

#[derive(Parser)]
#[command(name = "segcut")]
#[command(about = "Cut out, colorize and save semantic segments from an image", long_about = None)]
#[command(version)]
struct Cli {
    /// Input image (bmp, gif, jpg, jpeg or png)
    image: Option<PathBuf>,

    /// Show a segment in the terminal ('colormap' for the full overlay)
    #[arg(long, num_args = 0..=1)]
    show: Option<Option<String>>,

    /// Save a segment as a PNG ('all' saves every segment)
    #[arg(long, num_args = 0..=1)]
    save: Option<Option<String>>,

    /// Segmentation model file (ONNX)
    #[arg(long)]
    model: Option<PathBuf>,

    /// Directory for saved segments (defaults to the source directory)
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging if verbose
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_target(false)
            .with_thread_ids(false)
            .init();
    }

    let Some(image_path) = cli.image else {
        eprintln!("no input image specified.");
        std::process::exit(1);
    };

    // Input validation runs before the model is even loaded
    if let Err(e) = validate_input(&image_path) {
        debug!("{}", e);
        eprintln!("no input image specified.");
        std::process::exit(1);
    }

    let mut config = PipelineConfig::default();
    config.model_path = cli.model;
    config.output_dir = cli.output_dir;

    let show = SegmentRequest::from(cli.show);
    let save = SegmentRequest::from(cli.save);

    let processed = match process(&config, &image_path) {
        Ok(processed) => processed,
        Err(e) => {
            eprintln!("error processing image - {}", e);
            std::process::exit(1);
        }
    };

    let renderer = match MaskRenderer::new() {
        Ok(renderer) => renderer,
        Err(e) => {
            eprintln!("error processing image - {}", e);
            std::process::exit(1);
        }
    };

    match export::decide_show(&show, &processed.prediction) {
        ShowAction::Report => {
            println!("{}", export::report(&processed.prediction, &image_path));
        }
        ShowAction::ReportWithHint => {
            println!("{}", export::report(&processed.prediction, &image_path));
            println!("\n{}", SHOW_HINT);
        }
        ShowAction::Display(request) => {
            match renderer.render(&processed.image, &processed.prediction, &request) {
                Ok(rendered) => display::print_image(&rendered),
                Err(e) => {
                    eprintln!("error processing image - {}", e);
                    std::process::exit(1);
                }
            }
        }
    }

    match export::decide_save(&save, &processed.prediction) {
        SaveAction::Skip => {}
        SaveAction::Hint => {
            println!("\n{}", SAVE_HINT);
        }
        SaveAction::One(request) => {
            let path =
                export::output_path(&image_path, request.segment_name(), config.output_dir.as_deref());
            match export::save_segment(
                &renderer,
                &processed.image,
                &processed.prediction,
                &request,
                &path,
            ) {
                Ok(()) => println!("saved {}", path.display()),
                Err(e) => {
                    eprintln!("error processing image - {}", e);
                    std::process::exit(1);
                }
            }
        }
        SaveAction::All => {
            let ProcessedImage { image, prediction } = processed;
            let outcomes = export::save_all(
                &renderer,
                Arc::new(image),
                Arc::new(prediction),
                &image_path,
                config.output_dir.as_deref(),
            )
            .await;
            for outcome in outcomes {
                match outcome.result {
                    Ok(()) => println!("saved {}", outcome.path.display()),
                    Err(e) => eprintln!("error processing image - {}", e),
                }
            }
        }
    }

    Ok(())
}

/// Load the model and run the pipeline over one input file.
fn process(config: &PipelineConfig, path: &Path) -> Result<ProcessedImage, SegmentationError> {
    let model = load_model(config)?;
    let pipeline = SegmentationPipeline::new(config.clone(), model)?;
    pipeline.process_file(path)
}

#[cfg(feature = "onnx")]
fn load_model(config: &PipelineConfig) -> Result<Arc<dyn Segmenter>, SegmentationError> {
    let path = config
        .model_path
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH));
    debug!("Loading model from {}", path.display());
    let model = segcut_core::models::DeepLabModel::new(&path, config.intra_threads)?;
    Ok(Arc::new(model))
}

#[cfg(not(feature = "onnx"))]
fn load_model(config: &PipelineConfig) -> Result<Arc<dyn Segmenter>, SegmentationError> {
    let _ = config;
    Err(SegmentationError::Model(
        "this build has no inference backend, rebuild with --features onnx".to_string(),
    ))
}
