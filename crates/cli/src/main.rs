use std::path::PathBuf;
use std::process;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::Parser;

use facecontour_core::capture::domain::camera_permission::{
    resolve_camera_access, AccessOutcome,
};
use facecontour_core::capture::domain::capture_settings::CaptureSettings;
use facecontour_core::capture::domain::frame_source::{CameraSelector, FrameSource};
use facecontour_core::capture::domain::preview_sink::NullPreviewSink;
use facecontour_core::capture::infrastructure::nokhwa_camera_permission::NokhwaCameraPermission;
use facecontour_core::capture::infrastructure::nokhwa_frame_source::{
    list_cameras, NokhwaFrameSource,
};
use facecontour_core::capture::infrastructure::still_image_frame_source::StillImageFrameSource;
use facecontour_core::detection::domain::detection_engine::DetectionEngine;
use facecontour_core::detection::infrastructure::contour_engine_factory::{
    create_contour_engine, resolve_models,
};
use facecontour_core::overlay::domain::face_status::FaceStatus;
use facecontour_core::overlay::domain::overlay_renderer::OverlayRenderer;
use facecontour_core::overlay::domain::snapshot::{DetectionSnapshot, SnapshotMailbox};
use facecontour_core::pipeline::live_preview_use_case::{LivePreviewUseCase, OnSnapshot};
use facecontour_core::pipeline::pipeline_logger::{PipelineLogger, StdoutPipelineLogger};
use facecontour_core::shared::config::AppConfig;
use facecontour_core::shared::constants::IMAGE_EXTENSIONS;
use facecontour_core::shared::display_surface::DisplaySurface;

/// Live face contour detection from a webcam or a still image.
#[derive(Parser)]
#[command(name = "facecontour")]
struct Cli {
    /// List available cameras and exit.
    #[arg(long)]
    list_cameras: bool,

    /// Camera device index (overrides config).
    #[arg(long)]
    camera: Option<u32>,

    /// Replay a still image instead of opening a camera.
    #[arg(long)]
    image: Option<PathBuf>,

    /// Stop after this many captured frames.
    #[arg(long)]
    frames: Option<usize>,

    /// Display size used to compute overlay geometry, as WIDTHxHEIGHT.
    #[arg(long, default_value = "540x720", value_parser = parse_display)]
    display: DisplaySurface,

    /// Clockwise rotation in degrees that turns frames upright.
    #[arg(long)]
    rotation: Option<i32>,

    /// Face detection confidence threshold (0.0-1.0).
    #[arg(long)]
    confidence: Option<f64>,

    /// Number of detection worker threads.
    #[arg(long)]
    workers: Option<usize>,

    /// Directory containing the ONNX models.
    #[arg(long)]
    model_dir: Option<PathBuf>,

    /// Config file to use instead of the per-user one.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.list_cameras {
        return print_cameras();
    }

    let config = load_config(&cli)?;
    validate(&cli, &config)?;

    if cli.image.is_none() {
        require_camera_access()?;
    }

    log::info!("Resolving face contour models");
    let models = resolve_models(&config, Some(Box::new(download_progress)))?;
    let engine: Arc<dyn DetectionEngine> = Arc::new(create_contour_engine(&config, &models)?);

    let settings = CaptureSettings::from_config(&config).with_frame_limit(cli.frames);
    let selector = CameraSelector::front(config.camera_index);
    let source: Box<dyn FrameSource> = match cli.image {
        Some(ref path) => Box::new(StillImageFrameSource::new(path, settings.clone())),
        None => Box::new(NokhwaFrameSource::new(settings.clone())),
    };

    let logger = Arc::new(Mutex::new(StdoutPipelineLogger::default()));
    let mailbox = Arc::new(SnapshotMailbox::new());
    let renderer = OverlayRenderer::from_config(&config);

    let mut use_case = LivePreviewUseCase::new(
        source,
        engine,
        mailbox.clone(),
        logger.clone(),
        Some(status_reporter(renderer, cli.display)),
    );

    log::info!(
        "Starting {}",
        LivePreviewUseCase::describe(&settings, selector)
    );
    use_case.start(selector, Box::new(NullPreviewSink))?;

    while use_case.is_streaming() {
        std::thread::sleep(Duration::from_millis(50));
    }
    // Dropping the use case releases the last engine handle, which drains
    // in-flight detections before the summary is printed.
    drop(use_case);

    let latest = mailbox.latest();
    log::info!(
        "Final status: {} ({} snapshot(s) published)",
        latest.status,
        mailbox.generation()
    );
    logger.lock().unwrap_or_else(|e| e.into_inner()).summary();
    Ok(())
}

fn print_cameras() -> Result<(), Box<dyn std::error::Error>> {
    let cameras = list_cameras()?;
    if cameras.is_empty() {
        println!("No cameras found");
    }
    for camera in cameras {
        println!("{camera}");
    }
    Ok(())
}

fn load_config(cli: &Cli) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let mut config = match cli.config {
        Some(ref path) => AppConfig::load_from(path)?,
        None => AppConfig::load(),
    };

    if let Some(index) = cli.camera {
        config.camera_index = index;
    }
    if let Some(degrees) = cli.rotation {
        config.rotation_degrees = degrees;
    }
    if let Some(confidence) = cli.confidence {
        config.detection_confidence = confidence;
    }
    if let Some(workers) = cli.workers {
        config.detection_workers = workers;
    }
    if let Some(ref dir) = cli.model_dir {
        config.model_dir = Some(dir.clone());
    }
    Ok(config)
}

fn validate(cli: &Cli, config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(ref path) = cli.image {
        if !path.exists() {
            return Err(format!("Image file not found: {}", path.display()).into());
        }
        let supported = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
            .unwrap_or(false);
        if !supported {
            return Err(format!("Unsupported image type: {}", path.display()).into());
        }
    }
    if !(0.0..=1.0).contains(&config.detection_confidence) {
        return Err(format!(
            "Confidence must be between 0.0 and 1.0, got {}",
            config.detection_confidence
        )
        .into());
    }
    if config.detection_workers == 0 {
        return Err("Workers must be at least 1".into());
    }
    if config.rotation_degrees.rem_euclid(90) != 0 {
        return Err(format!(
            "Rotation must be a multiple of 90, got {}",
            config.rotation_degrees
        )
        .into());
    }
    if cli.frames == Some(0) {
        return Err("--frames must be at least 1".into());
    }
    Ok(())
}

/// Blocks until the one-shot camera permission flow finishes.
fn require_camera_access() -> Result<(), Box<dyn std::error::Error>> {
    let (tx, rx) = crossbeam_channel::bounded(1);
    resolve_camera_access(
        &NokhwaCameraPermission,
        Box::new(move |outcome| {
            let _ = tx.send(outcome);
        }),
    );
    match rx.recv() {
        Ok(AccessOutcome::Granted) => Ok(()),
        Ok(AccessOutcome::Denied) | Err(_) => {
            Err("Camera access denied. Grant access in system settings and try again.".into())
        }
    }
}

/// Logs status changes and the overlay geometry of every snapshot.
fn status_reporter(renderer: OverlayRenderer, display: DisplaySurface) -> OnSnapshot {
    let last_status: Mutex<Option<FaceStatus>> = Mutex::new(None);
    Arc::new(move |snapshot: &DetectionSnapshot| {
        let mut last = last_status.lock().unwrap_or_else(|e| e.into_inner());
        if *last != Some(snapshot.status) {
            log::info!("{}", snapshot.status);
            *last = Some(snapshot.status);
        }
        drop(last);

        let polylines = renderer.geometry(snapshot, display);
        if let Some(first) = polylines.first().and_then(|p| p.points.first()) {
            log::debug!(
                "Frame {:?}: {} polyline(s), first point ({:.1}, {:.1}) on {}x{}",
                snapshot.frame_index,
                polylines.len(),
                first.x,
                first.y,
                display.width,
                display.height
            );
        }
    })
}

fn parse_display(value: &str) -> Result<DisplaySurface, String> {
    let (w, h) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{value}'"))?;
    let width: f32 = w.trim().parse().map_err(|_| format!("invalid width '{w}'"))?;
    let height: f32 = h.trim().parse().map_err(|_| format!("invalid height '{h}'"))?;
    if width <= 0.0 || height <= 0.0 {
        return Err(format!("display size must be positive, got '{value}'"));
    }
    Ok(DisplaySurface::new(width, height))
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading face mesh model... {pct}%");
    } else {
        eprint!("\rDownloading face mesh model... {downloaded} bytes");
    }
}
