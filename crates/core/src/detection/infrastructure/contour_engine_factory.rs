use std::path::PathBuf;

use crate::detection::domain::contour_detector::ContourDetector;
use crate::detection::domain::detection_engine::DetectorOptions;
use crate::shared::config::AppConfig;
use crate::shared::constants::{FACE_DETECTION_MODEL_NAME, FACE_MESH_MODEL_NAME};

use super::model_resolver::{self, ProgressFn};
use super::onnx_contour_detector::OnnxContourDetector;
use super::threaded_detection_engine::ThreadedDetectionEngine;

/// Local paths of the two models the contour detector needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContourModelPaths {
    pub face_detection: PathBuf,
    pub face_mesh: PathBuf,
}

/// Finds (or downloads) both models named in the config.
pub fn resolve_models(
    config: &AppConfig,
    progress: Option<ProgressFn>,
) -> Result<ContourModelPaths, Box<dyn std::error::Error>> {
    let bundled = config.model_dir.as_deref();
    let face_detection = model_resolver::resolve(
        FACE_DETECTION_MODEL_NAME,
        config.face_detection_model_url.as_deref(),
        bundled,
        None,
    )?;
    let face_mesh = model_resolver::resolve(
        FACE_MESH_MODEL_NAME,
        config.face_mesh_model_url.as_deref(),
        bundled,
        progress,
    )?;
    Ok(ContourModelPaths {
        face_detection,
        face_mesh,
    })
}

/// Detector options implied by the config.
pub fn detector_options(config: &AppConfig) -> DetectorOptions {
    DetectorOptions {
        min_confidence: config.detection_confidence.clamp(0.0, 1.0) as f32,
    }
}

/// Builds the threaded ONNX contour engine, one detector per worker.
pub fn create_contour_engine(
    config: &AppConfig,
    models: &ContourModelPaths,
) -> Result<ThreadedDetectionEngine, Box<dyn std::error::Error>> {
    let options = detector_options(config);
    let workers = config.detection_workers.max(1);

    let detectors = (0..workers)
        .map(|_| -> Result<Box<dyn ContourDetector>, Box<dyn std::error::Error>> {
            Ok(Box::new(OnnxContourDetector::new(
                &models.face_detection,
                &models.face_mesh,
                options,
            )?))
        })
        .collect::<Result<Vec<_>, _>>()?;

    log::info!(
        "Using ONNX contour detector with {workers} worker(s), confidence {:.2}",
        options.min_confidence
    );
    Ok(ThreadedDetectionEngine::new(detectors, config.detection_queue)?)
}
