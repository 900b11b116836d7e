use thiserror::Error;

use crate::detection::domain::detected_face::DetectedFace;
use crate::detection::domain::input_image::InputImage;

/// Fixed at engine construction. The engine always produces every contour
/// group, for the single most prominent face.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DetectorOptions {
    pub min_confidence: f32,
}

impl Default for DetectorOptions {
    fn default() -> Self {
        Self {
            min_confidence: 0.5,
        }
    }
}

#[derive(Error, Debug)]
pub enum DetectionError {
    #[error("detection failed: {0}")]
    Engine(String),
    #[error("detection queue is full")]
    Busy,
    #[error("detection engine has shut down")]
    ShutDown,
    #[error("detection engine needs at least one worker")]
    NoWorkers,
    #[error("failed to start detection worker: {0}")]
    Spawn(String),
}

pub type DetectionResult = Result<Vec<DetectedFace>, DetectionError>;

/// Called exactly once per submitted image, possibly on another thread.
pub type Completion = Box<dyn FnOnce(DetectionResult) + Send>;

/// Asynchronous face detection.
///
/// `process` must not block the caller. With more than one worker,
/// completions may arrive out of submission order.
pub trait DetectionEngine: Send + Sync {
    fn process(&self, image: InputImage, on_complete: Completion);
}
