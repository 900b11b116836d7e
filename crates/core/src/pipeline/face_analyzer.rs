use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::capture::domain::captured_frame::CapturedFrame;
use crate::capture::domain::frame_analyzer::FrameAnalyzer;
use crate::detection::domain::detection_engine::{DetectionEngine, DetectionError};
use crate::detection::domain::input_image::InputImage;
use crate::overlay::domain::snapshot::DetectionSnapshot;
use crate::pipeline::pipeline_logger::SharedPipelineLogger;

/// Receives every successful detection, on a detection worker thread.
pub type OnDetected = Arc<dyn Fn(DetectionSnapshot) + Send + Sync>;

/// Bridges the frame source and the detection engine.
///
/// Submits each frame without blocking the capture thread. The captured
/// frame travels inside the completion, so its buffer is released once the
/// engine finishes with it, whether detection succeeded, failed, or the
/// callback panicked.
pub struct FaceAnalyzer {
    engine: Arc<dyn DetectionEngine>,
    on_detected: OnDetected,
    logger: SharedPipelineLogger,
    /// Highest completed capture index plus one; 0 before any completion.
    newest_completed: Arc<AtomicUsize>,
}

impl FaceAnalyzer {
    pub fn new(
        engine: Arc<dyn DetectionEngine>,
        on_detected: OnDetected,
        logger: SharedPipelineLogger,
    ) -> Self {
        Self {
            engine,
            on_detected,
            logger,
            newest_completed: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl FrameAnalyzer for FaceAnalyzer {
    fn analyze(&mut self, frame: CapturedFrame) {
        if frame.frame().is_empty() {
            log::warn!(
                "Skipping frame {} with empty dimensions {}x{}",
                frame.index(),
                frame.frame().width(),
                frame.frame().height()
            );
            frame.close();
            return;
        }

        let index = frame.index();
        let resolution = frame.resolution();
        let image = InputImage::new(frame.frame().clone(), frame.rotation());
        let on_detected = self.on_detected.clone();
        let logger = self.logger.clone();
        let newest_completed = self.newest_completed.clone();
        let submitted = Instant::now();

        self.engine.process(
            image,
            Box::new(move |result| {
                let captured = frame;
                let elapsed_ms = submitted.elapsed().as_secs_f64() * 1000.0;

                match result {
                    Ok(faces) => {
                        let previous = newest_completed.fetch_max(index + 1, Ordering::AcqRel);
                        let out_of_order = previous > index + 1;
                        {
                            let mut logger = logger.lock().unwrap_or_else(|e| e.into_inner());
                            logger.timing("detect", elapsed_ms);
                            logger.metric("faces", faces.len() as f64);
                            logger.metric("out_of_order", if out_of_order { 1.0 } else { 0.0 });
                            logger.progress(index + 1, 0);
                        }
                        if out_of_order {
                            log::debug!(
                                "Frame {index} completed after frame {}",
                                previous - 1
                            );
                        }
                        on_detected(DetectionSnapshot::new(faces, resolution, index));
                    }
                    Err(DetectionError::Busy) => {
                        log::debug!("Detection queue full, dropped frame {index}");
                        let mut logger = logger.lock().unwrap_or_else(|e| e.into_inner());
                        logger.metric("dropped", 1.0);
                    }
                    Err(e) => {
                        log::error!("Face detection failed for frame {index}: {e}");
                        let mut logger = logger.lock().unwrap_or_else(|e| e.into_inner());
                        logger.metric("detection_errors", 1.0);
                    }
                }

                captured.close();
            }),
        );
    }
}
