use std::sync::Arc;

use crate::capture::domain::capture_settings::CaptureSettings;
use crate::capture::domain::frame_source::{CameraSelector, CaptureError, FrameSource};
use crate::capture::domain::preview_sink::PreviewSink;
use crate::detection::domain::detection_engine::DetectionEngine;
use crate::overlay::domain::snapshot::{DetectionSnapshot, SnapshotMailbox};
use crate::pipeline::face_analyzer::FaceAnalyzer;
use crate::pipeline::pipeline_logger::SharedPipelineLogger;

/// Notified after each snapshot is published, on a detection worker thread.
pub type OnSnapshot = Arc<dyn Fn(&DetectionSnapshot) + Send + Sync>;

/// Wires a frame source to the detection engine and the snapshot mailbox.
///
/// Each `start` tears down the previous binding before binding again, so
/// switching cameras is a plain second call.
pub struct LivePreviewUseCase {
    source: Box<dyn FrameSource>,
    engine: Arc<dyn DetectionEngine>,
    mailbox: Arc<SnapshotMailbox>,
    logger: SharedPipelineLogger,
    on_snapshot: Option<OnSnapshot>,
}

impl LivePreviewUseCase {
    pub fn new(
        source: Box<dyn FrameSource>,
        engine: Arc<dyn DetectionEngine>,
        mailbox: Arc<SnapshotMailbox>,
        logger: SharedPipelineLogger,
        on_snapshot: Option<OnSnapshot>,
    ) -> Self {
        Self {
            source,
            engine,
            mailbox,
            logger,
            on_snapshot,
        }
    }

    pub fn start(
        &mut self,
        selector: CameraSelector,
        preview: Box<dyn PreviewSink>,
    ) -> Result<(), CaptureError> {
        self.source.unbind_all();

        let mailbox = self.mailbox.clone();
        let on_snapshot = self.on_snapshot.clone();
        let analyzer = FaceAnalyzer::new(
            self.engine.clone(),
            Arc::new(move |snapshot| {
                // The mailbox may already hold a newer snapshot by notify time.
                let snapshot = Arc::new(snapshot);
                let generation = mailbox.publish(snapshot.clone());
                if let Some(ref notify) = on_snapshot {
                    notify(snapshot.as_ref());
                }
                log::trace!("Published snapshot generation {generation}");
            }),
            self.logger.clone(),
        );

        self.source.bind(selector, preview, Box::new(analyzer))?;
        self.logger
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .info(&format!("Camera {} bound", selector.index));
        Ok(())
    }

    /// Stops frame delivery. Detections already in flight still complete
    /// and publish.
    pub fn stop(&mut self) {
        self.source.unbind_all();
    }

    pub fn is_streaming(&self) -> bool {
        self.source.is_streaming()
    }

    pub fn mailbox(&self) -> &Arc<SnapshotMailbox> {
        &self.mailbox
    }

    /// Human-readable summary of the capture request, for startup logs.
    pub fn describe(settings: &CaptureSettings, selector: CameraSelector) -> String {
        format!(
            "camera {} ({:?}), {}x{} @ {} fps, rotation {}°",
            selector.index,
            selector.facing,
            settings.width,
            settings.height,
            settings.fps,
            settings.rotation.degrees()
        )
    }
}

impl Drop for LivePreviewUseCase {
    fn drop(&mut self) {
        self.source.unbind_all();
    }
}
