use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::capture::domain::captured_frame::CapturedFrame;
use crate::capture::domain::frame_analyzer::FrameAnalyzer;
use crate::capture::domain::frame_source::CaptureError;
use crate::capture::domain::preview_sink::PreviewSink;
use crate::shared::frame::Frame;
use crate::shared::rotation::Rotation;

use super::in_flight_limiter::InFlightLimiter;

/// Consecutive grab failures tolerated before the stream is abandoned.
const MAX_CONSECUTIVE_FAILURES: usize = 30;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DeliveryStats {
    pub captured: usize,
    pub delivered: usize,
    /// Frames shown in the preview but skipped by the analyzer because
    /// every in-flight slot was still on loan.
    pub dropped: usize,
}

/// The capture-thread body shared by every frame source.
///
/// Layout: `grab → preview → (permit?) → analyzer`. Frames always reach
/// the preview; they reach the analyzer only when a permit is free.
pub(crate) struct DeliveryLoop {
    pub preview: Box<dyn PreviewSink>,
    pub analyzer: Box<dyn FrameAnalyzer>,
    pub limiter: InFlightLimiter,
    pub rotation: Rotation,
    pub stop: Arc<AtomicBool>,
    pub frame_limit: Option<usize>,
    /// Sleep between grabs, for sources that are not paced by hardware.
    pub pacing: Option<Duration>,
}

impl DeliveryLoop {
    pub(crate) fn run(
        mut self,
        mut grab: impl FnMut(usize) -> Result<Frame, CaptureError>,
    ) -> DeliveryStats {
        let mut stats = DeliveryStats::default();
        let mut failures = 0;

        while !self.stop.load(Ordering::Relaxed) {
            if self.frame_limit.is_some_and(|limit| stats.captured >= limit) {
                break;
            }

            let frame = match grab(stats.captured) {
                Ok(frame) => {
                    failures = 0;
                    frame
                }
                Err(e) => {
                    failures += 1;
                    log::warn!("Frame capture failed: {e}");
                    if failures >= MAX_CONSECUTIVE_FAILURES {
                        log::error!("Stopping capture after {failures} consecutive failures");
                        break;
                    }
                    continue;
                }
            };
            stats.captured += 1;

            self.preview.present(&frame, self.rotation);

            match self.limiter.try_acquire() {
                Some(release) => {
                    stats.delivered += 1;
                    self.analyzer
                        .analyze(CapturedFrame::new(frame, self.rotation, release));
                }
                None => {
                    stats.dropped += 1;
                    log::trace!("Analyzer busy, skipping frame {}", frame.index());
                }
            }

            if let Some(pause) = self.pacing {
                std::thread::sleep(pause);
            }
        }

        stats
    }
}

/// Handle to a running capture thread.
pub(crate) struct CaptureBinding {
    stop: Arc<AtomicBool>,
    handle: JoinHandle<DeliveryStats>,
}

impl CaptureBinding {
    pub(crate) fn new(stop: Arc<AtomicBool>, handle: JoinHandle<DeliveryStats>) -> Self {
        Self { stop, handle }
    }

    pub(crate) fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    pub(crate) fn stop_and_join(self) -> Option<DeliveryStats> {
        self.stop.store(true, Ordering::Relaxed);
        match self.handle.join() {
            Ok(stats) => {
                log::info!(
                    "Capture stopped: {} captured, {} analyzed, {} skipped",
                    stats.captured,
                    stats.delivered,
                    stats.dropped
                );
                Some(stats)
            }
            Err(_) => {
                log::error!("Capture thread panicked");
                None
            }
        }
    }
}
