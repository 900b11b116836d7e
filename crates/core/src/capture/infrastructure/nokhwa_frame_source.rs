//! Live webcam capture through `nokhwa`.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::thread;

use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    ApiBackend, CameraIndex, RequestedFormat, RequestedFormatType,
    Resolution as CameraResolution,
};
use nokhwa::Camera;

use crate::capture::domain::capture_settings::CaptureSettings;
use crate::capture::domain::frame_analyzer::FrameAnalyzer;
use crate::capture::domain::frame_source::{CameraSelector, CaptureError, FrameSource};
use crate::capture::domain::preview_sink::PreviewSink;
use crate::shared::frame::Frame;

use super::delivery_loop::{CaptureBinding, DeliveryLoop, DeliveryStats};
use super::in_flight_limiter::InFlightLimiter;

/// A camera device as reported by the OS.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CameraDescriptor {
    pub index: u32,
    pub name: String,
}

impl std::fmt::Display for CameraDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.index, self.name)
    }
}

/// Lists the cameras available on this machine.
pub fn list_cameras() -> Result<Vec<CameraDescriptor>, CaptureError> {
    let devices =
        nokhwa::query(ApiBackend::Auto).map_err(|e| CaptureError::Query(e.to_string()))?;

    Ok(devices
        .iter()
        .enumerate()
        .map(|(idx, info)| CameraDescriptor {
            index: idx as u32,
            name: info.human_name().to_string(),
        })
        .collect())
}

/// Frame source backed by a `nokhwa` camera.
///
/// The camera is opened and owned by the capture thread, so the device
/// handle never crosses threads. `bind` waits until the stream is open and
/// reports open failures synchronously.
pub struct NokhwaFrameSource {
    settings: CaptureSettings,
    binding: Option<CaptureBinding>,
}

impl NokhwaFrameSource {
    pub fn new(settings: CaptureSettings) -> Self {
        Self {
            settings,
            binding: None,
        }
    }
}

impl FrameSource for NokhwaFrameSource {
    fn bind(
        &mut self,
        selector: CameraSelector,
        preview: Box<dyn PreviewSink>,
        analyzer: Box<dyn FrameAnalyzer>,
    ) -> Result<(), CaptureError> {
        if self.binding.is_some() {
            return Err(CaptureError::AlreadyBound);
        }

        let settings = self.settings.clone();
        let stop = Arc::new(AtomicBool::new(false));
        let (ready_tx, ready_rx) = crossbeam_channel::bounded::<Result<(), CaptureError>>(1);

        let delivery = DeliveryLoop {
            preview,
            analyzer,
            limiter: InFlightLimiter::new(settings.max_in_flight),
            rotation: settings.rotation,
            stop: stop.clone(),
            frame_limit: settings.frame_limit,
            pacing: None,
        };

        let handle = thread::Builder::new()
            .name("camera-capture".into())
            .spawn(move || {
                let mut camera = match open_camera(selector.index, &settings) {
                    Ok(camera) => {
                        let _ = ready_tx.send(Ok(()));
                        camera
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return DeliveryStats::default();
                    }
                };

                let stats = delivery.run(|index| grab_frame(&mut camera, index));

                if let Err(e) = camera.stop_stream() {
                    log::warn!("Failed to stop camera {} stream: {e}", selector.index);
                }
                stats
            })
            .map_err(|e| CaptureError::Thread(e.to_string()))?;

        let ready = ready_rx.recv().unwrap_or_else(|_| {
            Err(CaptureError::Thread(
                "capture thread exited during startup".into(),
            ))
        });
        let binding = CaptureBinding::new(stop, handle);

        match ready {
            Ok(()) => {
                self.binding = Some(binding);
                Ok(())
            }
            Err(e) => {
                binding.stop_and_join();
                Err(e)
            }
        }
    }

    fn unbind_all(&mut self) {
        if let Some(binding) = self.binding.take() {
            binding.stop_and_join();
        }
    }

    fn is_streaming(&self) -> bool {
        self.binding.as_ref().is_some_and(CaptureBinding::is_running)
    }
}

impl Drop for NokhwaFrameSource {
    fn drop(&mut self) {
        self.unbind_all();
    }
}

fn open_camera(index: u32, settings: &CaptureSettings) -> Result<Camera, CaptureError> {
    let requested =
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestResolution);

    log::debug!(
        "Opening camera {index} with requested resolution {}x{} @ {} fps",
        settings.width,
        settings.height,
        settings.fps
    );

    let mut camera =
        Camera::new(CameraIndex::Index(index), requested).map_err(|e| CaptureError::Open {
            index,
            message: e.to_string(),
        })?;

    // Some drivers only accept format changes after the stream is open.
    camera.open_stream().map_err(|e| CaptureError::Open {
        index,
        message: e.to_string(),
    })?;

    if let Err(e) = camera.set_resolution(CameraResolution::new(settings.width, settings.height))
    {
        log::warn!(
            "Could not set resolution {}x{}: {e}. Using camera default.",
            settings.width,
            settings.height
        );
    }
    if let Err(e) = camera.set_frame_rate(settings.fps) {
        log::warn!(
            "Could not set frame rate {} fps: {e}. Using camera default.",
            settings.fps
        );
    }

    let actual = camera.resolution();
    log::info!(
        "Camera {index} streaming at {}x{} @ {} fps",
        actual.width(),
        actual.height(),
        camera.frame_rate()
    );

    Ok(camera)
}

fn grab_frame(camera: &mut Camera, index: usize) -> Result<Frame, CaptureError> {
    let buffer = camera
        .frame()
        .map_err(|e| CaptureError::Stream(e.to_string()))?;
    let decoded = buffer
        .decode_image::<RgbFormat>()
        .map_err(|e| CaptureError::Stream(e.to_string()))?;

    let (width, height) = (decoded.width(), decoded.height());
    Ok(Frame::new(decoded.into_raw(), width, height, 3, index))
}
