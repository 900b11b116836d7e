use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::capture::domain::capture_settings::CaptureSettings;
use crate::capture::domain::frame_analyzer::FrameAnalyzer;
use crate::capture::domain::frame_source::{CameraSelector, CaptureError, FrameSource};
use crate::capture::domain::preview_sink::PreviewSink;
use crate::shared::frame::Frame;

use super::delivery_loop::{CaptureBinding, DeliveryLoop};
use super::in_flight_limiter::InFlightLimiter;

/// Replays a single image file as a live stream at the configured fps.
///
/// Stands in for a camera on machines without one. The rotation hint
/// from the settings is attached to every frame, so portrait-captured
/// stills can be tested the same way as a rotated sensor.
pub struct StillImageFrameSource {
    path: PathBuf,
    settings: CaptureSettings,
    binding: Option<CaptureBinding>,
}

impl StillImageFrameSource {
    pub fn new(path: &Path, settings: CaptureSettings) -> Self {
        Self {
            path: path.to_path_buf(),
            settings,
            binding: None,
        }
    }

    fn load(&self) -> Result<image::RgbImage, CaptureError> {
        image::open(&self.path)
            .map(|img| img.to_rgb8())
            .map_err(|e| CaptureError::Image {
                path: self.path.display().to_string(),
                message: e.to_string(),
            })
    }
}

impl FrameSource for StillImageFrameSource {
    fn bind(
        &mut self,
        selector: CameraSelector,
        preview: Box<dyn PreviewSink>,
        analyzer: Box<dyn FrameAnalyzer>,
    ) -> Result<(), CaptureError> {
        if self.binding.is_some() {
            return Err(CaptureError::AlreadyBound);
        }
        log::debug!(
            "Still image source ignores camera selector {}",
            selector.index
        );

        let image = self.load()?;
        let (width, height) = image.dimensions();
        let pixels = image.into_raw();
        log::info!(
            "Replaying {} ({width}x{height}) at {} fps",
            self.path.display(),
            self.settings.fps
        );

        let stop = Arc::new(AtomicBool::new(false));
        let delivery = DeliveryLoop {
            preview,
            analyzer,
            limiter: InFlightLimiter::new(self.settings.max_in_flight),
            rotation: self.settings.rotation,
            stop: stop.clone(),
            frame_limit: self.settings.frame_limit,
            pacing: Some(Duration::from_secs_f64(
                1.0 / self.settings.fps.max(1) as f64,
            )),
        };

        let handle = thread::Builder::new()
            .name("still-image-capture".into())
            .spawn(move || {
                delivery.run(|index| Ok(Frame::new(pixels.clone(), width, height, 3, index)))
            })
            .map_err(|e| CaptureError::Thread(e.to_string()))?;

        self.binding = Some(CaptureBinding::new(stop, handle));
        Ok(())
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

impl Drop for StillImageFrameSource {
    fn drop(&mut self) {
        self.unbind_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::domain::captured_frame::CapturedFrame;
    use crate::capture::domain::preview_sink::NullPreviewSink;
    use crate::shared::rotation::Rotation;
    use std::sync::Mutex;
    use std::time::Instant;

    struct RecordingAnalyzer {
        seen: Arc<Mutex<Vec<(usize, u32, u32, Rotation)>>>,
    }

    impl FrameAnalyzer for RecordingAnalyzer {
        fn analyze(&mut self, frame: CapturedFrame) {
            let f = frame.frame().clone();
            self.seen
                .lock()
                .unwrap()
                .push((f.index(), f.width(), f.height(), frame.rotation()));
            frame.close();
        }
    }

    fn write_image(dir: &Path, w: u32, h: u32) -> PathBuf {
        let path = dir.join("still.png");
        image::RgbImage::new(w, h).save(&path).unwrap();
        path
    }

    fn fast_settings(limit: usize) -> CaptureSettings {
        CaptureSettings {
            fps: 1000,
            rotation: Rotation::Deg90,
            ..CaptureSettings::default()
        }
        .with_frame_limit(Some(limit))
    }

    fn wait_until_idle(source: &StillImageFrameSource) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while source.is_streaming() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_replays_image_with_rotation_hint() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_image(dir.path(), 8, 6);
        let seen = Arc::new(Mutex::new(Vec::new()));

        let mut source = StillImageFrameSource::new(&path, fast_settings(5));
        source
            .bind(
                CameraSelector::front(0),
                Box::new(NullPreviewSink),
                Box::new(RecordingAnalyzer { seen: seen.clone() }),
            )
            .unwrap();
        wait_until_idle(&source);
        source.unbind_all();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 5);
        assert_eq!(seen[0], (0, 8, 6, Rotation::Deg90));
        assert_eq!(seen[4].0, 4);
    }

    #[test]
    fn test_second_bind_requires_unbind() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_image(dir.path(), 4, 4);
        let seen = Arc::new(Mutex::new(Vec::new()));

        let mut source = StillImageFrameSource::new(&path, fast_settings(1000));
        source
            .bind(
                CameraSelector::front(0),
                Box::new(NullPreviewSink),
                Box::new(RecordingAnalyzer { seen: seen.clone() }),
            )
            .unwrap();

        let again = source.bind(
            CameraSelector::front(0),
            Box::new(NullPreviewSink),
            Box::new(RecordingAnalyzer { seen: seen.clone() }),
        );
        assert!(matches!(again, Err(CaptureError::AlreadyBound)));

        source.unbind_all();
        assert!(!source.is_streaming());
        source
            .bind(
                CameraSelector::front(0),
                Box::new(NullPreviewSink),
                Box::new(RecordingAnalyzer { seen }),
            )
            .unwrap();
    }

    #[test]
    fn test_missing_file_fails_bind() {
        let dir = tempfile::tempdir().unwrap();
        let mut source =
            StillImageFrameSource::new(&dir.path().join("absent.png"), fast_settings(1));
        let result = source.bind(
            CameraSelector::front(0),
            Box::new(NullPreviewSink),
            Box::new(RecordingAnalyzer {
                seen: Arc::new(Mutex::new(Vec::new())),
            }),
        );
        assert!(matches!(result, Err(CaptureError::Image { .. })));
        assert!(!source.is_streaming());
    }
}
