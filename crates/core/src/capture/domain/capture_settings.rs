use crate::shared::config::AppConfig;
use crate::shared::constants::{
    DEFAULT_CAPTURE_FPS, DEFAULT_CAPTURE_HEIGHT, DEFAULT_CAPTURE_WIDTH, DEFAULT_MAX_IN_FLIGHT,
};
use crate::shared::rotation::Rotation;

/// Capture parameters shared by all frame source implementations.
#[derive(Clone, Debug, PartialEq)]
pub struct CaptureSettings {
    /// Requested resolution. Drivers may substitute their own.
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub rotation: Rotation,
    pub max_in_flight: usize,
    /// Stop after this many captured frames. `None` streams until unbound.
    pub frame_limit: Option<usize>,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            width: DEFAULT_CAPTURE_WIDTH,
            height: DEFAULT_CAPTURE_HEIGHT,
            fps: DEFAULT_CAPTURE_FPS,
            rotation: Rotation::Deg0,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
            frame_limit: None,
        }
    }
}

impl CaptureSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        let rotation = Rotation::from_degrees(config.rotation_degrees).unwrap_or_else(|| {
            log::warn!(
                "Ignoring rotation of {} degrees (must be a multiple of 90)",
                config.rotation_degrees
            );
            Rotation::Deg0
        });
        Self {
            width: config.capture_width,
            height: config.capture_height,
            fps: config.capture_fps.max(1),
            rotation,
            max_in_flight: config.max_in_flight.max(1),
            frame_limit: None,
        }
    }

    pub fn with_frame_limit(mut self, limit: Option<usize>) -> Self {
        self.frame_limit = limit;
        self
    }
}
