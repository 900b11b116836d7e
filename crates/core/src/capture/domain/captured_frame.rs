use std::sync::Arc;

use crate::shared::frame::Frame;
use crate::shared::resolution::Resolution;
use crate::shared::rotation::Rotation;

/// Returns a frame's buffer slot to the frame source.
pub type ReleaseFn = Box<dyn FnOnce() + Send>;

/// A frame on loan from a frame source.
///
/// The source cannot deliver more frames than it has buffer slots, so every
/// captured frame must be released. Release runs exactly once: on
/// [`CapturedFrame::close`], or on drop if the frame was never closed. Drop
/// also covers unwinding out of a panicking callback.
pub struct CapturedFrame {
    frame: Arc<Frame>,
    rotation: Rotation,
    release: Option<ReleaseFn>,
}

impl CapturedFrame {
    pub fn new(frame: Frame, rotation: Rotation, release: ReleaseFn) -> Self {
        Self {
            frame: Arc::new(frame),
            rotation,
            release: Some(release),
        }
    }

    /// Shared handle to the pixel data. Outlives the loan if cloned.
    pub fn frame(&self) -> &Arc<Frame> {
        &self.frame
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn index(&self) -> usize {
        self.frame.index()
    }

    /// Raw buffer dimensions, before any rotation is applied.
    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.frame.width(), self.frame.height())
    }

    /// Releases the buffer back to the frame source.
    pub fn close(mut self) {
        self.release_now();
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for CapturedFrame {
    fn drop(&mut self) {
        self.release_now();
    }
}

impl std::fmt::Debug for CapturedFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapturedFrame")
            .field("index", &self.frame.index())
            .field("width", &self.frame.width())
            .field("height", &self.frame.height())
            .field("rotation", &self.rotation)
            .field("released", &self.release.is_none())
            .finish()
    }
}
