use thiserror::Error;

use crate::capture::domain::frame_analyzer::FrameAnalyzer;
use crate::capture::domain::preview_sink::PreviewSink;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("failed to open camera {index}: {message}")]
    Open { index: u32, message: String },
    #[error("camera stream error: {0}")]
    Stream(String),
    #[error("failed to load image {path}: {message}")]
    Image { path: String, message: String },
    #[error("frame source is already bound; call unbind_all first")]
    AlreadyBound,
    #[error("failed to start capture thread: {0}")]
    Thread(String),
    #[error("camera enumeration failed: {0}")]
    Query(String),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LensFacing {
    #[default]
    Front,
    Back,
}

/// Which camera to bind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CameraSelector {
    pub index: u32,
    pub facing: LensFacing,
}

impl CameraSelector {
    /// The user-facing camera at the given device index.
    pub fn front(index: u32) -> Self {
        Self {
            index,
            facing: LensFacing::Front,
        }
    }

    /// Front cameras present a mirrored view to the user.
    pub fn is_mirrored(&self) -> bool {
        self.facing == LensFacing::Front
    }
}

/// A live video source that delivers frames to one preview sink and one
/// analyzer on a background thread, in capture order.
///
/// At most one binding exists at a time. Callers rebinding with a new
/// configuration must call [`FrameSource::unbind_all`] first.
pub trait FrameSource: Send {
    fn bind(
        &mut self,
        selector: CameraSelector,
        preview: Box<dyn PreviewSink>,
        analyzer: Box<dyn FrameAnalyzer>,
    ) -> Result<(), CaptureError>;

    /// Stops delivery and drops the current binding. No-op when unbound.
    fn unbind_all(&mut self);

    /// True while the capture thread is still delivering frames.
    fn is_streaming(&self) -> bool;
}
