use crate::shared::frame::Frame;
use crate::shared::rotation::Rotation;

/// Receives every captured frame for on-screen preview, before analysis.
pub trait PreviewSink: Send {
    fn present(&mut self, frame: &Frame, rotation: Rotation);
}

/// Preview sink for headless runs.
pub struct NullPreviewSink;

impl PreviewSink for NullPreviewSink {
    fn present(&mut self, _frame: &Frame, _rotation: Rotation) {}
}
