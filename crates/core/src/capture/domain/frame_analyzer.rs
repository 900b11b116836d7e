use crate::capture::domain::captured_frame::CapturedFrame;

/// Consumer of live frames, invoked on the frame source's capture thread.
///
/// Takes ownership of each frame and is responsible for releasing it,
/// either directly or by handing it to asynchronous work that does.
pub trait FrameAnalyzer: Send {
    fn analyze(&mut self, frame: CapturedFrame);
}
