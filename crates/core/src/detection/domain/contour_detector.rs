use crate::detection::domain::detected_face::DetectedFace;
use crate::detection::domain::input_image::InputImage;

/// Synchronous contour detector run by a detection worker.
///
/// Each worker owns its own instance, so implementations may keep mutable
/// inference state without locking.
pub trait ContourDetector: Send {
    fn detect(
        &mut self,
        image: &InputImage,
    ) -> Result<Vec<DetectedFace>, Box<dyn std::error::Error>>;
}
