use crate::detection::domain::detected_face::DetectedFace;
use crate::shared::constants::{STATUS_FACE_DETECTED, STATUS_NO_FACE_DETECTED};

/// User-facing detection status, derived from the latest face list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FaceStatus {
    Detected,
    #[default]
    NotDetected,
}

impl FaceStatus {
    pub fn from_faces(faces: &[DetectedFace]) -> Self {
        if faces.is_empty() {
            FaceStatus::NotDetected
        } else {
            FaceStatus::Detected
        }
    }

    pub fn text(self) -> &'static str {
        match self {
            FaceStatus::Detected => STATUS_FACE_DETECTED,
            FaceStatus::NotDetected => STATUS_NO_FACE_DETECTED,
        }
    }
}

impl std::fmt::Display for FaceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::domain::detected_face::BoundingBox;

    #[test]
    fn test_empty_list_is_not_detected() {
        let status = FaceStatus::from_faces(&[]);
        assert_eq!(status, FaceStatus::NotDetected);
        assert_eq!(status.to_string(), "no face detected");
    }

    #[test]
    fn test_any_face_is_detected() {
        let face = DetectedFace {
            bounding_box: BoundingBox::default(),
            contours: vec![],
            confidence: 0.9,
        };
        let status = FaceStatus::from_faces(&[face]);
        assert_eq!(status, FaceStatus::Detected);
        assert_eq!(status.text(), "face detected");
    }
}
