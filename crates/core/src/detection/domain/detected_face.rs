/// A landmark in upright input-image pixel coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ContourPoint {
    pub x: f32,
    pub y: f32,
}

impl ContourPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Named groups of facial contour points.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContourKind {
    Face,
    LeftEyebrowTop,
    LeftEyebrowBottom,
    RightEyebrowTop,
    RightEyebrowBottom,
    LeftEye,
    RightEye,
    UpperLipTop,
    UpperLipBottom,
    LowerLipTop,
    LowerLipBottom,
    NoseBridge,
    NoseBottom,
    LeftCheek,
    RightCheek,
}

impl ContourKind {
    /// Every kind, face oval first.
    pub const ALL: [ContourKind; 15] = [
        ContourKind::Face,
        ContourKind::LeftEyebrowTop,
        ContourKind::LeftEyebrowBottom,
        ContourKind::RightEyebrowTop,
        ContourKind::RightEyebrowBottom,
        ContourKind::LeftEye,
        ContourKind::RightEye,
        ContourKind::UpperLipTop,
        ContourKind::UpperLipBottom,
        ContourKind::LowerLipTop,
        ContourKind::LowerLipBottom,
        ContourKind::NoseBridge,
        ContourKind::NoseBottom,
        ContourKind::LeftCheek,
        ContourKind::RightCheek,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ContourKind::Face => "face",
            ContourKind::LeftEyebrowTop => "left_eyebrow_top",
            ContourKind::LeftEyebrowBottom => "left_eyebrow_bottom",
            ContourKind::RightEyebrowTop => "right_eyebrow_top",
            ContourKind::RightEyebrowBottom => "right_eyebrow_bottom",
            ContourKind::LeftEye => "left_eye",
            ContourKind::RightEye => "right_eye",
            ContourKind::UpperLipTop => "upper_lip_top",
            ContourKind::UpperLipBottom => "upper_lip_bottom",
            ContourKind::LowerLipTop => "lower_lip_top",
            ContourKind::LowerLipBottom => "lower_lip_bottom",
            ContourKind::NoseBridge => "nose_bridge",
            ContourKind::NoseBottom => "nose_bottom",
            ContourKind::LeftCheek => "left_cheek",
            ContourKind::RightCheek => "right_cheek",
        }
    }
}

/// An ordered run of points belonging to one contour group.
#[derive(Clone, Debug, PartialEq)]
pub struct FaceContour {
    pub kind: ContourKind,
    pub points: Vec<ContourPoint>,
}

/// Axis-aligned face box in upright input-image pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// One face found by the detection engine.
///
/// `contours` keeps the engine's order. The face oval comes first; the list
/// is empty when the mesh could not be fitted.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectedFace {
    pub bounding_box: BoundingBox,
    pub contours: Vec<FaceContour>,
    pub confidence: f32,
}

impl DetectedFace {
    /// The first contour group, the only one the overlay draws.
    pub fn primary_contour(&self) -> Option<&FaceContour> {
        self.contours.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contour(kind: ContourKind, n: usize) -> FaceContour {
        FaceContour {
            kind,
            points: (0..n).map(|i| ContourPoint::new(i as f32, 0.0)).collect(),
        }
    }

    #[test]
    fn test_primary_contour_is_first_group() {
        let face = DetectedFace {
            bounding_box: BoundingBox::default(),
            contours: vec![contour(ContourKind::Face, 36), contour(ContourKind::LeftEye, 16)],
            confidence: 0.9,
        };
        assert_eq!(face.primary_contour().unwrap().kind, ContourKind::Face);
        assert_eq!(face.primary_contour().unwrap().points.len(), 36);
    }

    #[test]
    fn test_face_without_contours_has_no_primary() {
        let face = DetectedFace {
            bounding_box: BoundingBox::default(),
            contours: vec![],
            confidence: 0.9,
        };
        assert!(face.primary_contour().is_none());
    }

    #[test]
    fn test_all_kinds_start_with_face_and_have_unique_names() {
        assert_eq!(ContourKind::ALL[0], ContourKind::Face);
        let mut names: Vec<_> = ContourKind::ALL.iter().map(|k| k.name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), ContourKind::ALL.len());
    }

    #[test]
    fn test_bounding_box_center() {
        let b = BoundingBox {
            x: 10.0,
            y: 20.0,
            width: 30.0,
            height: 40.0,
        };
        assert_eq!(b.center(), (25.0, 40.0));
    }
}
