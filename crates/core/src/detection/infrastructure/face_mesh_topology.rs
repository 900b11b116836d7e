//! Landmark indices of the 468-point face mesh grouped into named contours.
//!
//! "Left" and "right" are from the subject's point of view. Each run is
//! ordered so consecutive points are neighbours on the face.

use crate::detection::domain::detected_face::{ContourKind, ContourPoint, FaceContour};

pub const MESH_LANDMARKS: usize = 468;

const FACE_OVAL: [usize; 36] = [
    10, 338, 297, 332, 284, 251, 389, 356, 454, 323, 361, 288, 397, 365, 379, 378, 400, 377,
    152, 148, 176, 149, 150, 136, 172, 58, 132, 93, 234, 127, 162, 21, 54, 103, 67, 109,
];

const LEFT_EYEBROW_TOP: [usize; 5] = [336, 296, 334, 293, 300];
const LEFT_EYEBROW_BOTTOM: [usize; 5] = [285, 295, 282, 283, 276];
const RIGHT_EYEBROW_TOP: [usize; 5] = [70, 63, 105, 66, 107];
const RIGHT_EYEBROW_BOTTOM: [usize; 5] = [46, 53, 52, 65, 55];

const LEFT_EYE: [usize; 16] = [
    263, 249, 390, 373, 374, 380, 381, 382, 362, 398, 384, 385, 386, 387, 388, 466,
];
const RIGHT_EYE: [usize; 16] = [
    33, 7, 163, 144, 145, 153, 154, 155, 133, 173, 157, 158, 159, 160, 161, 246,
];

const UPPER_LIP_TOP: [usize; 11] = [61, 185, 40, 39, 37, 0, 267, 269, 270, 409, 291];
const UPPER_LIP_BOTTOM: [usize; 9] = [191, 80, 81, 82, 13, 312, 311, 310, 415];
const LOWER_LIP_TOP: [usize; 9] = [324, 318, 402, 317, 14, 87, 178, 88, 95];
const LOWER_LIP_BOTTOM: [usize; 9] = [375, 321, 405, 314, 17, 84, 181, 91, 146];

const NOSE_BRIDGE: [usize; 2] = [168, 4];
const NOSE_BOTTOM: [usize; 3] = [98, 2, 327];

const LEFT_CHEEK: [usize; 1] = [425];
const RIGHT_CHEEK: [usize; 1] = [205];

pub fn indices(kind: ContourKind) -> &'static [usize] {
    match kind {
        ContourKind::Face => &FACE_OVAL,
        ContourKind::LeftEyebrowTop => &LEFT_EYEBROW_TOP,
        ContourKind::LeftEyebrowBottom => &LEFT_EYEBROW_BOTTOM,
        ContourKind::RightEyebrowTop => &RIGHT_EYEBROW_TOP,
        ContourKind::RightEyebrowBottom => &RIGHT_EYEBROW_BOTTOM,
        ContourKind::LeftEye => &LEFT_EYE,
        ContourKind::RightEye => &RIGHT_EYE,
        ContourKind::UpperLipTop => &UPPER_LIP_TOP,
        ContourKind::UpperLipBottom => &UPPER_LIP_BOTTOM,
        ContourKind::LowerLipTop => &LOWER_LIP_TOP,
        ContourKind::LowerLipBottom => &LOWER_LIP_BOTTOM,
        ContourKind::NoseBridge => &NOSE_BRIDGE,
        ContourKind::NoseBottom => &NOSE_BOTTOM,
        ContourKind::LeftCheek => &LEFT_CHEEK,
        ContourKind::RightCheek => &RIGHT_CHEEK,
    }
}

/// Groups mesh landmarks into every contour kind, face oval first.
///
/// Returns an empty list if `landmarks` is shorter than a full mesh.
pub fn build_contours(landmarks: &[ContourPoint]) -> Vec<FaceContour> {
    if landmarks.len() < MESH_LANDMARKS {
        return Vec::new();
    }
    ContourKind::ALL
        .iter()
        .map(|&kind| FaceContour {
            kind,
            points: indices(kind).iter().map(|&i| landmarks[i]).collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ContourKind::Face, 36)]
    #[case(ContourKind::LeftEyebrowTop, 5)]
    #[case(ContourKind::LeftEye, 16)]
    #[case(ContourKind::RightEye, 16)]
    #[case(ContourKind::UpperLipTop, 11)]
    #[case(ContourKind::UpperLipBottom, 9)]
    #[case(ContourKind::LowerLipBottom, 9)]
    #[case(ContourKind::NoseBridge, 2)]
    #[case(ContourKind::NoseBottom, 3)]
    #[case(ContourKind::LeftCheek, 1)]
    fn test_contour_lengths(#[case] kind: ContourKind, #[case] expected: usize) {
        assert_eq!(indices(kind).len(), expected);
    }

    #[test]
    fn test_indices_are_within_mesh() {
        for kind in ContourKind::ALL {
            assert!(indices(kind).iter().all(|&i| i < MESH_LANDMARKS), "{}", kind.name());
        }
    }

    #[test]
    fn test_build_contours_picks_landmarks_in_order() {
        let landmarks: Vec<ContourPoint> = (0..MESH_LANDMARKS)
            .map(|i| ContourPoint::new(i as f32, 0.0))
            .collect();
        let contours = build_contours(&landmarks);

        assert_eq!(contours.len(), ContourKind::ALL.len());
        assert_eq!(contours[0].kind, ContourKind::Face);
        assert_eq!(contours[0].points[0].x, 10.0);
        assert_eq!(contours[0].points[35].x, 109.0);
    }

    #[test]
    fn test_short_mesh_yields_no_contours() {
        let landmarks = vec![ContourPoint::default(); 10];
        assert!(build_contours(&landmarks).is_empty());
    }
}
