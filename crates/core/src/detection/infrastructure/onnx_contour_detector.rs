/// Face contour detector using ONNX Runtime via `ort`.
///
/// Two stages: BlazeFace proposes face boxes on the upright image, then a
/// 468-point face-mesh model runs on a square crop around the best face.
/// Landmarks are grouped into named contours by [`face_mesh_topology`].
use std::path::Path;

use image::RgbImage;

use crate::detection::domain::contour_detector::ContourDetector;
use crate::detection::domain::detected_face::{ContourPoint, DetectedFace};
use crate::detection::domain::detection_engine::DetectorOptions;
use crate::detection::domain::input_image::InputImage;
use crate::detection::infrastructure::blazeface::BlazefaceProposer;
use crate::detection::infrastructure::execution_provider;
use crate::detection::infrastructure::face_mesh_topology::{self, MESH_LANDMARKS};
use crate::detection::infrastructure::math::square_around;

/// Face-mesh model input resolution.
const MESH_INPUT_SIZE: u32 = 192;

/// Crop margin around the detector box; the mesh expects the whole head.
const MESH_CROP_SCALE: f32 = 1.5;

/// Square crop `[x, y, side]` in upright image pixels.
type Crop = [f32; 3];

pub struct OnnxContourDetector {
    proposer: BlazefaceProposer,
    mesh: ort::session::Session,
}

impl OnnxContourDetector {
    pub fn new(
        detection_model: &Path,
        mesh_model: &Path,
        options: DetectorOptions,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self {
            proposer: BlazefaceProposer::new(detection_model, options.min_confidence)?,
            mesh: execution_provider::build_session(mesh_model)?,
        })
    }

    fn landmarks(
        &mut self,
        image: &RgbImage,
        crop: Crop,
    ) -> Result<Vec<ContourPoint>, Box<dyn std::error::Error>> {
        let tensor = crop_tensor(image, crop, MESH_INPUT_SIZE);
        let input_value = ort::value::Tensor::from_array(tensor)?;
        let outputs = self.mesh.run(ort::inputs![input_value])?;

        let raw = outputs[0].try_extract_array::<f32>()?;
        let data = raw.as_slice().ok_or("Cannot get landmark slice")?;
        if data.len() < MESH_LANDMARKS * 3 {
            return Err(format!(
                "Face mesh model expected {} values, got {}",
                MESH_LANDMARKS * 3,
                data.len()
            )
            .into());
        }
        Ok(landmarks_to_image(data, crop, MESH_INPUT_SIZE))
    }
}

impl ContourDetector for OnnxContourDetector {
    fn detect(
        &mut self,
        image: &InputImage,
    ) -> Result<Vec<DetectedFace>, Box<dyn std::error::Error>> {
        let upright = image
            .to_upright_rgb()
            .ok_or("Contour detection needs an RGB frame")?;
        let proposals = self.proposer.propose(&upright)?;

        // Proposals are score-sorted; only the best face gets contours.
        let Some(best) = proposals.first() else {
            return Ok(Vec::new());
        };
        let (cx, cy) = best.bounding_box.center();
        let crop = square_around(
            cx,
            cy,
            best.bounding_box.width,
            best.bounding_box.height,
            MESH_CROP_SCALE,
        );
        let landmarks = self.landmarks(&upright, crop)?;
        Ok(vec![DetectedFace {
            bounding_box: best.bounding_box,
            contours: face_mesh_topology::build_contours(&landmarks),
            confidence: best.score,
        }])
    }
}

/// Samples a square crop into a `size × size` NCHW [0,1] tensor.
///
/// Pixels outside the image are zero.
fn crop_tensor(image: &RgbImage, crop: Crop, size: u32) -> ndarray::Array4<f32> {
    let [sx, sy, side] = crop;
    let (iw, ih) = image.dimensions();
    let s = size as usize;
    let step = side / size as f32;
    let mut tensor = ndarray::Array4::<f32>::zeros((1, 3, s, s));

    for v in 0..s {
        let src_y = (sy + (v as f32 + 0.5) * step).floor();
        if src_y < 0.0 || src_y >= ih as f32 {
            continue;
        }
        for u in 0..s {
            let src_x = (sx + (u as f32 + 0.5) * step).floor();
            if src_x < 0.0 || src_x >= iw as f32 {
                continue;
            }
            let pixel = image.get_pixel(src_x as u32, src_y as u32);
            for c in 0..3 {
                tensor[[0, c, v, u]] = pixel[c] as f32 / 255.0;
            }
        }
    }

    tensor
}

/// Maps `(x, y, z)` triples in crop-input pixels back to image pixels.
fn landmarks_to_image(data: &[f32], crop: Crop, size: u32) -> Vec<ContourPoint> {
    let [sx, sy, side] = crop;
    let scale = side / size as f32;
    data.chunks_exact(3)
        .take(MESH_LANDMARKS)
        .map(|xyz| ContourPoint::new(sx + xyz[0] * scale, sy + xyz[1] * scale))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_crop_tensor_pads_outside_image() {
        let img = RgbImage::from_pixel(10, 10, image::Rgb([255, 255, 255]));
        // Left half of the crop lies off-image.
        let tensor = crop_tensor(&img, [-10.0, 0.0, 20.0], 4);
        assert_eq!(tensor.shape(), &[1, 3, 4, 4]);
        assert_eq!(tensor[[0, 0, 0, 0]], 0.0);
        assert_eq!(tensor[[0, 0, 0, 1]], 0.0);
        assert_relative_eq!(tensor[[0, 0, 0, 2]], 1.0);
        assert_eq!(tensor[[0, 0, 3, 3]], 0.0);
    }

    #[test]
    fn test_landmarks_map_back_through_crop() {
        let mut data = vec![0.0f32; MESH_LANDMARKS * 3];
        data[0] = 96.0;
        data[1] = 48.0;
        data[3] = 192.0;
        data[4] = 192.0;

        let points = landmarks_to_image(&data, [100.0, 50.0, 384.0], 192);
        assert_eq!(points.len(), MESH_LANDMARKS);
        assert_relative_eq!(points[0].x, 292.0);
        assert_relative_eq!(points[0].y, 146.0);
        assert_relative_eq!(points[1].x, 484.0);
        assert_relative_eq!(points[1].y, 434.0);
    }

    #[test]
    #[ignore] // Requires downloaded ONNX models
    fn test_detects_nothing_on_blank_frame() {
        use crate::shared::frame::Frame;
        use crate::shared::rotation::Rotation;
        use std::sync::Arc;

        let dir = std::env::var("FACECONTOUR_MODEL_DIR").expect("set FACECONTOUR_MODEL_DIR");
        let dir = Path::new(&dir);
        let mut detector = OnnxContourDetector::new(
            &dir.join(crate::shared::constants::FACE_DETECTION_MODEL_NAME),
            &dir.join(crate::shared::constants::FACE_MESH_MODEL_NAME),
            DetectorOptions::default(),
        )
        .unwrap();
        let frame = Frame::new(vec![0u8; 64 * 48 * 3], 64, 48, 3, 0);
        let faces = detector
            .detect(&InputImage::new(Arc::new(frame), Rotation::Deg90))
            .unwrap();
        assert!(faces.is_empty());
    }
}
