/// BlazeFace face proposals using ONNX Runtime via `ort`.
///
/// Finds face boxes in an upright image. Used as the first stage of the
/// contour detector, which crops around the best proposal for the mesh model.
use std::path::Path;

use image::imageops::{self, FilterType};
use image::RgbImage;

use crate::detection::domain::detected_face::BoundingBox;
use crate::detection::infrastructure::execution_provider;
use crate::detection::infrastructure::math::bbox_iou;

/// BlazeFace model input resolution.
const INPUT_SIZE: u32 = 128;

/// NMS IoU threshold.
const NMS_IOU_THRESH: f64 = 0.3;

/// Number of BlazeFace anchors (short-range model).
const NUM_ANCHORS: usize = 896;

/// A scored face box in image pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FaceProposal {
    pub bounding_box: BoundingBox,
    pub score: f32,
}

pub struct BlazefaceProposer {
    session: ort::session::Session,
    confidence: f32,
    anchors: Vec<[f32; 2]>,
}

impl BlazefaceProposer {
    pub fn new(model_path: &Path, confidence: f32) -> Result<Self, Box<dyn std::error::Error>> {
        let session = execution_provider::build_session(model_path)?;
        Ok(Self {
            session,
            confidence,
            anchors: generate_anchors(),
        })
    }

    /// Proposals sorted by descending score, overlaps suppressed.
    pub fn propose(
        &mut self,
        image: &RgbImage,
    ) -> Result<Vec<FaceProposal>, Box<dyn std::error::Error>> {
        let (iw, ih) = image.dimensions();
        if iw == 0 || ih == 0 {
            return Ok(Vec::new());
        }

        let input_tensor = preprocess(image, INPUT_SIZE);
        let input_value = ort::value::Tensor::from_array(input_tensor)?;
        let outputs = self.session.run(ort::inputs![input_value])?;

        // regressors: [1, 896, 16] (box deltas + keypoints)
        // classificators: [1, 896, 1]
        if outputs.len() < 2 {
            return Err(
                format!("BlazeFace model expected 2 outputs, got {}", outputs.len()).into(),
            );
        }

        let regressors = outputs[0].try_extract_array::<f32>()?;
        let scores = outputs[1].try_extract_array::<f32>()?;
        let reg_data = regressors.as_slice().ok_or("Cannot get regressor slice")?;
        let score_data = scores.as_slice().ok_or("Cannot get score slice")?;

        let mut raw = decode(&self.anchors, reg_data, score_data, self.confidence, iw, ih);
        Ok(nms(&mut raw, NMS_IOU_THRESH))
    }
}

/// Resize to `size × size` and normalize to [0,1] NCHW float32.
fn preprocess(image: &RgbImage, size: u32) -> ndarray::Array4<f32> {
    let resized = imageops::resize(image, size, size, FilterType::Triangle);
    let s = size as usize;
    let mut tensor = ndarray::Array4::<f32>::zeros((1, 3, s, s));

    for (x, y, pixel) in resized.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, c, y as usize, x as usize]] = pixel[c] as f32 / 255.0;
        }
    }

    tensor
}

/// Anchor centres for the short-range model: a 16×16 grid with 2 anchors
/// per cell, then an 8×8 grid with 6.
fn generate_anchors() -> Vec<[f32; 2]> {
    let strides = [(8, 2), (16, 6)]; // (stride, anchors_per_cell)
    let mut anchors = Vec::with_capacity(NUM_ANCHORS);

    for &(stride, num) in &strides {
        let grid_size = INPUT_SIZE as usize / stride;
        for y in 0..grid_size {
            for x in 0..grid_size {
                let cx = (x as f32 + 0.5) / grid_size as f32;
                let cy = (y as f32 + 0.5) / grid_size as f32;
                for _ in 0..num {
                    anchors.push([cx, cy]);
                }
            }
        }
    }

    anchors
}

fn decode(
    anchors: &[[f32; 2]],
    reg_data: &[f32],
    score_data: &[f32],
    confidence: f32,
    iw: u32,
    ih: u32,
) -> Vec<FaceProposal> {
    let (fw, fh) = (iw as f32, ih as f32);
    let mut out = Vec::new();

    for (i, &raw_score) in score_data.iter().enumerate().take(anchors.len()) {
        let score = sigmoid(raw_score);
        if score < confidence {
            continue;
        }
        let offset = i * 16;
        if offset + 4 > reg_data.len() {
            break;
        }

        let anchor = anchors[i];
        let cx = anchor[0] + reg_data[offset] / INPUT_SIZE as f32;
        let cy = anchor[1] + reg_data[offset + 1] / INPUT_SIZE as f32;
        let w = reg_data[offset + 2] / INPUT_SIZE as f32;
        let h = reg_data[offset + 3] / INPUT_SIZE as f32;

        let x1 = ((cx - w / 2.0) * fw).max(0.0);
        let y1 = ((cy - h / 2.0) * fh).max(0.0);
        let x2 = ((cx + w / 2.0) * fw).min(fw);
        let y2 = ((cy + h / 2.0) * fh).min(fh);
        if x2 <= x1 || y2 <= y1 {
            continue;
        }

        out.push(FaceProposal {
            bounding_box: BoundingBox {
                x: x1,
                y: y1,
                width: x2 - x1,
                height: y2 - y1,
            },
            score,
        });
    }
    out
}

fn corners(b: &BoundingBox) -> [f64; 4] {
    [
        b.x as f64,
        b.y as f64,
        (b.x + b.width) as f64,
        (b.y + b.height) as f64,
    ]
}

fn nms(dets: &mut [FaceProposal], iou_thresh: f64) -> Vec<FaceProposal> {
    dets.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut keep = Vec::new();
    let mut suppressed = vec![false; dets.len()];

    for i in 0..dets.len() {
        if suppressed[i] {
            continue;
        }
        keep.push(dets[i]);
        let a = corners(&dets[i].bounding_box);
        for j in (i + 1)..dets.len() {
            if !suppressed[j] && bbox_iou(&a, &corners(&dets[j].bounding_box)) > iou_thresh {
                suppressed[j] = true;
            }
        }
    }
    keep
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proposal(x: f32, y: f32, size: f32, score: f32) -> FaceProposal {
        FaceProposal {
            bounding_box: BoundingBox {
                x,
                y,
                width: size,
                height: size,
            },
            score,
        }
    }

    #[test]
    fn test_preprocess_shape_and_range() {
        let img = RgbImage::from_pixel(200, 100, image::Rgb([255, 255, 255]));
        let tensor = preprocess(&img, INPUT_SIZE);
        assert_eq!(tensor.shape(), &[1, 3, 128, 128]);
        assert!((tensor[[0, 0, 0, 0]] - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_generate_anchors_count() {
        // 16×16 grid × 2 anchors + 8×8 grid × 6 anchors = 512 + 384 = 896
        let anchors = generate_anchors();
        assert_eq!(anchors.len(), NUM_ANCHORS);
        for a in &anchors {
            assert!(a[0] > 0.0 && a[0] < 1.0);
            assert!(a[1] > 0.0 && a[1] < 1.0);
        }
    }

    #[test]
    fn test_sigmoid() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-6);
        assert!((sigmoid(10.0) - 1.0).abs() < 0.001);
        assert!(sigmoid(-10.0) < 0.001);
    }

    #[test]
    fn test_decode_scales_to_image_and_filters_scores() {
        let anchors = vec![[0.5, 0.5], [0.25, 0.25]];
        // Anchor 0: centred box, 64 px of 128 wide. Anchor 1: low score.
        let mut reg = vec![0.0f32; 32];
        reg[2] = 64.0;
        reg[3] = 64.0;
        let scores = vec![5.0, -5.0];

        let out = decode(&anchors, &reg, &scores, 0.5, 640, 480);
        assert_eq!(out.len(), 1);
        let b = out[0].bounding_box;
        assert!((b.x - 160.0).abs() < 1e-3);
        assert!((b.y - 120.0).abs() < 1e-3);
        assert!((b.width - 320.0).abs() < 1e-3);
        assert!((b.height - 240.0).abs() < 1e-3);
    }

    #[test]
    fn test_nms_suppresses_overlap_and_sorts() {
        let mut dets = vec![
            proposal(5.0, 5.0, 100.0, 0.7),
            proposal(0.0, 0.0, 100.0, 0.9),
            proposal(300.0, 300.0, 50.0, 0.8),
        ];
        let kept = nms(&mut dets, NMS_IOU_THRESH);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].score, 0.9);
        assert_eq!(kept[1].score, 0.8);
    }
}
