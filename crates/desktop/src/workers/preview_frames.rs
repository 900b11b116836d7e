use std::sync::{Arc, Mutex};

use image::{imageops, DynamicImage, RgbaImage};

use facecontour_core::capture::domain::preview_sink::PreviewSink;
use facecontour_core::shared::frame::Frame;
use facecontour_core::shared::rotation::Rotation;

/// A preview-ready frame: upright RGBA, mirrored for front cameras.
pub struct PreviewImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
    pub index: usize,
}

/// Holds the newest preview frame until the UI picks it up. Frames the UI
/// never saw are overwritten.
#[derive(Clone, Default)]
pub struct PreviewSlot {
    latest: Arc<Mutex<Option<PreviewImage>>>,
}

impl PreviewSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink for the capture thread that fills this slot.
    pub fn sink(&self, mirrored: bool) -> Box<dyn PreviewSink> {
        Box::new(SlotPreviewSink {
            slot: self.clone(),
            mirrored,
        })
    }

    pub fn take(&self) -> Option<PreviewImage> {
        self.latest.lock().unwrap_or_else(|e| e.into_inner()).take()
    }

    fn put(&self, image: PreviewImage) {
        *self.latest.lock().unwrap_or_else(|e| e.into_inner()) = Some(image);
    }
}

struct SlotPreviewSink {
    slot: PreviewSlot,
    mirrored: bool,
}

impl PreviewSink for SlotPreviewSink {
    fn present(&mut self, frame: &Frame, rotation: Rotation) {
        let Some(image) = upright_preview(frame, rotation, self.mirrored) else {
            log::debug!("No preview for frame {} ({} channels)", frame.index(), frame.channels());
            return;
        };
        let (width, height) = image.dimensions();
        self.slot.put(PreviewImage {
            width,
            height,
            rgba: image.into_raw(),
            index: frame.index(),
        });
    }
}

/// Rotates a frame upright and, for a mirrored preview, flips it
/// horizontally.
pub fn upright_preview(frame: &Frame, rotation: Rotation, mirrored: bool) -> Option<RgbaImage> {
    let rgb = frame.to_rgb_image()?;
    let mut upright = match rotation {
        Rotation::Deg0 => rgb,
        Rotation::Deg90 => imageops::rotate90(&rgb),
        Rotation::Deg180 => imageops::rotate180(&rgb),
        Rotation::Deg270 => imageops::rotate270(&rgb),
    };
    if mirrored {
        imageops::flip_horizontal_in_place(&mut upright);
    }
    Some(DynamicImage::ImageRgb8(upright).into_rgba8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    /// 3x2 frame with a red pixel in the top-left corner.
    fn marked_frame(index: usize) -> Frame {
        let mut img = RgbImage::new(3, 2);
        img.put_pixel(0, 0, image::Rgb([255, 0, 0]));
        Frame::from_rgb_image(img, index)
    }

    #[test]
    fn test_mirror_moves_left_edge_to_right() {
        let out = upright_preview(&marked_frame(0), Rotation::Deg0, true).unwrap();
        assert_eq!(out.dimensions(), (3, 2));
        assert_eq!(out.get_pixel(2, 0).0, [255, 0, 0, 255]);
        assert_eq!(out.get_pixel(0, 0).0, [0, 0, 0, 255]);
    }

    #[test]
    fn test_quarter_turn_swaps_dimensions_before_mirroring() {
        let out = upright_preview(&marked_frame(0), Rotation::Deg90, true).unwrap();
        assert_eq!(out.dimensions(), (2, 3));
        // rotate90 puts the top-left corner at top-right; the flip brings it back left.
        assert_eq!(out.get_pixel(0, 0).0, [255, 0, 0, 255]);
    }

    #[test]
    fn test_unmirrored_preview_keeps_orientation() {
        let out = upright_preview(&marked_frame(0), Rotation::Deg0, false).unwrap();
        assert_eq!(out.get_pixel(0, 0).0, [255, 0, 0, 255]);
    }

    #[test]
    fn test_non_rgb_frame_has_no_preview() {
        let frame = Frame::new(vec![0u8; 4], 2, 2, 1, 0);
        assert!(upright_preview(&frame, Rotation::Deg0, true).is_none());
    }

    #[test]
    fn test_slot_keeps_only_newest_frame() {
        let slot = PreviewSlot::new();
        let mut sink = slot.sink(true);
        sink.present(&marked_frame(1), Rotation::Deg0);
        sink.present(&marked_frame(2), Rotation::Deg0);

        let image = slot.take().unwrap();
        assert_eq!(image.index, 2);
        assert_eq!(image.rgba.len(), 3 * 2 * 4);
        assert!(slot.take().is_none());
    }
}
