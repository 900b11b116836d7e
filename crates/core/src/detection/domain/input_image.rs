use std::sync::Arc;

use image::{imageops, RgbImage};

use crate::shared::frame::Frame;
use crate::shared::rotation::Rotation;

/// Pixels handed to the detection engine, plus the rotation that makes
/// them upright.
///
/// Shares the frame buffer with the capture side instead of copying it.
/// Detection results are expressed in upright coordinates.
#[derive(Clone, Debug)]
pub struct InputImage {
    frame: Arc<Frame>,
    rotation: Rotation,
}

impl InputImage {
    pub fn new(frame: Arc<Frame>, rotation: Rotation) -> Self {
        Self { frame, rotation }
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn upright_width(&self) -> u32 {
        if self.rotation.swaps_axes() {
            self.frame.height()
        } else {
            self.frame.width()
        }
    }

    pub fn upright_height(&self) -> u32 {
        if self.rotation.swaps_axes() {
            self.frame.width()
        } else {
            self.frame.height()
        }
    }

    /// Copies the pixels into an upright RGB image. `None` for non-RGB input.
    pub fn to_upright_rgb(&self) -> Option<RgbImage> {
        let raw = self.frame.to_rgb_image()?;
        Some(match self.rotation {
            Rotation::Deg0 => raw,
            Rotation::Deg90 => imageops::rotate90(&raw),
            Rotation::Deg180 => imageops::rotate180(&raw),
            Rotation::Deg270 => imageops::rotate270(&raw),
        })
    }
}
