use crate::detection::domain::detected_face::ContourPoint;
use crate::shared::display_surface::DisplaySurface;
use crate::shared::resolution::Resolution;

/// Assumed detector-space extent of the upright image.
///
/// The reported resolution is an unordered pair, so the orientation is
/// inferred from the display: a landscape surface gets the larger
/// component as width, anything else gets it as height.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImageExtent {
    pub width: f32,
    pub height: f32,
}

impl ImageExtent {
    pub fn infer(resolution: Resolution, surface: DisplaySurface) -> Self {
        let (larger, smaller) = (resolution.larger() as f32, resolution.smaller() as f32);
        if surface.is_landscape() {
            Self {
                width: larger,
                height: smaller,
            }
        } else {
            Self {
                width: smaller,
                height: larger,
            }
        }
    }
}

/// Scales detector-space points onto a display surface, mirrored
/// horizontally to match the front-camera preview.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoordinateMapper {
    surface: DisplaySurface,
    extent: ImageExtent,
}

impl CoordinateMapper {
    /// `None` when either the surface or the resolution has no area.
    pub fn new(resolution: Resolution, surface: DisplaySurface) -> Option<Self> {
        if !surface.has_area() || resolution.is_empty() {
            return None;
        }
        Some(Self {
            surface,
            extent: ImageExtent::infer(resolution, surface),
        })
    }

    pub fn extent(&self) -> ImageExtent {
        self.extent
    }

    pub fn map_point(&self, point: ContourPoint) -> ContourPoint {
        let w = self.surface.width;
        let h = self.surface.height;
        ContourPoint {
            x: w - point.x * w / self.extent.width,
            y: point.y * h / self.extent.height,
        }
    }
}
