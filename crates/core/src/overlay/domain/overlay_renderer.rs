use crate::detection::domain::detected_face::ContourPoint;
use crate::overlay::domain::coordinate_mapper::CoordinateMapper;
use crate::overlay::domain::render_surface::{RenderSurface, StrokeStyle};
use crate::overlay::domain::snapshot::DetectionSnapshot;
use crate::shared::config::AppConfig;
use crate::shared::constants::{OVERLAY_STROKE_COLOR, OVERLAY_STROKE_WIDTH};
use crate::shared::display_surface::DisplaySurface;

/// A contour in display coordinates, drawn as an open polyline.
#[derive(Clone, Debug, PartialEq)]
pub struct Polyline {
    pub points: Vec<ContourPoint>,
}

/// Turns a detection snapshot into on-screen contour polylines.
///
/// Only each face's primary contour is drawn. Geometry is a pure function
/// of the snapshot and the surface size, so redrawing the same snapshot
/// yields the same strokes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OverlayRenderer {
    stroke: StrokeStyle,
}

impl OverlayRenderer {
    pub fn new(stroke: StrokeStyle) -> Self {
        Self { stroke }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(StrokeStyle {
            width: config.stroke_width,
            color: config.stroke_color,
        })
    }

    pub fn stroke(&self) -> StrokeStyle {
        self.stroke
    }

    pub fn geometry(&self, snapshot: &DetectionSnapshot, surface: DisplaySurface) -> Vec<Polyline> {
        if snapshot.faces.is_empty() {
            return Vec::new();
        }
        let Some(mapper) = CoordinateMapper::new(snapshot.resolution, surface) else {
            return Vec::new();
        };

        snapshot
            .faces
            .iter()
            .filter_map(|face| face.primary_contour())
            .filter(|contour| !contour.points.is_empty())
            .map(|contour| Polyline {
                points: contour.points.iter().map(|&p| mapper.map_point(p)).collect(),
            })
            .collect()
    }

    /// Draws the snapshot's polylines and returns how many were drawn.
    pub fn render(&self, snapshot: &DetectionSnapshot, target: &mut dyn RenderSurface) -> usize {
        let polylines = self.geometry(snapshot, target.surface());
        for polyline in &polylines {
            target.draw_polyline(&polyline.points, self.stroke);
        }
        polylines.len()
    }
}

impl Default for OverlayRenderer {
    fn default() -> Self {
        Self::new(StrokeStyle {
            width: OVERLAY_STROKE_WIDTH,
            color: OVERLAY_STROKE_COLOR,
        })
    }
}
