use crate::detection::domain::detected_face::ContourPoint;
use crate::shared::display_surface::DisplaySurface;

/// Stroke used for contour polylines.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StrokeStyle {
    pub width: f32,
    /// RGBA.
    pub color: [u8; 4],
}

/// A drawing target for the overlay, such as a GUI canvas frame.
pub trait RenderSurface {
    fn surface(&self) -> DisplaySurface;

    /// Draws an open polyline through `points` in order.
    fn draw_polyline(&mut self, points: &[ContourPoint], stroke: StrokeStyle);
}
