use std::cell::Cell;
use std::sync::Arc;

use iced::mouse;
use iced::widget::canvas::{self, Frame, Geometry, Path, Stroke};
use iced::{Color, Point, Rectangle, Renderer, Size, Theme, Vector};

use facecontour_core::detection::domain::detected_face::ContourPoint;
use facecontour_core::overlay::domain::overlay_renderer::OverlayRenderer;
use facecontour_core::overlay::domain::render_surface::{RenderSurface, StrokeStyle};
use facecontour_core::overlay::domain::snapshot::DetectionSnapshot;
use facecontour_core::shared::display_surface::DisplaySurface;

/// Canvas program that strokes the latest snapshot's contours over the
/// preview. It is rebuilt every view, so it always draws whole snapshots.
///
/// Drawing is confined to the area a `ContentFit::Contain` image of
/// `frame_width` x `frame_height` occupies, so the overlay surface has the
/// preview's aspect ratio whatever the window shape.
pub struct ContourOverlay {
    snapshot: Arc<DetectionSnapshot>,
    renderer: OverlayRenderer,
    frame_width: u32,
    frame_height: u32,
}

impl ContourOverlay {
    pub fn new(
        snapshot: Arc<DetectionSnapshot>,
        renderer: OverlayRenderer,
        frame_width: u32,
        frame_height: u32,
    ) -> Self {
        Self {
            snapshot,
            renderer,
            frame_width,
            frame_height,
        }
    }
}

/// Centered rectangle a `width` x `height` image occupies when scaled to
/// fit inside `available` without cropping.
pub fn contain_rect(available: Size, width: u32, height: u32) -> Rectangle {
    if width == 0 || height == 0 || available.width <= 0.0 || available.height <= 0.0 {
        return Rectangle::new(Point::ORIGIN, Size::ZERO);
    }
    let scale = (available.width / width as f32).min(available.height / height as f32);
    let size = Size::new(width as f32 * scale, height as f32 * scale);
    let origin = Point::new(
        (available.width - size.width) / 2.0,
        (available.height - size.height) / 2.0,
    );
    Rectangle::new(origin, size)
}

/// Remembers the last laid-out size so size changes are logged once.
#[derive(Default)]
pub struct OverlayState {
    last_size: Cell<Option<Size>>,
}

impl<Message> canvas::Program<Message> for ContourOverlay {
    type State = OverlayState;

    fn draw(
        &self,
        state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let area = contain_rect(bounds.size(), self.frame_width, self.frame_height);
        if state.last_size.get() != Some(area.size()) {
            log::debug!("Preview surface is {}x{}", area.width, area.height);
            state.last_size.set(Some(area.size()));
        }

        let mut frame = Frame::new(renderer, bounds.size());
        frame.translate(Vector::new(area.x, area.y));
        let mut surface = CanvasSurface {
            frame: &mut frame,
            size: area.size(),
        };
        self.renderer.render(&self.snapshot, &mut surface);
        vec![frame.into_geometry()]
    }
}

struct CanvasSurface<'a> {
    frame: &'a mut Frame,
    size: Size,
}

impl RenderSurface for CanvasSurface<'_> {
    fn surface(&self) -> DisplaySurface {
        DisplaySurface::new(self.size.width, self.size.height)
    }

    fn draw_polyline(&mut self, points: &[ContourPoint], stroke: StrokeStyle) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        let path = Path::new(|builder| {
            builder.move_to(Point::new(first.x, first.y));
            for point in rest {
                builder.line_to(Point::new(point.x, point.y));
            }
        });
        self.frame.stroke(
            &path,
            Stroke {
                style: canvas::Style::Solid(stroke_color(stroke.color)),
                width: stroke.width,
                line_cap: canvas::LineCap::Round,
                line_join: canvas::LineJoin::Round,
                ..Stroke::default()
            },
        );
    }
}

fn stroke_color([r, g, b, a]: [u8; 4]) -> Color {
    Color::from_rgba8(r, g, b, a as f32 / 255.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use facecontour_core::detection::domain::detected_face::{
        BoundingBox, ContourKind, DetectedFace, FaceContour,
    };
    use facecontour_core::shared::resolution::Resolution;

    #[test]
    fn test_contain_rect_letterboxes_landscape_frame_in_portrait_window() {
        let area = contain_rect(Size::new(540.0, 740.0), 1280, 720);
        assert_eq!(area.width, 540.0);
        assert!((area.height - 303.75).abs() < 1e-3);
        assert_eq!(area.x, 0.0);
        assert!((area.y - (740.0 - 303.75) / 2.0).abs() < 1e-3);
    }

    #[test]
    fn test_contain_rect_pillarboxes_portrait_frame() {
        let area = contain_rect(Size::new(540.0, 740.0), 720, 1280);
        assert_eq!(area.height, 740.0);
        assert!((area.width - 416.25).abs() < 1e-3);
        assert!((area.x - (540.0 - 416.25) / 2.0).abs() < 1e-3);
    }

    #[test]
    fn test_contain_rect_is_empty_without_frame_or_space() {
        assert_eq!(contain_rect(Size::new(540.0, 740.0), 0, 720).size(), Size::ZERO);
        assert_eq!(contain_rect(Size::ZERO, 1280, 720).size(), Size::ZERO);
    }

    #[test]
    fn test_landscape_frame_overlay_stays_on_preview() {
        let snapshot = DetectionSnapshot::new(
            vec![DetectedFace {
                bounding_box: BoundingBox::default(),
                contours: vec![FaceContour {
                    kind: ContourKind::Face,
                    points: vec![ContourPoint::new(1200.0, 360.0), ContourPoint::new(640.0, 700.0)],
                }],
                confidence: 1.0,
            }],
            Resolution::new(1280, 720),
            0,
        );
        let area = contain_rect(Size::new(540.0, 740.0), 1280, 720);
        let surface = DisplaySurface::new(area.width, area.height);

        let polylines = OverlayRenderer::default().geometry(&snapshot, surface);
        let points = &polylines[0].points;
        for p in points {
            assert!((0.0..=area.width).contains(&p.x), "x {} off preview", p.x);
            assert!((0.0..=area.height).contains(&p.y), "y {} off preview", p.y);
        }
        // Mirrored: x = 1200 of 1280 lands near the left edge.
        assert!((points[0].x - 33.75).abs() < 1e-3);
        assert!((points[0].y - 151.875).abs() < 1e-3);
    }

    #[test]
    fn test_stroke_color_scales_alpha() {
        let color = stroke_color([0, 255, 0, 255]);
        assert_eq!(color, Color::from_rgb8(0, 255, 0));

        let faded = stroke_color([255, 0, 0, 0]);
        assert_eq!(faded.a, 0.0);
        assert_eq!(faded.r, 1.0);
    }
}
