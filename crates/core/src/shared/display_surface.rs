/// Size of the drawing area in its own pixel space, known only at render time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DisplaySurface {
    pub width: f32,
    pub height: f32,
}

impl DisplaySurface {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn is_landscape(&self) -> bool {
        self.width > self.height
    }

    pub fn has_area(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}
