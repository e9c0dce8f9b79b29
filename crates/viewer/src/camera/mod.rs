// Camera system - viewport state and screen <-> world transforms
//
// Mapping (offset is in world units, not pixels):
//   screen = center + (world + offset) * scale
//   world  = (screen - center) / scale - offset
// where center = (width / 2, height / 2).
use glam::DVec2;

/// Size of the drawing surface in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn center(&self) -> DVec2 {
        DVec2::new(f64::from(self.width) / 2.0, f64::from(self.height) / 2.0)
    }
}

/// Zoom scale and pan offset. Always replaced as a whole so a reader never
/// sees a new scale paired with an old offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportState {
    scale: f64,
    offset: DVec2,
}

impl ViewportState {
    pub const INITIAL: Self = Self {
        scale: 1.0,
        offset: DVec2::ZERO,
    };

    pub fn new(scale: f64, offset: DVec2) -> Self {
        Self { scale, offset }
    }

    #[inline]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    #[inline]
    pub fn offset(&self) -> DVec2 {
        self.offset
    }

    /// World point shown at the centre of the canvas.
    #[inline]
    pub fn center(&self) -> DVec2 {
        -self.offset
    }

    #[inline]
    pub(crate) fn with_offset(self, offset: DVec2) -> Self {
        Self { offset, ..self }
    }
}

impl Default for ViewportState {
    fn default() -> Self {
        Self::INITIAL
    }
}

/// Pure transforms for one viewport and canvas size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    scale: f64,
    offset: DVec2,
    center: DVec2,
}

impl Transform {
    pub fn new(viewport: &ViewportState, canvas: CanvasSize) -> Self {
        Self {
            scale: viewport.scale,
            offset: viewport.offset,
            center: canvas.center(),
        }
    }

    #[inline]
    pub fn world_to_screen(&self, world: DVec2) -> DVec2 {
        self.center + (world + self.offset) * self.scale
    }

    #[inline]
    pub fn screen_to_world(&self, screen: DVec2) -> DVec2 {
        (screen - self.center) / self.scale - self.offset
    }

    #[inline]
    pub fn radius_to_screen(&self, radius: f64) -> f64 {
        radius * self.scale
    }

    #[inline]
    pub fn canvas_center(&self) -> DVec2 {
        self.center
    }
}
