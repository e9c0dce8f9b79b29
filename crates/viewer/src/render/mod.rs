// Draw command generation - bodies to screen-space circles
use glam::DVec2;
use protocol::PositionFrame;

use crate::camera::{CanvasSize, Transform, ViewportState};

mod overlay;

pub use overlay::overlay_lines;

/// One filled circle in screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCommand {
    pub center: DVec2,
    pub radius: f64,
}

/// The primitive that actually puts pixels somewhere.
pub trait Surface {
    /// Wipe the whole surface before a new pass.
    fn clear(&mut self, canvas: CanvasSize);

    fn fill_circle(&mut self, command: &DrawCommand);
}

/// Collects commands instead of drawing them (headless mode, tests).
impl Surface for Vec<DrawCommand> {
    fn clear(&mut self, _canvas: CanvasSize) {
        Vec::clear(self);
    }

    fn fill_circle(&mut self, command: &DrawCommand) {
        self.push(*command);
    }
}

pub struct RenderCompositor {
    default_radius: f64,
}

impl RenderCompositor {
    pub fn new(default_radius: f64) -> Self {
        Self { default_radius }
    }

    /// Lazily map every body to a draw command, in body index order so later
    /// bodies are drawn over earlier ones.
    pub fn render<'a>(
        &self,
        frame: &'a PositionFrame,
        viewport: &ViewportState,
        canvas: CanvasSize,
    ) -> impl Iterator<Item = DrawCommand> + 'a {
        let transform = Transform::new(viewport, canvas);
        let default_radius = self.default_radius;
        frame.iter().map(move |body| DrawCommand {
            center: transform.world_to_screen(body.position()),
            radius: transform.radius_to_screen(body.radius.unwrap_or(default_radius)),
        })
    }

    /// Clear `surface` and draw the whole frame on it.
    pub fn paint<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        frame: &PositionFrame,
        viewport: &ViewportState,
        canvas: CanvasSize,
    ) {
        surface.clear(canvas);
        for command in self.render(frame, viewport, canvas) {
            surface.fill_circle(&command);
        }
    }
}
