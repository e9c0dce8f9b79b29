// Pointer, wheel and keyboard handling - the only writer of ViewportState
use glam::DVec2;
use protocol::ButtonPress;

use crate::camera::{CanvasSize, Transform, ViewportState};
use crate::config::ViewerConfig;

/// Wheel step direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

impl ZoomDirection {
    /// Positive `delta_y` (wheel pulled towards the user) zooms out; anything
    /// else zooms in.
    pub fn from_delta_y(delta_y: f64) -> Self {
        if delta_y > 0.0 { Self::Out } else { Self::In }
    }
}

/// Pan gesture in progress. Anchors survive deactivation; only `active`
/// gates pointer moves.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DragSession {
    pub anchor_screen: DVec2,
    pub anchor_offset: DVec2,
    pub active: bool,
}

pub struct InteractionController {
    viewport: ViewportState,
    drag: DragSession,
    config: ViewerConfig,
}

impl InteractionController {
    pub fn new(config: ViewerConfig) -> Self {
        Self {
            viewport: ViewportState::INITIAL,
            drag: DragSession::default(),
            config,
        }
    }

    #[inline]
    pub fn viewport(&self) -> &ViewportState {
        &self.viewport
    }

    #[inline]
    pub fn drag(&self) -> &DragSession {
        &self.drag
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// Zoom one step keeping the world point under `cursor` fixed on screen.
    /// Returns whether the viewport changed.
    pub fn on_wheel(&mut self, cursor: DVec2, direction: ZoomDirection, canvas: CanvasSize) -> bool {
        let transform = Transform::new(&self.viewport, canvas);
        let world_before = transform.screen_to_world(cursor);

        let factor = match direction {
            ZoomDirection::In => self.config.zoom_in_factor,
            ZoomDirection::Out => self.config.zoom_out_factor,
        };
        let new_scale = self.config.clamp_scale(self.viewport.scale() * factor);

        // cursor = center + (world_before + offset) * new_scale, solved for offset
        let new_offset = (cursor - transform.canvas_center()) / new_scale - world_before;

        self.commit(ViewportState::new(new_scale, new_offset))
    }

    /// Start a pan. Presses on anything but the canvas are ignored.
    pub fn on_pointer_down(&mut self, screen: DVec2, target_is_canvas: bool) -> bool {
        if !target_is_canvas {
            return false;
        }
        self.drag = DragSession {
            anchor_screen: screen,
            anchor_offset: self.viewport.offset(),
            active: true,
        };
        true
    }

    /// Pan relative to the drag anchor. The pixel delta is divided by the
    /// scale so dragging moves at the same visual speed at every zoom level.
    pub fn on_pointer_move(&mut self, screen: DVec2) -> bool {
        if !self.drag.active {
            return false;
        }
        let delta = (screen - self.drag.anchor_screen) / self.viewport.scale();
        let next = self.viewport.with_offset(self.drag.anchor_offset + delta);
        self.commit(next)
    }

    pub fn on_pointer_up(&mut self) {
        self.drag.active = false;
    }

    pub fn on_pointer_leave(&mut self) {
        self.drag.active = false;
    }

    /// Translate a raw key event into an upstream `button_press`.
    /// Every event of a mapped key yields one press, repeats included.
    pub fn on_key(&self, key: &str, pressed: bool) -> Option<ButtonPress> {
        self.config.keys.lookup(key).map(|direction| ButtonPress {
            is_pressed: pressed,
            direction,
        })
    }

    fn commit(&mut self, next: ViewportState) -> bool {
        if next == self.viewport {
            return false;
        }
        self.viewport = next;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol::Direction;

    const CANVAS: CanvasSize = CanvasSize::new(800, 600);

    fn close(a: DVec2, b: DVec2, eps: f64) -> bool {
        (a - b).abs().max_element() <= eps
    }

    fn world_under(controller: &InteractionController, cursor: DVec2) -> DVec2 {
        Transform::new(controller.viewport(), CANVAS).screen_to_world(cursor)
    }

    #[test]
    fn test_zoom_at_center_keeps_offset() {
        let mut c = InteractionController::new(ViewerConfig::default());
        assert!(c.on_wheel(DVec2::new(400.0, 300.0), ZoomDirection::In, CANVAS));
        assert!((c.viewport().scale() - 1.1).abs() < 1e-12);
        assert!(close(c.viewport().offset(), DVec2::ZERO, 1e-12));
    }

    #[test]
    fn test_zoom_keeps_cursor_anchor() {
        let mut c = InteractionController::new(ViewerConfig::default());
        c.on_pointer_down(DVec2::new(10.0, 10.0), true);
        c.on_pointer_move(DVec2::new(73.0, -41.0));
        c.on_pointer_up();

        let cursors = [
            DVec2::new(0.0, 0.0),
            DVec2::new(123.4, 567.8),
            DVec2::new(799.0, 1.0),
        ];
        let steps = [
            ZoomDirection::In,
            ZoomDirection::In,
            ZoomDirection::Out,
            ZoomDirection::In,
            ZoomDirection::Out,
            ZoomDirection::Out,
        ];
        for cursor in cursors {
            for step in steps {
                let before = world_under(&c, cursor);
                c.on_wheel(cursor, step, CANVAS);
                let after = world_under(&c, cursor);
                assert!(close(before, after, 1e-6), "{before:?} vs {after:?}");
            }
        }
    }

    #[test]
    fn test_scale_clamps_both_ways() {
        let config = ViewerConfig {
            min_scale: 0.25,
            max_scale: 5.0,
            ..ViewerConfig::default()
        };
        let mut c = InteractionController::new(config);
        let cursor = DVec2::new(200.0, 100.0);

        for _ in 0..200 {
            c.on_wheel(cursor, ZoomDirection::Out, CANVAS);
            assert!(c.viewport().scale() >= 0.25);
        }
        assert_eq!(c.viewport().scale(), 0.25);
        // Clamped step changes nothing.
        assert!(!c.on_wheel(cursor, ZoomDirection::Out, CANVAS));

        for _ in 0..200 {
            c.on_wheel(cursor, ZoomDirection::In, CANVAS);
            assert!(c.viewport().scale() <= 5.0);
        }
        assert_eq!(c.viewport().scale(), 5.0);
    }

    #[test]
    fn test_default_lower_bound_is_positive() {
        let mut c = InteractionController::new(ViewerConfig::default());
        for _ in 0..500 {
            c.on_wheel(DVec2::new(1.0, 2.0), ZoomDirection::Out, CANVAS);
        }
        assert_eq!(c.viewport().scale(), 1e-6);
        let p = world_under(&c, DVec2::new(1.0, 2.0));
        assert!(p.is_finite());
    }

    #[test]
    fn test_drag_divides_by_scale() {
        let mut c = InteractionController::new(ViewerConfig::default());
        c.config.zoom_in_factor = 2.0;
        c.on_wheel(CANVAS.center(), ZoomDirection::In, CANVAS);
        assert_eq!(c.viewport().scale(), 2.0);
        let start = c.viewport().offset();

        assert!(c.on_pointer_down(DVec2::new(100.0, 100.0), true));
        assert!(c.on_pointer_move(DVec2::new(150.0, 130.0)));
        assert!(close(c.viewport().offset(), start + DVec2::new(25.0, 15.0), 1e-12));
        assert_eq!(c.viewport().scale(), 2.0);
    }

    #[test]
    fn test_drag_path_independent() {
        let mut direct = InteractionController::new(ViewerConfig::default());
        direct.on_pointer_down(DVec2::new(5.0, 5.0), true);
        direct.on_pointer_move(DVec2::new(300.0, -20.0));
        direct.on_pointer_up();

        let mut wandering = InteractionController::new(ViewerConfig::default());
        wandering.on_pointer_down(DVec2::new(5.0, 5.0), true);
        for p in [(50.0, 400.0), (-100.0, 0.0), (799.0, 599.0), (300.0, -20.0)] {
            wandering.on_pointer_move(DVec2::new(p.0, p.1));
        }
        wandering.on_pointer_up();

        assert!(close(direct.viewport().offset(), wandering.viewport().offset(), 1e-12));
    }

    #[test]
    fn test_pointer_down_off_canvas_is_ignored() {
        let mut c = InteractionController::new(ViewerConfig::default());
        assert!(!c.on_pointer_down(DVec2::new(1.0, 1.0), false));
        assert!(!c.drag().active);
        assert!(!c.on_pointer_move(DVec2::new(50.0, 50.0)));
        assert_eq!(*c.viewport(), ViewportState::INITIAL);
    }

    #[test]
    fn test_release_stops_pan_but_keeps_anchor() {
        let mut c = InteractionController::new(ViewerConfig::default());
        c.on_pointer_down(DVec2::new(1.0, 2.0), true);
        c.on_pointer_leave();
        assert!(!c.drag().active);
        assert_eq!(c.drag().anchor_screen, DVec2::new(1.0, 2.0));
        assert!(!c.on_pointer_move(DVec2::new(9.0, 9.0)));
    }

    #[test]
    fn test_wheel_direction_from_delta() {
        assert_eq!(ZoomDirection::from_delta_y(120.0), ZoomDirection::Out);
        assert_eq!(ZoomDirection::from_delta_y(-3.0), ZoomDirection::In);
        assert_eq!(ZoomDirection::from_delta_y(0.0), ZoomDirection::In);
    }

    #[test]
    fn test_keys_map_to_presses() {
        let c = InteractionController::new(ViewerConfig::default());
        assert_eq!(
            c.on_key("W", true),
            Some(ButtonPress {
                is_pressed: true,
                direction: Direction::Down
            })
        );
        assert_eq!(
            c.on_key("d", false),
            Some(ButtonPress {
                is_pressed: false,
                direction: Direction::Right
            })
        );
        assert_eq!(c.on_key("x", true), None);
    }
}
