// View controller - owns all view state and applies events in arrival order
use glam::DVec2;
use protocol::{ButtonPress, PositionFrame, StreamEvent};
use tracing::{debug, info};

use crate::camera::{CanvasSize, ViewportState};
use crate::config::{ConfigError, ViewerConfig};
use crate::input::{InteractionController, ZoomDirection};
use crate::render::{overlay_lines, DrawCommand, RenderCompositor, Surface};
use crate::store::PositionStore;

/// Everything that can change the view. Each event is handled to completion
/// before the next one.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    /// Stream session established.
    Connected { session_id: String },
    /// Stream session lost; the last frame stays on screen.
    Disconnected,
    /// Raw `update_step` payload.
    FrameReceived { payload: String },
    PointerDown { position: DVec2, target_is_canvas: bool },
    PointerMove { position: DVec2 },
    PointerUp,
    PointerLeave,
    /// Wheel at `position`; only the sign of `delta_y` matters.
    Wheel { position: DVec2, delta_y: f64 },
    /// Raw key-down (`pressed`) or key-up.
    Key { key: String, pressed: bool },
    Resized(CanvasSize),
}

impl From<StreamEvent> for ViewEvent {
    fn from(event: StreamEvent) -> Self {
        match event {
            StreamEvent::Connected { session_id } => ViewEvent::Connected { session_id },
            StreamEvent::Disconnected => ViewEvent::Disconnected,
            StreamEvent::UpdateStep(payload) => ViewEvent::FrameReceived { payload },
        }
    }
}

pub struct ViewController {
    input: InteractionController,
    store: PositionStore,
    compositor: RenderCompositor,
    canvas: CanvasSize,
    session_id: Option<String>,
    outbound: Vec<ButtonPress>,
    needs_redraw: bool,
}

impl ViewController {
    pub fn new(config: ViewerConfig, canvas: CanvasSize) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            compositor: RenderCompositor::new(config.default_radius),
            input: InteractionController::new(config),
            store: PositionStore::new(),
            canvas,
            session_id: None,
            outbound: Vec::new(),
            needs_redraw: true,
        })
    }

    pub fn dispatch(&mut self, event: ViewEvent) {
        let changed = match event {
            ViewEvent::Connected { session_id } => {
                info!("Stream session {}", session_id);
                self.session_id = Some(session_id);
                false
            }
            ViewEvent::Disconnected => {
                info!("Stream session closed");
                self.session_id = None;
                false
            }
            // Failures are logged and counted by the store.
            ViewEvent::FrameReceived { payload } => self.store.ingest(&payload).unwrap_or(false),
            ViewEvent::PointerDown {
                position,
                target_is_canvas,
            } => {
                self.input.on_pointer_down(position, target_is_canvas);
                false
            }
            ViewEvent::PointerMove { position } => self.input.on_pointer_move(position),
            ViewEvent::PointerUp => {
                self.input.on_pointer_up();
                false
            }
            ViewEvent::PointerLeave => {
                self.input.on_pointer_leave();
                false
            }
            ViewEvent::Wheel { position, delta_y } => {
                let direction = ZoomDirection::from_delta_y(delta_y);
                self.input.on_wheel(position, direction, self.canvas)
            }
            ViewEvent::Key { key, pressed } => {
                if let Some(press) = self.input.on_key(&key, pressed) {
                    debug!(?press, "Queued button press");
                    self.outbound.push(press);
                }
                false
            }
            ViewEvent::Resized(canvas) => {
                if canvas == self.canvas {
                    false
                } else {
                    self.canvas = canvas;
                    true
                }
            }
        };
        self.needs_redraw |= changed;
    }

    /// Returns true once after anything visible changed.
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.needs_redraw)
    }

    /// Button presses waiting to be sent upstream, oldest first.
    pub fn drain_outbound(&mut self) -> Vec<ButtonPress> {
        std::mem::take(&mut self.outbound)
    }

    pub fn draw_commands(&self) -> impl Iterator<Item = DrawCommand> + '_ {
        self.compositor
            .render(self.store.frame(), self.input.viewport(), self.canvas)
    }

    pub fn paint<S: Surface + ?Sized>(&self, surface: &mut S) {
        self.compositor
            .paint(surface, self.store.frame(), self.input.viewport(), self.canvas);
    }

    pub fn overlay(&self) -> Vec<String> {
        overlay_lines(self.input.viewport(), self.store.frame())
    }

    pub fn viewport(&self) -> &ViewportState {
        self.input.viewport()
    }

    pub fn frame(&self) -> &PositionFrame {
        self.store.frame()
    }

    pub fn store(&self) -> &PositionStore {
        &self.store
    }

    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn is_dragging(&self) -> bool {
        self.input.drag().active
    }
}
