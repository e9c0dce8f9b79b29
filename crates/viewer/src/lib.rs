// Viewport transform and live position sync for the orbview client
// The core modules are platform independent; `network` and `web` wire them to
// a browser canvas and WebSocket when built for wasm32.

// Module structure - each module handles a specific concern
pub mod camera;  // Viewport state, screen <-> world transforms
pub mod config;  // Scale bounds, zoom steps, key bindings
pub mod input;   // Pointer, wheel and key handling
pub mod render;  // Draw commands, surfaces, coordinate overlay
pub mod store;   // Latest frame with change detection
pub mod view;    // Event dispatch over the owned state

#[cfg(target_arch = "wasm32")]
mod network;     // WebSocket connection to the simulation stream
#[cfg(target_arch = "wasm32")]
mod web;         // DOM event wiring and canvas surface

pub use camera::{CanvasSize, Transform, ViewportState};
pub use config::{ConfigError, KeyMap, ViewerConfig};
pub use input::{DragSession, InteractionController, ZoomDirection};
pub use render::{DrawCommand, RenderCompositor, Surface};
pub use store::PositionStore;
pub use view::{ViewController, ViewEvent};

#[cfg(target_arch = "wasm32")]
pub use web::ViewerHandle;
