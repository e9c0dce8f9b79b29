//! Shared protocol crate for orbview.
//!
//! This crate contains:
//! - Stream transport packets (Socket.IO over WebSocket text frames)
//! - `update_step` position frame decoding
//! - Control API request bodies and built-in presets

mod error;
pub mod control;
pub mod frame;
pub mod packets;
pub mod templates;

pub use error::{DecodeError, ProtocolError};
pub use frame::{decode_frame, BodySnapshot, PositionFrame};
pub use packets::{ButtonPress, Direction, StreamEvent};

/// 2D vector in world or screen space.
pub type Vec2 = glam::DVec2;
