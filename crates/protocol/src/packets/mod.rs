//! Packet definitions for the simulation stream.
//!
//! The stream is Socket.IO v4 on top of the Engine.IO v4 WebSocket transport.
//! Each WebSocket text frame carries one engine packet; engine `Message`
//! packets wrap one socket packet, e.g. `42["update_step", "..."]`.
//!
//! This module contains both client->server and server->client packet types.

mod client;
mod server;

pub use client::*;
pub use server::*;

/// Inbound event carrying a position frame.
pub const EVENT_UPDATE_STEP: &str = "update_step";
/// Outbound event carrying a direction key press.
pub const EVENT_BUTTON_PRESS: &str = "button_press";
/// Path and query of the WebSocket transport endpoint.
pub const SOCKET_PATH: &str = "/socket.io/?EIO=4&transport=websocket";

/// Build the WebSocket URL of the stream from a server address.
///
/// `http(s)://` bases become `ws(s)://`, bare `host:port` becomes `ws://`,
/// and the transport path is appended unless the URL already has one.
pub fn socket_url(base: &str) -> String {
    let base = base.trim();
    let with_scheme = if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{rest}")
    } else if base.starts_with("ws://") || base.starts_with("wss://") {
        base.to_string()
    } else {
        format!("ws://{base}")
    };
    if with_scheme.contains("/socket.io/") {
        with_scheme
    } else {
        format!("{}{}", with_scheme.trim_end_matches('/'), SOCKET_PATH)
    }
}

/// Engine.IO packet types (first character of a frame).
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineType {
    /// Handshake data sent by the server after the socket opens.
    Open = b'0',
    /// Transport close.
    Close = b'1',
    /// Heartbeat request (server -> client in v4).
    Ping = b'2',
    /// Heartbeat reply.
    Pong = b'3',
    /// Wraps a socket packet.
    Message = b'4',
    /// Transport upgrade (polling only).
    Upgrade = b'5',
    /// No-op (polling only).
    Noop = b'6',
}

impl EngineType {
    pub fn from_byte(byte: u8) -> Option<Self> {
        Some(match byte {
            b'0' => Self::Open,
            b'1' => Self::Close,
            b'2' => Self::Ping,
            b'3' => Self::Pong,
            b'4' => Self::Message,
            b'5' => Self::Upgrade,
            b'6' => Self::Noop,
            _ => return None,
        })
    }

    #[inline]
    pub fn as_char(self) -> char {
        self as u8 as char
    }
}

/// Socket.IO packet types (second character of an engine `Message`).
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketType {
    /// Namespace connect request / acknowledgement.
    Connect = b'0',
    /// Namespace disconnect.
    Disconnect = b'1',
    /// Named event with JSON arguments.
    Event = b'2',
    /// Acknowledgement of an event.
    Ack = b'3',
    /// Namespace connection refused.
    ConnectError = b'4',
    /// Event with binary attachments.
    BinaryEvent = b'5',
    /// Acknowledgement with binary attachments.
    BinaryAck = b'6',
}

impl SocketType {
    pub fn from_byte(byte: u8) -> Option<Self> {
        Some(match byte {
            b'0' => Self::Connect,
            b'1' => Self::Disconnect,
            b'2' => Self::Event,
            b'3' => Self::Ack,
            b'4' => Self::ConnectError,
            b'5' => Self::BinaryEvent,
            b'6' => Self::BinaryAck,
            _ => return None,
        })
    }

    #[inline]
    pub fn as_char(self) -> char {
        self as u8 as char
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_url() {
        assert_eq!(
            socket_url("http://localhost:5000"),
            "ws://localhost:5000/socket.io/?EIO=4&transport=websocket"
        );
        assert_eq!(
            socket_url("https://sim.example/"),
            "wss://sim.example/socket.io/?EIO=4&transport=websocket"
        );
        assert_eq!(
            socket_url("localhost:5000"),
            "ws://localhost:5000/socket.io/?EIO=4&transport=websocket"
        );
        let full = "ws://h:1/socket.io/?EIO=4&transport=websocket";
        assert_eq!(socket_url(full), full);
    }

    #[test]
    fn test_type_bytes() {
        assert_eq!(EngineType::from_byte(b'4'), Some(EngineType::Message));
        assert_eq!(SocketType::from_byte(b'2'), Some(SocketType::Event));
        assert_eq!(EngineType::from_byte(b'x'), None);
        assert_eq!(EngineType::Pong.as_char(), '3');
    }
}
