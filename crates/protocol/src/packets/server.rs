//! Server -> Client packet parsing.

use serde::Deserialize;
use serde_json::Value;

use super::{EVENT_UPDATE_STEP, EngineType, SocketType};
use crate::ProtocolError;

/// Engine handshake sent right after the WebSocket opens.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenInfo {
    pub sid: String,
    #[serde(default)]
    pub upgrades: Vec<String>,
    #[serde(default)]
    pub ping_interval: u64,
    #[serde(default)]
    pub ping_timeout: u64,
    #[serde(default)]
    pub max_payload: u64,
}

#[derive(Deserialize)]
struct ConnectAck {
    sid: Option<String>,
}

/// Parsed server packet.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerPacket {
    /// Engine handshake (`0{...}`).
    Open(OpenInfo),
    /// Engine close (`1`).
    Close,
    /// Heartbeat request (`2`); must be answered with a pong.
    Ping,
    /// Heartbeat reply (`3`).
    Pong,
    /// Transport-level packets that carry nothing for the viewer.
    Noop,
    /// Namespace joined (`40{"sid": ...}`).
    Connected { sid: Option<String> },
    /// Namespace left (`41`).
    Disconnected,
    /// Named event (`42["name", ...args]`).
    Event { name: String, args: Vec<Value> },
    /// Namespace connection refused (`44{...}`).
    ConnectError(Value),
    /// Acks and binary packets, which the viewer never requests.
    Unsupported(SocketType),
}

/// Stream events the viewer reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Session established; the id is attached to control requests.
    Connected { session_id: String },
    /// Session closed by the server.
    Disconnected,
    /// Raw `update_step` payload, still to be decoded.
    UpdateStep(String),
}

impl ServerPacket {
    /// Parse the text of one WebSocket frame.
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let bytes = text.as_bytes();
        let Some(&first) = bytes.first() else {
            return Err(ProtocolError::Empty);
        };
        let engine_type = EngineType::from_byte(first)
            .ok_or(ProtocolError::InvalidEngineType(first as char))?;
        let rest = &text[1..];

        match engine_type {
            EngineType::Open => Ok(ServerPacket::Open(serde_json::from_str(rest)?)),
            EngineType::Close => Ok(ServerPacket::Close),
            EngineType::Ping => Ok(ServerPacket::Ping),
            EngineType::Pong => Ok(ServerPacket::Pong),
            EngineType::Upgrade | EngineType::Noop => Ok(ServerPacket::Noop),
            EngineType::Message => parse_socket_packet(rest),
        }
    }

    /// Narrow to the events the viewer handles. Everything else yields `None`.
    pub fn into_stream_event(self) -> Option<StreamEvent> {
        match self {
            ServerPacket::Connected { sid: Some(sid) } => {
                Some(StreamEvent::Connected { session_id: sid })
            }
            ServerPacket::Disconnected | ServerPacket::Close => Some(StreamEvent::Disconnected),
            ServerPacket::Event { name, mut args } if name == EVENT_UPDATE_STEP => {
                if args.is_empty() {
                    return Some(StreamEvent::UpdateStep(String::new()));
                }
                let payload = match args.swap_remove(0) {
                    Value::String(raw) => raw,
                    other => other.to_string(),
                };
                Some(StreamEvent::UpdateStep(payload))
            }
            _ => None,
        }
    }
}

fn parse_socket_packet(text: &str) -> Result<ServerPacket, ProtocolError> {
    let Some(&first) = text.as_bytes().first() else {
        return Err(ProtocolError::Empty);
    };
    let socket_type =
        SocketType::from_byte(first).ok_or(ProtocolError::InvalidSocketType(first as char))?;
    let body = strip_ack_id(strip_namespace(&text[1..]));

    match socket_type {
        SocketType::Connect => {
            if body.is_empty() {
                return Ok(ServerPacket::Connected { sid: None });
            }
            let ack: ConnectAck = serde_json::from_str(body)?;
            Ok(ServerPacket::Connected { sid: ack.sid })
        }
        SocketType::Disconnect => Ok(ServerPacket::Disconnected),
        SocketType::Event => {
            let mut items: Vec<Value> = serde_json::from_str(body)?;
            if items.is_empty() {
                return Err(ProtocolError::MissingEventName);
            }
            let Value::String(name) = items.remove(0) else {
                return Err(ProtocolError::MissingEventName);
            };
            Ok(ServerPacket::Event { name, args: items })
        }
        SocketType::ConnectError => {
            let detail = if body.is_empty() {
                Value::Null
            } else {
                serde_json::from_str(body)?
            };
            Ok(ServerPacket::ConnectError(detail))
        }
        other => Ok(ServerPacket::Unsupported(other)),
    }
}

/// Drop a `/namespace,` prefix. Only the default namespace is used.
fn strip_namespace(text: &str) -> &str {
    if text.starts_with('/') {
        match text.find(',') {
            Some(comma) => &text[comma + 1..],
            None => "",
        }
    } else {
        text
    }
}

fn strip_ack_id(text: &str) -> &str {
    text.trim_start_matches(|c: char| c.is_ascii_digit())
}
