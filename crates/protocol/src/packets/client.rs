//! Client -> Server packet building.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{EVENT_BUTTON_PRESS, EngineType, SocketType};

/// Direction label sent with `button_press`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

/// Body of the `button_press` event. One is sent per raw key-down/key-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct ButtonPress {
    pub is_pressed: bool,
    pub direction: Direction,
}

/// Packets the viewer sends upstream.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientPacket {
    /// Reply to an engine ping.
    Pong,
    /// Join the default namespace.
    Connect,
    /// Leave the default namespace.
    Disconnect,
    /// Named event with JSON arguments.
    Event { name: String, args: Vec<Value> },
}

impl ClientPacket {
    /// Encode as the text of one WebSocket frame.
    pub fn encode(&self) -> String {
        match self {
            ClientPacket::Pong => EngineType::Pong.as_char().to_string(),
            ClientPacket::Connect => message_prefix(SocketType::Connect),
            ClientPacket::Disconnect => message_prefix(SocketType::Disconnect),
            ClientPacket::Event { name, args } => {
                let mut items = Vec::with_capacity(args.len() + 1);
                items.push(Value::String(name.clone()));
                items.extend(args.iter().cloned());
                let mut out = message_prefix(SocketType::Event);
                out.push_str(&Value::Array(items).to_string());
                out
            }
        }
    }
}

fn message_prefix(socket_type: SocketType) -> String {
    let mut out = String::with_capacity(2);
    out.push(EngineType::Message.as_char());
    out.push(socket_type.as_char());
    out
}

/// Build a `button_press` event frame.
pub fn build_button_press(press: ButtonPress) -> String {
    let body = serde_json::json!({
        "is_pressed": press.is_pressed,
        "direction": press.direction.as_str(),
    });
    ClientPacket::Event {
        name: EVENT_BUTTON_PRESS.to_string(),
        args: vec![body],
    }
    .encode()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_frames() {
        assert_eq!(ClientPacket::Pong.encode(), "3");
        assert_eq!(ClientPacket::Connect.encode(), "40");
        assert_eq!(ClientPacket::Disconnect.encode(), "41");
    }

    #[test]
    fn test_button_press_frame() {
        let frame = build_button_press(ButtonPress {
            is_pressed: true,
            direction: Direction::Down,
        });
        assert!(frame.starts_with("42"));
        let body: Value = serde_json::from_str(&frame[2..]).unwrap();
        assert_eq!(
            body,
            serde_json::json!(["button_press", {"is_pressed": true, "direction": "down"}])
        );
    }

    #[test]
    fn test_direction_serde() {
        let d: Direction = serde_json::from_str("\"left\"").unwrap();
        assert_eq!(d, Direction::Left);
        assert_eq!(serde_json::to_string(&Direction::Up).unwrap(), "\"up\"");
    }
}
