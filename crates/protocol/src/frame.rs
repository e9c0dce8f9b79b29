//! Position frames carried by the `update_step` event.
//!
//! The feed sends a JSON array with one entry per body. Each entry is either a
//! single-key wrapper object whose value is the body record, or the bare body
//! record itself. The wrapper key carries no information and is dropped.
//! The whole array usually arrives double-encoded, as a JSON string.

use std::collections::BTreeMap;
use std::ops::Deref;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{DecodeError, Vec2};

/// One body as reported by the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct BodySnapshot {
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
}

impl BodySnapshot {
    pub const fn new(x: f64, y: f64, radius: Option<f64>) -> Self {
        Self { x, y, radius }
    }

    /// World-space position of the body.
    #[inline]
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// Ordered bodies of one simulation step. Index `i` refers to the same body
/// in every frame of a session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PositionFrame(Vec<BodySnapshot>);

impl PositionFrame {
    pub fn new(bodies: Vec<BodySnapshot>) -> Self {
        Self(bodies)
    }

    pub fn bodies(&self) -> &[BodySnapshot] {
        &self.0
    }

    pub fn into_bodies(self) -> Vec<BodySnapshot> {
        self.0
    }
}

impl Deref for PositionFrame {
    type Target = [BodySnapshot];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<BodySnapshot>> for PositionFrame {
    fn from(bodies: Vec<BodySnapshot>) -> Self {
        Self(bodies)
    }
}

impl FromIterator<BodySnapshot> for PositionFrame {
    fn from_iter<I: IntoIterator<Item = BodySnapshot>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Accepted shapes of a single array entry.
#[derive(Deserialize)]
#[serde(untagged)]
enum Entry {
    Bare(BodySnapshot),
    Wrapped(BTreeMap<String, BodySnapshot>),
}

/// Decode a raw `update_step` payload into a frame.
///
/// Accepts the array itself or a JSON string containing it.
pub fn decode_frame(raw: &str) -> Result<PositionFrame, DecodeError> {
    let value: Value = serde_json::from_str(raw)?;
    let value = match value {
        Value::String(inner) => serde_json::from_str(&inner)?,
        other => other,
    };
    frame_from_value(value)
}

/// Decode an already parsed payload (an event argument).
pub fn frame_from_value(value: Value) -> Result<PositionFrame, DecodeError> {
    match value {
        Value::Array(entries) => entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| body_from_entry(index, entry))
            .collect(),
        Value::String(inner) => decode_frame(&inner),
        _ => Err(DecodeError::NotASequence),
    }
}

fn body_from_entry(index: usize, entry: Value) -> Result<BodySnapshot, DecodeError> {
    match serde_json::from_value::<Entry>(entry) {
        Ok(Entry::Bare(body)) => Ok(body),
        Ok(Entry::Wrapped(wrapper)) => {
            let keys = wrapper.len();
            let mut values = wrapper.into_values();
            match (values.next(), values.next()) {
                (Some(body), None) => Ok(body),
                _ => Err(DecodeError::AmbiguousWrapper { index, keys }),
            }
        }
        Err(_) => Err(DecodeError::InvalidEntry { index }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrapped_entries() {
        let raw = r#"[{"0": {"x": 1.5, "y": -2, "radius": 50}}, {"moon": {"x": 3, "y": 4}}]"#;
        let frame = decode_frame(raw).unwrap();
        assert_eq!(frame.len(), 2);
        assert_eq!(frame[0], BodySnapshot::new(1.5, -2.0, Some(50.0)));
        assert_eq!(frame[1], BodySnapshot::new(3.0, 4.0, None));
    }

    #[test]
    fn test_double_encoded_payload() {
        let inner = r#"[{"a": {"x": 10, "y": 20, "radius": 5}}]"#;
        let raw = serde_json::to_string(inner).unwrap();
        let frame = decode_frame(&raw).unwrap();
        assert_eq!(frame.bodies(), &[BodySnapshot::new(10.0, 20.0, Some(5.0))]);
    }

    #[test]
    fn test_bare_entries_and_extra_fields() {
        let raw = r#"[{"x": 1, "y": 2, "name": "Sun"}]"#;
        let frame = decode_frame(raw).unwrap();
        assert_eq!(frame[0].position(), Vec2::new(1.0, 2.0));
    }

    #[test]
    fn test_empty_array_is_empty_frame() {
        assert!(decode_frame("[]").unwrap().is_empty());
    }

    #[test]
    fn test_not_json() {
        assert!(matches!(decode_frame("{not json"), Err(DecodeError::Malformed(_))));
    }

    #[test]
    fn test_not_a_sequence() {
        assert!(matches!(decode_frame(r#"{"x": 1}"#), Err(DecodeError::NotASequence)));
        assert!(matches!(decode_frame("42"), Err(DecodeError::NotASequence)));
    }

    #[test]
    fn test_entry_without_position() {
        let raw = r#"[{"a": {"x": 1, "y": 2}}, {"b": {"mass": 3}}]"#;
        assert!(matches!(
            decode_frame(raw),
            Err(DecodeError::InvalidEntry { index: 1 })
        ));
    }

    #[test]
    fn test_wrapper_with_two_bodies() {
        let raw = r#"[{"a": {"x": 1, "y": 2}, "b": {"x": 3, "y": 4}}]"#;
        assert!(matches!(
            decode_frame(raw),
            Err(DecodeError::AmbiguousWrapper { index: 0, keys: 2 })
        ));
    }
}
