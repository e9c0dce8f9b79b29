// Latest body positions with change detection
use protocol::{BodySnapshot, DecodeError, PositionFrame};
use tracing::{debug, warn};

/// Holds the most recent frame. `version` only moves when a frame that
/// actually differs is stored, so it doubles as a redraw trigger.
#[derive(Debug, Default)]
pub struct PositionStore {
    frame: PositionFrame,
    version: u64,
    decode_failures: u64,
}

impl PositionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frame(&self) -> &PositionFrame {
        &self.frame
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn decode_failures(&self) -> u64 {
        self.decode_failures
    }

    /// Decode a raw `update_step` payload and store it if it moved anything.
    ///
    /// A malformed payload is logged and counted; the stored frame is kept.
    pub fn ingest(&mut self, raw: &str) -> Result<bool, DecodeError> {
        match protocol::decode_frame(raw) {
            Ok(frame) => Ok(self.update(frame)),
            Err(e) => {
                self.decode_failures += 1;
                warn!(failures = self.decode_failures, "Dropping update_step payload: {}", e);
                Err(e)
            }
        }
    }

    /// Replace the stored frame only if it differs. Returns whether it did.
    pub fn update(&mut self, frame: PositionFrame) -> bool {
        if !frame_moved(&self.frame, &frame) {
            return false;
        }
        self.frame = frame;
        self.version += 1;
        debug!(bodies = self.frame.len(), version = self.version, "Stored new frame");
        true
    }
}

/// Length change, or any body whose `x` or `y` is not exactly equal. The feed
/// repeats identical numbers for bodies at rest, so no epsilon is used.
/// Radius is not compared.
fn frame_moved(old: &[BodySnapshot], new: &[BodySnapshot]) -> bool {
    old.len() != new.len()
        || old
            .iter()
            .zip(new)
            .any(|(a, b)| a.x != b.x || a.y != b.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(points: &[(f64, f64)]) -> PositionFrame {
        points
            .iter()
            .map(|&(x, y)| BodySnapshot::new(x, y, Some(10.0)))
            .collect()
    }

    #[test]
    fn test_identical_frame_is_not_stored() {
        let mut store = PositionStore::new();
        assert!(store.update(frame(&[(1.0, 2.0), (3.0, 4.0)])));
        assert_eq!(store.version(), 1);

        assert!(!store.update(frame(&[(1.0, 2.0), (3.0, 4.0)])));
        assert_eq!(store.version(), 1);
    }

    #[test]
    fn test_any_coordinate_change_is_stored() {
        let mut store = PositionStore::new();
        store.update(frame(&[(1.0, 2.0), (3.0, 4.0)]));
        assert!(store.update(frame(&[(1.0, 2.0), (3.0, 4.000_000_000_1)])));
        assert_eq!(store.version(), 2);
        assert_eq!(store.frame()[1].y, 4.000_000_000_1);
    }

    #[test]
    fn test_length_change_is_stored() {
        let mut store = PositionStore::new();
        store.update(frame(&[(1.0, 2.0)]));
        assert!(store.update(frame(&[(1.0, 2.0), (0.0, 0.0)])));
        assert!(store.update(frame(&[])));
        assert!(store.frame().is_empty());
        assert_eq!(store.version(), 3);
    }

    #[test]
    fn test_empty_on_empty_is_no_change() {
        let mut store = PositionStore::new();
        assert!(!store.update(PositionFrame::default()));
        assert_eq!(store.version(), 0);
    }

    #[test]
    fn test_radius_only_change_is_ignored() {
        let mut store = PositionStore::new();
        store.update(frame(&[(1.0, 2.0)]));
        let resized: PositionFrame = vec![BodySnapshot::new(1.0, 2.0, Some(99.0))].into();
        assert!(!store.update(resized));
        assert_eq!(store.frame()[0].radius, Some(10.0));
    }

    #[test]
    fn test_malformed_payload_keeps_frame() {
        let mut store = PositionStore::new();
        assert_eq!(store.ingest(r#"[{"a":{"x":1,"y":2}}]"#).unwrap(), true);
        let before = store.frame().clone();

        assert!(store.ingest("not json at all").is_err());
        assert!(store.ingest(r#"{"x": 1}"#).is_err());
        assert_eq!(store.frame(), &before);
        assert_eq!(store.version(), 1);
        assert_eq!(store.decode_failures(), 2);
    }
}
