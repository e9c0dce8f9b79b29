// Coordinate read-out shown next to the canvas
use protocol::PositionFrame;

use crate::camera::ViewportState;

/// `Center: (x, y)` for the world point at the canvas centre, then one
/// `Object N: (x, y)` line per body (1-based), two decimals each.
pub fn overlay_lines(viewport: &ViewportState, frame: &PositionFrame) -> Vec<String> {
    let center = viewport.center();
    let mut lines = Vec::with_capacity(frame.len() + 1);
    lines.push(format!("Center: ({:.2}, {:.2})", unsigned_zero(center.x), unsigned_zero(center.y)));
    lines.extend(frame.iter().enumerate().map(|(i, body)| {
        format!(
            "Object {}: ({:.2}, {:.2})",
            i + 1,
            unsigned_zero(body.x),
            unsigned_zero(body.y)
        )
    }));
    lines
}

// -0.0 + 0.0 == +0.0, so a negated zero offset prints as 0.00
#[inline]
fn unsigned_zero(value: f64) -> f64 {
    value + 0.0
}
