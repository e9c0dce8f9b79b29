//! Request bodies of the simulation control API.
//!
//! `POST /launch_simulation` takes [`SimulationParams`], `POST /delete_simulation`
//! takes [`DeleteRequest`]. Both are keyed by the stream session id.

use serde::{Deserialize, Serialize};

/// Plain `{x, y}` pair as the control API spells it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// How the simulation moves a body.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum MovementType {
    /// Never moves.
    Static = 0,
    /// Moves under gravity.
    Standard = 1,
    /// Steered by `button_press` events.
    Controlled = 2,
}

impl TryFrom<u8> for MovementType {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Static),
            1 => Ok(Self::Standard),
            2 => Ok(Self::Controlled),
            other => Err(format!("unknown movement type {other}")),
        }
    }
}

impl From<MovementType> for u8 {
    fn from(value: MovementType) -> Self {
        value as u8
    }
}

/// What happens when two bodies touch.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum CollisionType {
    /// Bodies pass through each other.
    PassThrough = 0,
    /// Bodies bounce.
    Elastic = 1,
}

impl TryFrom<u8> for CollisionType {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::PassThrough),
            1 => Ok(Self::Elastic),
            other => Err(format!("unknown collision type {other}")),
        }
    }
}

impl From<CollisionType> for u8 {
    fn from(value: CollisionType) -> Self {
        value as u8
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SpaceObject {
    pub name: String,
    pub mass: f64,
    pub radius: f64,
    pub position: Point,
    pub velocity: Point,
    pub movement_type: MovementType,
}

impl SpaceObject {
    pub fn new(
        name: &str,
        mass: f64,
        radius: f64,
        position: Point,
        velocity: Point,
        movement_type: MovementType,
    ) -> Self {
        Self {
            name: name.to_string(),
            mass,
            radius,
            position,
            velocity,
            movement_type,
        }
    }
}

/// Parameters of one simulation run.
///
/// `elasticity_coefficient` is edited as a percentage and converted to a
/// fraction by [`SimulationParams::into_launch_request`].
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SimulationParams {
    #[serde(default)]
    pub user_id: Option<String>,
    pub space_objects: Vec<SpaceObject>,
    pub time_delta: f64,
    pub simulation_time: f64,
    #[serde(rename = "G")]
    pub gravity: f64,
    pub collision_type: CollisionType,
    pub acceleration_rate: f64,
    pub elasticity_coefficient: f64,
}

impl SimulationParams {
    /// Bind the parameters to a stream session and scale the elasticity
    /// percentage down to the fraction the simulation expects.
    pub fn into_launch_request(mut self, session_id: &str) -> Self {
        self.user_id = Some(session_id.to_string());
        self.elasticity_coefficient /= 100.0;
        self
    }
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            user_id: None,
            space_objects: vec![
                SpaceObject::new(
                    "first",
                    1.0,
                    50.0,
                    Point::new(0.0, 0.0),
                    Point::default(),
                    MovementType::Controlled,
                ),
                SpaceObject::new(
                    "first",
                    10.0,
                    50.0,
                    Point::new(100.0, 100.0),
                    Point::default(),
                    MovementType::Controlled,
                ),
            ],
            time_delta: 0.5,
            simulation_time: 100_000_000.0,
            gravity: 10.0,
            collision_type: CollisionType::Elastic,
            acceleration_rate: 1.0,
            elasticity_coefficient: 1.0,
        }
    }
}

/// Body of `POST /delete_simulation`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DeleteRequest {
    pub user_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_launch_request_binds_session() {
        let params = SimulationParams {
            elasticity_coefficient: 50.0,
            ..SimulationParams::default()
        };
        let request = params.into_launch_request("sid-1");
        assert_eq!(request.user_id.as_deref(), Some("sid-1"));
        assert!((request.elasticity_coefficient - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_wire_shape() {
        let value = serde_json::to_value(SimulationParams::default().into_launch_request("s")).unwrap();
        assert_eq!(value["G"], Value::from(10.0));
        assert_eq!(value["collision_type"], Value::from(1));
        assert_eq!(value["space_objects"][0]["movement_type"], Value::from(2));
        assert_eq!(value["space_objects"][1]["position"]["x"], Value::from(100.0));
        assert_eq!(value["user_id"], Value::from("s"));
    }

    #[test]
    fn test_unknown_enum_value_rejected() {
        let raw = r#"{"name":"a","mass":1,"radius":1,"position":{"x":0,"y":0},"velocity":{"x":0,"y":0},"movement_type":7}"#;
        assert!(serde_json::from_str::<SpaceObject>(raw).is_err());
    }

    #[test]
    fn test_delete_request_shape() {
        let body = serde_json::to_string(&DeleteRequest {
            user_id: "abc".into(),
        })
        .unwrap();
        assert_eq!(body, r#"{"user_id":"abc"}"#);
    }
}
