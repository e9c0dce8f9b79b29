//! Built-in simulation presets.

use crate::control::{CollisionType, MovementType, Point, SimulationParams, SpaceObject};

/// A named preset.
#[derive(Debug, Clone)]
pub struct Template {
    /// Identifier used on the command line.
    pub key: &'static str,
    /// Human readable title.
    pub title: &'static str,
    pub params: SimulationParams,
}

/// Keys of every preset, in display order.
pub const TEMPLATE_KEYS: [&str; 4] = ["default", "solar-system-short", "solar-system", "binary-stars"];

/// Look up a preset by key.
pub fn template(key: &str) -> Option<Template> {
    let (title, params) = match key {
        "default" => ("Default two-body setup", SimulationParams::default()),
        "solar-system-short" => ("Solar system (short)", solar_system_short()),
        "solar-system" => ("Solar system (full)", solar_system()),
        "binary-stars" => ("Binary stars", binary_stars()),
        _ => return None,
    };
    let key = TEMPLATE_KEYS.into_iter().find(|k| *k == key)?;
    Some(Template { key, title, params })
}

/// All presets, in display order.
pub fn all_templates() -> Vec<Template> {
    TEMPLATE_KEYS.into_iter().filter_map(template).collect()
}

fn body(name: &str, mass: f64, radius: f64, pos: (f64, f64), vel: (f64, f64), movement: MovementType) -> SpaceObject {
    SpaceObject::new(
        name,
        mass,
        radius,
        Point::new(pos.0, pos.1),
        Point::new(vel.0, vel.1),
        movement,
    )
}

fn preset(space_objects: Vec<SpaceObject>, time_delta: f64, simulation_time: f64) -> SimulationParams {
    SimulationParams {
        user_id: None,
        space_objects,
        time_delta,
        simulation_time,
        gravity: 10.0,
        collision_type: CollisionType::Elastic,
        acceleration_rate: 1.0,
        elasticity_coefficient: 50.0,
    }
}

fn solar_system_short() -> SimulationParams {
    use MovementType::*;
    preset(
        vec![
            body("Sun", 1000.0, 60.0, (0.0, 0.0), (0.0, 0.0), Static),
            body("Earth", 150.0, 20.0, (600.0, 0.0), (0.0, 500.0), Standard),
            body("Moon", 1.0, 10.0, (700.0, 0.0), (50.0, 550.0), Standard),
        ],
        0.005,
        100_000.0,
    )
}

fn solar_system() -> SimulationParams {
    use MovementType::*;
    preset(
        vec![
            body("Sun", 5000.0, 80.0, (0.0, 0.0), (0.0, 0.0), Static),
            body("Mercury", 18.0, 12.0, (300.0, 0.0), (0.0, 590.0), Standard),
            body("Venus", 45.0, 18.0, (450.0, 0.0), (0.0, 700.0), Standard),
            body("Earth", 50.0, 20.0, (600.0, 0.0), (0.0, 800.0), Standard),
            body("Moon", 1.0, 8.0, (630.0, 0.0), (100.0, 900.0), Standard),
            body("Mars", 30.0, 16.0, (800.0, 0.0), (0.0, 1100.0), Standard),
            body("Jupiter", 200.0, 40.0, (1200.0, 0.0), (0.0, 1400.0), Standard),
            body("Saturn", 150.0, 35.0, (1600.0, 0.0), (0.0, 1600.0), Standard),
            body("Uranus", 80.0, 25.0, (2000.0, 0.0), (0.0, 1700.0), Standard),
            body("Neptune", 90.0, 24.0, (2400.0, 0.0), (0.0, 1800.0), Standard),
        ],
        0.005,
        1_000_000.0,
    )
}

fn binary_stars() -> SimulationParams {
    use MovementType::*;
    preset(
        vec![
            body("Star A", 500.0, 50.0, (-200.0, 0.0), (0.0, 4.0), Standard),
            body("Star B", 500.0, 50.0, (200.0, 0.0), (0.0, -4.0), Standard),
        ],
        0.05,
        100_000.0,
    )
}
