//! Viewer configuration.

use std::collections::BTreeMap;

use protocol::Direction;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejected viewer settings.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("min_scale must be strictly positive, got {0}")]
    NonPositiveMinScale(f64),

    #[error("min_scale {min} exceeds max_scale {max}")]
    InvertedScaleBounds { min: f64, max: f64 },

    #[error("zoom factor {0} must be finite and positive")]
    InvalidZoomFactor(f64),
}

/// Navigation and rendering settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ViewerConfig {
    /// Smallest allowed zoom scale.
    #[serde(default = "default_min_scale")]
    pub min_scale: f64,
    /// Largest allowed zoom scale.
    #[serde(default = "default_max_scale")]
    pub max_scale: f64,
    /// Scale multiplier for one wheel step towards the screen.
    #[serde(default = "default_zoom_in_factor")]
    pub zoom_in_factor: f64,
    /// Scale multiplier for one wheel step away from the screen.
    #[serde(default = "default_zoom_out_factor")]
    pub zoom_out_factor: f64,
    /// World radius of bodies the feed sends without one.
    #[serde(default = "default_radius")]
    pub default_radius: f64,
    /// Keys forwarded upstream as `button_press`.
    #[serde(default)]
    pub keys: KeyMap,
}

impl ViewerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_scale.is_nan() || self.min_scale <= 0.0 {
            return Err(ConfigError::NonPositiveMinScale(self.min_scale));
        }
        if self.min_scale > self.max_scale {
            return Err(ConfigError::InvertedScaleBounds {
                min: self.min_scale,
                max: self.max_scale,
            });
        }
        for factor in [self.zoom_in_factor, self.zoom_out_factor] {
            if !factor.is_finite() || factor <= 0.0 {
                return Err(ConfigError::InvalidZoomFactor(factor));
            }
        }
        Ok(())
    }

    /// Clamp a candidate scale into the configured bounds.
    #[inline]
    pub fn clamp_scale(&self, scale: f64) -> f64 {
        scale.clamp(self.min_scale, self.max_scale)
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            min_scale: default_min_scale(),
            max_scale: default_max_scale(),
            zoom_in_factor: default_zoom_in_factor(),
            zoom_out_factor: default_zoom_out_factor(),
            default_radius: default_radius(),
            keys: KeyMap::default(),
        }
    }
}

fn default_min_scale() -> f64 {
    1e-6
}
fn default_max_scale() -> f64 {
    5.0
}
fn default_zoom_in_factor() -> f64 {
    1.1
}
fn default_zoom_out_factor() -> f64 {
    0.9
}
fn default_radius() -> f64 {
    5.0
}

/// Case-insensitive key -> direction table.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(from = "BTreeMap<String, Direction>", into = "BTreeMap<String, Direction>")]
pub struct KeyMap(BTreeMap<String, Direction>);

impl KeyMap {
    pub fn new(bindings: impl IntoIterator<Item = (String, Direction)>) -> Self {
        Self(
            bindings
                .into_iter()
                .map(|(key, direction)| (key.to_lowercase(), direction))
                .collect(),
        )
    }

    pub fn lookup(&self, key: &str) -> Option<Direction> {
        self.0.get(&key.to_lowercase()).copied()
    }
}

impl Default for KeyMap {
    /// Labels are inverted relative to the physical keys; the simulation
    /// expects exactly this mapping.
    fn default() -> Self {
        Self::new([
            ("w".to_string(), Direction::Down),
            ("s".to_string(), Direction::Up),
            ("a".to_string(), Direction::Left),
            ("d".to_string(), Direction::Right),
        ])
    }
}

impl From<BTreeMap<String, Direction>> for KeyMap {
    fn from(map: BTreeMap<String, Direction>) -> Self {
        Self::new(map)
    }
}

impl From<KeyMap> for BTreeMap<String, Direction> {
    fn from(map: KeyMap) -> Self {
        map.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(ViewerConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_rejects_degenerate_bounds() {
        let zero = ViewerConfig {
            min_scale: 0.0,
            ..ViewerConfig::default()
        };
        assert_eq!(zero.validate(), Err(ConfigError::NonPositiveMinScale(0.0)));

        let inverted = ViewerConfig {
            min_scale: 3.0,
            max_scale: 2.0,
            ..ViewerConfig::default()
        };
        assert!(matches!(
            inverted.validate(),
            Err(ConfigError::InvertedScaleBounds { .. })
        ));

        let nan = ViewerConfig {
            min_scale: f64::NAN,
            ..ViewerConfig::default()
        };
        assert!(nan.validate().is_err());
    }

    #[test]
    fn test_key_lookup_ignores_case() {
        let keys = KeyMap::default();
        assert_eq!(keys.lookup("W"), Some(Direction::Down));
        assert_eq!(keys.lookup("s"), Some(Direction::Up));
        assert_eq!(keys.lookup("q"), None);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: ViewerConfig = toml::from_str(
            r#"
            max_scale = 8.0

            [keys]
            ArrowUp = "up"
            "#,
        )
        .unwrap();
        assert_eq!(config.max_scale, 8.0);
        assert_eq!(config.min_scale, 1e-6);
        assert_eq!(config.keys.lookup("arrowup"), Some(Direction::Up));
        assert_eq!(config.keys.lookup("w"), None);
    }
}
