//! Scene configuration, loadable from JSON.
//!
//! Every field has a default matching the stock scene, so a config file only
//! needs the values it overrides.

use borgshield_common::Rgb;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors from loading a scene configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("camera distance range invalid: min {min}, max {max}")]
    InvalidDistance { min: f32, max: f32 },
    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Shield colour where there is no rim or ripple.
    pub base_color: Rgb,
    /// Colour the shield blends towards at the rim and on ripples.
    pub rim_color: Rgb,
    /// Euler increment (radians) applied to the cube every frame.
    pub cube_spin_per_frame: Vec3,
    pub cube_edge: f32,
    pub shield_edge: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub star_count: u32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            base_color: Rgb::new(0.0, 1.0, 0.0),
            rim_color: Rgb::new(0.8, 1.0, 0.8),
            cube_spin_per_frame: Vec3::new(0.001, 0.002, 0.0),
            cube_edge: 3.0,
            shield_edge: 3.2,
            min_distance: 5.0,
            max_distance: 15.0,
            star_count: 5000,
        }
    }
}

impl SceneConfig {
    /// Read and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        tracing::info!("loaded scene config from {}", path.display());
        Ok(config)
    }

    /// Load from `path` if given, otherwise use defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("cube_edge", self.cube_edge),
            ("shield_edge", self.shield_edge),
            ("min_distance", self.min_distance),
        ] {
            if value <= 0.0 || value.is_nan() {
                return Err(ConfigError::NonPositive { name, value });
            }
        }
        if self.min_distance > self.max_distance {
            return Err(ConfigError::InvalidDistance {
                min: self.min_distance,
                max: self.max_distance,
            });
        }
        Ok(())
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_stock_scene() {
        let c = SceneConfig::default();
        assert_eq!(c.base_color.to_string(), "#00ff00");
        assert_eq!(c.rim_color.to_string(), "#ccffcc");
        assert_eq!(c.min_distance, 5.0);
        assert_eq!(c.max_distance, 15.0);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r##"{{ "rim_color": "#ffffff", "star_count": 10 }}"##).unwrap();

        let c = SceneConfig::load(file.path()).unwrap();
        assert_eq!(c.rim_color, Rgb::new(1.0, 1.0, 1.0));
        assert_eq!(c.star_count, 10);
        assert_eq!(c.base_color, SceneConfig::default().base_color);
    }

    #[test]
    fn bad_colour_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "base_color": "green" }}"#).unwrap();
        assert!(matches!(SceneConfig::load(file.path()), Err(ConfigError::Json(_))));
    }

    #[test]
    fn inverted_distance_range_is_rejected() {
        let c = SceneConfig {
            min_distance: 20.0,
            ..SceneConfig::default()
        };
        assert!(matches!(c.validate(), Err(ConfigError::InvalidDistance { .. })));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SceneConfig::load(dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn json_round_trip() {
        let c = SceneConfig::default();
        let text = c.to_json_pretty().unwrap();
        let back: SceneConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn no_path_means_defaults() {
        assert_eq!(SceneConfig::load_or_default(None).unwrap(), SceneConfig::default());
    }
}
