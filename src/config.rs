//! Configuration file support

use crate::error::{Result, SurfaceError};
use crate::mesh::{EllipsoidAxes, PoleCriteria};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings controlling how a surface is read and derived
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    /// Temporal-pole thresholds
    pub pole_criteria: PoleCriteria,

    /// Axes for ellipsoid projection
    pub ellipsoid: EllipsoidAxes,

    /// Load `<hemi>.curv` next to the surface
    pub read_curvature: bool,

    /// Load `<hemi>.area` next to the surface
    pub read_areas: bool,

    /// Ask for the Talairach transform
    pub load_transform: bool,

    /// JSON transform used instead of the sibling transform path
    pub transform_file: Option<String>,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            pole_criteria: PoleCriteria::default(),
            ellipsoid: EllipsoidAxes::default(),
            read_curvature: true,
            read_areas: true,
            load_transform: true,
            transform_file: None,
        }
    }
}

impl SurfaceConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SurfaceError::ConfigError(format!("Failed to read config file: {}", e))
        })?;

        serde_json::from_str(&content).map_err(|e| {
            SurfaceError::ConfigError(format!("Failed to parse config file: {}", e))
        })
    }

    /// Save configuration to a JSON file
    pub fn to_file(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            SurfaceError::ConfigError(format!("Failed to serialize config: {}", e))
        })?;

        std::fs::write(path, content).map_err(|e| {
            SurfaceError::ConfigError(format!("Failed to write config file: {}", e))
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: SurfaceConfig =
            serde_json::from_str(r#"{"read_areas": false, "ellipsoid": {"a": 10, "b": 20, "c": 30}}"#)
                .unwrap();

        assert!(!config.read_areas);
        assert!(config.read_curvature);
        assert_eq!(config.ellipsoid, EllipsoidAxes::new(10.0, 20.0, 30.0));
        assert_eq!(config.pole_criteria.max_talairach_y, 100.0);
    }

    #[test]
    fn test_config_file_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("surface.json");

        let mut config = SurfaceConfig::default();
        config.pole_criteria.max_normal_angle = 45.0;
        config.transform_file = Some("xfm.json".into());
        config.to_file(&path).unwrap();

        let loaded = SurfaceConfig::from_file(&path).unwrap();
        assert_eq!(loaded.pole_criteria.max_normal_angle, 45.0);
        assert_eq!(loaded.transform_file.as_deref(), Some("xfm.json"));
    }

    #[test]
    fn test_invalid_config_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            SurfaceConfig::from_file(&path),
            Err(SurfaceError::ConfigError(_))
        ));
        assert!(SurfaceConfig::from_file(&dir.path().join("missing.json")).is_err());
    }
}
