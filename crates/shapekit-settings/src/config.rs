//! Configuration for the shape engine
//!
//! Provides configuration file handling and validation.
//! Supports JSON and TOML file formats.
//!
//! Configuration is organized into logical sections:
//! - Constraint settings (rotation snap step, aspect locking)
//! - Knob settings (rotation knob clearance, hit radius, knob mask)
//! - Rendering settings (curve flattening tolerance)

use crate::error::{SettingsError, SettingsResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Constraint behaviour applied when the user holds the constrain modifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstraintSettings {
    /// Rotation snap step in degrees
    pub angular_step_degrees: f64,
    /// Constrained corner drags keep the aspect ratio
    pub lock_aspect_on_constrain: bool,
}

impl Default for ConstraintSettings {
    fn default() -> Self {
        Self {
            angular_step_degrees: 45.0,
            lock_aspect_on_constrain: true,
        }
    }
}

/// Knob geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KnobSettings {
    /// Distance of the rotation knob above the top edge, in drawing units.
    /// Independent of the shape's scale.
    pub rotation_knob_clearance: f64,
    /// Radius within which a point hits a knob or the path outline
    pub hit_tolerance: f64,
    /// Bitmask of the part codes instances expose as knobs
    pub knob_mask: u32,
    /// Size knobs rotate the shape when the drag allows rotation
    pub size_knobs_rotate: bool,
}

impl Default for KnobSettings {
    fn default() -> Self {
        Self {
            rotation_knob_clearance: 20.0,
            hit_tolerance: 4.0,
            knob_mask: u32::MAX,
            size_knobs_rotate: false,
        }
    }
}

/// Rendering parameters consumed by path flattening
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderingSettings {
    /// Maximum deviation of flattened curves, in drawing units
    pub flatten_tolerance: f64,
}

impl Default for RenderingSettings {
    fn default() -> Self {
        Self {
            flatten_tolerance: 0.05,
        }
    }
}

/// Complete shape engine configuration
///
/// Aggregates all settings sections and provides file I/O operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ShapeSettings {
    /// Constraint settings
    pub constraints: ConstraintSettings,
    /// Knob settings
    pub knobs: KnobSettings,
    /// Rendering settings
    pub rendering: RenderingSettings,
}

impl ShapeSettings {
    /// Create new settings with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Rotation snap step in radians
    pub fn angular_step_radians(&self) -> f64 {
        self.constraints.angular_step_degrees.to_radians()
    }

    /// Platform config location: `<config dir>/shapekit/settings.toml`
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("shapekit").join("settings.toml"))
    }

    /// Load settings from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SettingsError::LoadError(format!("{}: {}", path.display(), e))
        })?;

        let settings: Self = match extension(path) {
            Some("json") => serde_json::from_str(&content)?,
            Some("toml") => toml::from_str(&content)?,
            other => {
                return Err(SettingsError::UnsupportedFormat(
                    other.unwrap_or("<none>").to_string(),
                ))
            }
        };

        settings.validate()?;
        tracing::debug!("Loaded shape settings from {}", path.display());
        Ok(settings)
    }

    /// Load settings from `path` if it exists, otherwise fall back to defaults
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            tracing::debug!("No settings at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save settings to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match extension(path) {
            Some("json") => serde_json::to_string_pretty(self)?,
            Some("toml") => toml::to_string_pretty(self)?,
            other => {
                return Err(SettingsError::UnsupportedFormat(
                    other.unwrap_or("<none>").to_string(),
                ))
            }
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content).map_err(|e| {
            SettingsError::SaveError(format!("{}: {}", path.display(), e))
        })?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        let step = self.constraints.angular_step_degrees;
        if !(step > 0.0 && step <= 180.0) {
            return Err(SettingsError::invalid(
                "constraints.angular_step_degrees",
                format!("must be in (0, 180], got {}", step),
            ));
        }

        if !(self.knobs.rotation_knob_clearance > 0.0) {
            return Err(SettingsError::invalid(
                "knobs.rotation_knob_clearance",
                "must be > 0",
            ));
        }

        if !(self.knobs.hit_tolerance > 0.0) {
            return Err(SettingsError::invalid("knobs.hit_tolerance", "must be > 0"));
        }

        if !(self.rendering.flatten_tolerance > 0.0) {
            return Err(SettingsError::invalid(
                "rendering.flatten_tolerance",
                "must be > 0",
            ));
        }

        Ok(())
    }
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|ext| ext.to_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = ShapeSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.constraints.angular_step_degrees, 45.0);
        assert!((settings.angular_step_radians() - std::f64::consts::FRAC_PI_4).abs() < 1e-12);
    }

    #[test]
    fn test_validate_rejects_bad_step() {
        let mut settings = ShapeSettings::default();
        settings.constraints.angular_step_degrees = 0.0;
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::InvalidSetting { .. })
        ));

        settings.constraints.angular_step_degrees = 270.0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_tolerances() {
        let mut settings = ShapeSettings::default();
        settings.knobs.hit_tolerance = -1.0;
        assert!(settings.validate().is_err());

        let mut settings = ShapeSettings::default();
        settings.rendering.flatten_tolerance = f64::NAN;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let settings: ShapeSettings = toml::from_str(
            r#"
            [constraints]
            angular_step_degrees = 15.0
            "#,
        )
        .unwrap();
        assert_eq!(settings.constraints.angular_step_degrees, 15.0);
        assert!(settings.constraints.lock_aspect_on_constrain);
        assert_eq!(settings.knobs, KnobSettings::default());
    }
}
