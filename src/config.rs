//! Configuration loader - YAML presets + .env settings

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::curve::{CurveError, CurveParams};
use crate::render::Rgb;

/// Main configuration loaded from dragon.yaml
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub defaults: CurveParams,
    #[serde(default)]
    pub render: RenderSettings,
    #[serde(default)]
    pub presets: Vec<Preset>,
}

/// Drawing settings shared by the viewer and the exporters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderSettings {
    pub width: u32,
    pub height: u32,
    pub start_color: Rgb,
    pub end_color: Rgb,
    pub gradient: bool,
    pub rainbow: bool,
    pub dark_mode: bool,
    pub view_3d: bool,
    pub stroke_scale: f64,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 768,
            start_color: Rgb([0, 200, 255]),
            end_color: Rgb([255, 64, 160]),
            gradient: true,
            rainbow: false,
            dark_mode: true,
            view_3d: false,
            stroke_scale: 1.0,
        }
    }
}

/// A named parameter set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preset {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub params: CurveParams,
    /// Overrides `render.view_3d` when present
    #[serde(default)]
    pub view_3d: Option<bool>,
}

/// Settings loaded from .env
#[derive(Debug, Clone)]
pub struct Settings {
    pub log_dir: String,
    pub output_dir: String,
    pub cache_capacity: usize,
}

impl Config {
    /// Load configuration from YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject parameter sets that would fail fast later anyway
    pub fn validate(&self) -> Result<(), CurveError> {
        self.defaults.validate()?;
        for preset in &self.presets {
            preset.params.validate()?;
        }
        Ok(())
    }

    /// Get preset by ID
    pub fn get_preset(&self, id: &str) -> Option<&Preset> {
        self.presets.iter().find(|p| p.id == id)
    }

    /// Parameters for a preset, or the defaults when `id` is `None`
    pub fn resolve(&self, id: Option<&str>) -> Result<(CurveParams, bool), CurveError> {
        match id {
            None => Ok((self.defaults, self.render.view_3d)),
            Some(id) => self
                .get_preset(id)
                .map(|p| (p.params, p.view_3d.unwrap_or(self.render.view_3d)))
                .ok_or_else(|| CurveError::UnknownPreset(id.to_string())),
        }
    }
}

impl Settings {
    /// Load settings from .env file
    pub fn load() -> Self {
        dotenvy::dotenv().ok();

        Settings {
            log_dir: std::env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),
            output_dir: std::env::var("OUTPUT_DIR").unwrap_or_else(|_| "./out".to_string()),
            cache_capacity: std::env::var("CACHE_CAPACITY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8),
        }
    }
}

/// Built-in config when no file exists
pub fn default_config() -> Config {
    let presets = vec![
        Preset {
            id: "heighway".to_string(),
            name: "Heighway Dragon".to_string(),
            params: CurveParams::default(),
            view_3d: Some(false),
        },
        Preset {
            id: "twisted".to_string(),
            name: "Twisted Ribbon".to_string(),
            params: CurveParams {
                iterations: 11,
                angle: 90.0,
                twist: 12.5,
                extrusion: 0.02,
                speed: 120,
            },
            view_3d: Some(true),
        },
        Preset {
            id: "spiral".to_string(),
            name: "Golden Spiral".to_string(),
            params: CurveParams {
                iterations: 12,
                angle: 137.51,
                twist: 3.0,
                extrusion: 0.05,
                speed: 240,
            },
            view_3d: Some(true),
        },
    ];

    Config {
        defaults: CurveParams::default(),
        render: RenderSettings::default(),
        presets,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml() {
        let yaml = r##"
defaults:
  iterations: 8
  angle: 90
render:
  width: 640
  start_color: "#ff0000"
  rainbow: true
presets:
  - id: flat
    name: Flat
    iterations: 4
    angle: 60.25
  - id: ribbon
    name: Ribbon
    iterations: 6
    angle: 90
    twist: 10
    extrusion: 0.1
    speed: 30
    view_3d: true
"##;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.defaults.iterations, 8);
        assert_eq!(config.render.width, 640);
        assert_eq!(config.render.height, 768);
        assert_eq!(config.render.start_color, Rgb([255, 0, 0]));
        assert!(config.render.rainbow);

        let flat = config.get_preset("flat").unwrap();
        assert_eq!(flat.params.angle, 60.25);
        assert_eq!(flat.view_3d, None);

        let (ribbon, view_3d) = config.resolve(Some("ribbon")).unwrap();
        assert_eq!(ribbon.twist, 10.0);
        assert_eq!(ribbon.speed, 30);
        assert!(view_3d);
    }

    #[test]
    fn test_unknown_preset() {
        let config = default_config();
        assert_eq!(
            config.resolve(Some("nope")).unwrap_err(),
            CurveError::UnknownPreset("nope".to_string())
        );
        assert_eq!(config.resolve(None).unwrap().0, CurveParams::default());
    }

    #[test]
    fn test_rejects_deep_preset() {
        let yaml = "presets:\n  - id: deep\n    name: Deep\n    iterations: 99\n    angle: 90\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_non_finite_preset_angle() {
        let yaml = "presets:\n  - id: broken\n    name: Broken\n    iterations: 4\n    angle: .nan\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(config.get_preset("broken").unwrap().params.angle.is_nan());
        assert!(matches!(
            config.validate(),
            Err(CurveError::OutOfRange { name: "angle", .. })
        ));

        let path = std::env::temp_dir().join(format!("dragon_walker_nan_{}.yaml", std::process::id()));
        std::fs::write(&path, yaml).unwrap();
        assert!(Config::load(&path).is_err());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = default_config();
        assert!(config.validate().is_ok());
        assert!(config.get_preset("twisted").is_some());
    }
}
