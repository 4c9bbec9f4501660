use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::geometry::Direction;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub scroller: ScrollerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Tuning for a single smooth scroller.
///
/// Every field may be changed on a live scroller; the new value is picked up
/// by the next wheel event or animation frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrollerConfig {
    /// Axes the scroller drives: "x", "y" or "xy"
    #[serde(default)]
    pub direction: Direction,
    /// Distance multiplier applied to each normalized wheel notch
    #[serde(default = "default_velocity")]
    pub velocity: f64,
    /// Divisor of the remaining distance per frame (higher = slower)
    #[serde(default = "default_friction")]
    pub friction: f64,
    /// Multiplier applied to the normalized wheel delta
    #[serde(default = "default_wheel_delta_scale")]
    pub wheel_delta_scale: f64,
    /// Block pointer events on iframes while animating
    #[serde(default = "default_true")]
    pub disable_iframes: bool,
}

impl Default for ScrollerConfig {
    fn default() -> Self {
        Self {
            direction: Direction::default(),
            velocity: default_velocity(),
            friction: default_friction(),
            wheel_delta_scale: default_wheel_delta_scale(),
            disable_iframes: default_true(),
        }
    }
}

impl ScrollerConfig {
    pub fn with_direction(direction: Direction) -> Self {
        Self {
            direction,
            ..Default::default()
        }
    }

    /// Reject tunables that cannot drive a convergent animation.
    pub fn validate(&self) -> crate::Result<()> {
        for (name, value) in [
            ("velocity", self.velocity),
            ("wheel_delta_scale", self.wheel_delta_scale),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(crate::Error::Config(format!(
                    "{name} must be a finite, non-negative number (got {value})"
                )));
            }
        }
        if !self.friction.is_finite() || self.friction < 1.0 {
            return Err(crate::Error::Config(format!(
                "friction must be a finite number >= 1 (got {})",
                self.friction
            )));
        }
        Ok(())
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_velocity() -> f64 {
    30.0
}

fn default_friction() -> f64 {
    10.0
}

fn default_wheel_delta_scale() -> f64 {
    3.75
}

impl AppConfig {
    /// Load configuration from `path`, defaulting when the file is absent
    pub fn load_from(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::from_toml(&content)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_toml(content: &str) -> crate::Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| crate::Error::Config(e.to_string()))?;
        config.scroller.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> crate::Result<String> {
        toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))
    }

    pub fn save_to(&self, path: &Path) -> crate::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, self.to_toml()?)?;

        Ok(())
    }

    /// Get the configuration file path
    /// Always uses ~/.config/glide/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("glide")
            .join("config.toml")
    }
}
