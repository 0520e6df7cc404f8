//! Engine configuration.
//!
//! Board-level tunables (stroke defaults, zoom limits, grid spacing, handle
//! geometry, persistence debounce) are carried in an [`EngineConfig`] that is
//! handed to the board at construction time.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Tunable constants for the geometry engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Stroke width of new paths and shapes at 100% zoom.
    pub default_stroke_width: f64,
    /// Font size of new text at 100% zoom.
    pub default_font_size: f64,
    /// Spacing of the background grid in canvas units.
    pub grid_size: f64,
    /// Smallest viewport scale.
    pub min_scale: f64,
    /// Largest viewport scale.
    pub max_scale: f64,
    /// Gap between the selection outline and the resize handles.
    pub handle_box_padding: f64,
    /// Touch radius of a resize handle, in screen pixels.
    pub handle_hit_radius: f64,
    /// Lower bound of the handle touch radius in canvas units.
    pub handle_hit_floor: f64,
    /// Visible radius of a resize handle dot, in screen pixels.
    pub handle_dot_radius: f64,
    /// Smallest box extent a resize drag can produce.
    pub min_resize_extent: f64,
    /// Quiet period before a pan/zoom change is written.
    pub viewport_save_debounce_ms: u64,
    /// Content used when text is committed blank.
    pub placeholder_text: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_stroke_width: 8.0,
            default_font_size: 24.0,
            grid_size: 200.0,
            min_scale: 0.1,
            max_scale: 10.0,
            handle_box_padding: 24.0,
            handle_hit_radius: 40.0,
            handle_hit_floor: 8.0,
            handle_dot_radius: 16.0,
            min_resize_extent: 4.0,
            viewport_save_debounce_ms: 500,
            placeholder_text: "Text".to_string(),
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from JSON. Missing keys take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|e| {
            ConfigError::Io(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config = Self::from_json_str(&json)?;
        log::info!("Loaded engine configuration from {}", path.display());
        Ok(config)
    }

    /// Reject values the engine cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("default_stroke_width", self.default_stroke_width),
            ("default_font_size", self.default_font_size),
            ("grid_size", self.grid_size),
            ("min_scale", self.min_scale),
            ("max_scale", self.max_scale),
            ("handle_hit_radius", self.handle_hit_radius),
            ("min_resize_extent", self.min_resize_extent),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                log::warn!("Rejected configuration value {} = {}", name, value);
                return Err(ConfigError::Invalid(format!(
                    "{} must be positive and finite",
                    name
                )));
            }
        }
        if self.min_scale > self.max_scale {
            return Err(ConfigError::Invalid(format!(
                "min_scale {} exceeds max_scale {}",
                self.min_scale, self.max_scale
            )));
        }
        Ok(())
    }

    /// Debounce interval for viewport persistence.
    pub fn viewport_save_debounce(&self) -> Duration {
        Duration::from_millis(self.viewport_save_debounce_ms)
    }

    /// Handle touch radius in canvas units at the given viewport scale.
    pub fn handle_hit_radius_at(&self, scale: f64) -> f64 {
        (self.handle_hit_radius / scale.max(0.1)).max(self.handle_hit_floor)
    }

    /// Handle dot radius in canvas units at the given viewport scale.
    pub fn handle_dot_radius_at(&self, scale: f64) -> f64 {
        (self.handle_dot_radius / scale.max(0.1)).max(2.0)
    }
}
