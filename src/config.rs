//! Chart configuration.
//!
//! [`SunburstConfig`] carries every tunable the view controller and the
//! host UI read: how many rings are drawn at once, how long a drill-down
//! animation runs, label/opacity thresholds and the data-side defaults
//! (measure field, root label).

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SunburstError};

/// Canvas edge length the default ring radius is derived from.
pub const DEFAULT_CANVAS_SIZE: f32 = 800.0;

/// Name of the numeric column summed into node values.
pub const DEFAULT_MEASURE_FIELD: &str = "Total";

/// Root label used when the host does not supply one.
pub const DEFAULT_ROOT_LABEL: &str = "ROOT";

/// Upper bound on rings drawn around the hub.
pub const MAX_VISIBLE_LAYERS: u32 = 64;

/// Ring radius that fits `layers` rings plus the hub into a square canvas.
pub fn ring_radius_for(canvas_size: f32, layers: u32) -> f32 {
    canvas_size / (2.0 + 2.0 * layers as f32)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SunburstConfig {
    /// Number of rings drawn around the hub.
    pub max_visible_layers: u32,
    /// Drill-down animation length in milliseconds.
    pub transition_ms: u64,
    /// Minimum angular × radial span for a label to be shown.
    pub label_area_threshold: f64,
    /// Opacity lost per ring away from the focus.
    pub opacity_step: f32,
    /// Upper bound of the gap between adjacent arcs (radians).
    pub max_pad_angle: f64,
    /// Pixel width of one ring.
    pub ring_radius: f32,
    pub measure_field: String,
    pub root_label: String,
}

impl Default for SunburstConfig {
    fn default() -> Self {
        Self {
            max_visible_layers: 3,
            transition_ms: 750,
            label_area_threshold: 0.03,
            opacity_step: 0.2,
            max_pad_angle: 0.005,
            ring_radius: ring_radius_for(DEFAULT_CANVAS_SIZE, 3),
            measure_field: DEFAULT_MEASURE_FIELD.to_string(),
            root_label: DEFAULT_ROOT_LABEL.to_string(),
        }
    }
}

impl SunburstConfig {
    /// Load a JSON config file. Missing keys fall back to defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        log::info!("Loaded config from {}", path.as_ref().display());
        Ok(config)
    }

    pub fn transition(&self) -> Duration {
        Duration::from_millis(self.transition_ms)
    }

    /// Set the number of visible rings and refit the ring radius to the default canvas.
    #[must_use]
    pub fn with_max_visible_layers(mut self, layers: u32) -> Self {
        self.max_visible_layers = layers;
        self.ring_radius = ring_radius_for(DEFAULT_CANVAS_SIZE, layers);
        self
    }

    #[must_use]
    pub const fn with_transition_ms(mut self, ms: u64) -> Self {
        self.transition_ms = ms;
        self
    }

    #[must_use]
    pub const fn with_label_area_threshold(mut self, threshold: f64) -> Self {
        self.label_area_threshold = threshold;
        self
    }

    #[must_use]
    pub const fn with_ring_radius(mut self, radius: f32) -> Self {
        self.ring_radius = radius;
        self
    }

    #[must_use]
    pub fn with_measure_field(mut self, field: impl Into<String>) -> Self {
        self.measure_field = field.into();
        self
    }

    #[must_use]
    pub fn with_root_label(mut self, label: impl Into<String>) -> Self {
        self.root_label = label.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_visible_layers == 0 {
            return Err(SunburstError::InvalidConfig(
                "max_visible_layers must be at least 1".into(),
            ));
        }
        if self.max_visible_layers > MAX_VISIBLE_LAYERS {
            return Err(SunburstError::InvalidConfig(format!(
                "max_visible_layers must be at most {}, got {}",
                MAX_VISIBLE_LAYERS, self.max_visible_layers
            )));
        }
        if !self.max_pad_angle.is_finite() || self.max_pad_angle < 0.0 {
            return Err(SunburstError::InvalidConfig(format!(
                "max_pad_angle must be non-negative, got {}",
                self.max_pad_angle
            )));
        }
        if !self.ring_radius.is_finite() || self.ring_radius <= 0.0 {
            return Err(SunburstError::InvalidConfig(format!(
                "ring_radius must be positive, got {}",
                self.ring_radius
            )));
        }
        if !self.label_area_threshold.is_finite() || self.label_area_threshold < 0.0 {
            return Err(SunburstError::InvalidConfig(format!(
                "label_area_threshold must be non-negative, got {}",
                self.label_area_threshold
            )));
        }
        if !self.opacity_step.is_finite() || self.opacity_step < 0.0 {
            return Err(SunburstError::InvalidConfig(format!(
                "opacity_step must be non-negative, got {}",
                self.opacity_step
            )));
        }
        if self.measure_field.trim().is_empty() {
            return Err(SunburstError::InvalidConfig("measure_field is empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SunburstConfig::default();
        assert_eq!(config.max_visible_layers, 3);
        assert_eq!(config.transition(), Duration::from_millis(750));
        assert!((config.ring_radius - 100.0).abs() < 1e-6);
        assert_eq!(config.measure_field, "Total");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_layers_refit_radius() {
        let config = SunburstConfig::default().with_max_visible_layers(1);
        assert!((config.ring_radius - 200.0).abs() < 1e-6);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: SunburstConfig =
            serde_json::from_str(r#"{ "max_visible_layers": 5, "root_label": "All" }"#).unwrap();
        assert_eq!(config.max_visible_layers, 5);
        assert_eq!(config.root_label, "All");
        assert_eq!(config.transition_ms, 750);
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        let huge = SunburstConfig::default().with_max_visible_layers(u32::MAX);
        assert!(matches!(huge.validate(), Err(SunburstError::InvalidConfig(_))));
        assert!(SunburstConfig::default()
            .with_max_visible_layers(MAX_VISIBLE_LAYERS)
            .validate()
            .is_ok());

        let mut config = SunburstConfig::default();
        config.max_pad_angle = -0.1;
        assert!(config.validate().is_err());
        config.max_pad_angle = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_layers() {
        let mut config = SunburstConfig::default();
        config.max_visible_layers = 0;
        assert!(matches!(
            config.validate(),
            Err(SunburstError::InvalidConfig(_))
        ));
    }
}
