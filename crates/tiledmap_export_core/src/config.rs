//! Export configuration.
//!
//! Passed explicitly into every export call; nothing is read from global settings.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::FlipOrder;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse export config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("texel_bias_constant must be positive, got {0}")]
    InvalidTexelBias(f32),

    #[error("fixed_point_scale must be positive, got {0}")]
    InvalidFixedPointScale(f32),

    #[error("circle_segments must be at least 3, got {0}")]
    InvalidCircleSegments(u32),
}

/// Configuration for one export.
///
/// # Example
///
/// ```rust
/// use tiledmap_export_core::ExportConfig;
///
/// let config = ExportConfig::from_json(r#"{ "texel_bias_constant": 4096.0 }"#).unwrap();
/// assert_eq!(config.texel_bias(), 1.0 / 4096.0);
/// assert_eq!(config.circle_segments, 16);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Texture coordinates are pulled inward by `1 / texel_bias_constant` (UV units)
    /// so neighbouring atlas tiles do not bleed into each other.
    pub texel_bias_constant: f32,

    /// Flip composition used to orient texture coordinates. The default,
    /// diagonal last, undoes Tiled's diagonal-first draw order.
    pub tex_coord_flip_order: FlipOrder,

    /// World pixels are multiplied by this before rounding to the integer space the
    /// polygon union works in.
    pub fixed_point_scale: f32,

    /// Number of segments used to approximate a circular ellipse for the union.
    pub circle_segments: u32,

    /// First comment line of the mesh text.
    pub mesh_header: String,

    /// Whether `export_map` runs the collision merger.
    pub export_collision: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            texel_bias_constant: 8192.0,
            tex_coord_flip_order: FlipOrder::DiagonalLast,
            fixed_point_scale: 16.0,
            circle_segments: 16,
            mesh_header: "Tile map mesh".to_string(),
            export_collision: true,
        }
    }
}

impl ExportConfig {
    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.texel_bias_constant.is_nan() || self.texel_bias_constant <= 0.0 {
            return Err(ConfigError::InvalidTexelBias(self.texel_bias_constant));
        }
        if self.fixed_point_scale.is_nan() || self.fixed_point_scale <= 0.0 {
            return Err(ConfigError::InvalidFixedPointScale(self.fixed_point_scale));
        }
        if self.circle_segments < 3 {
            return Err(ConfigError::InvalidCircleSegments(self.circle_segments));
        }
        Ok(())
    }

    /// Inward texture coordinate offset in UV units.
    #[inline]
    pub fn texel_bias(&self) -> f32 {
        1.0 / self.texel_bias_constant
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ExportConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.texel_bias(), 1.0 / 8192.0);
        assert_eq!(config.tex_coord_flip_order, FlipOrder::DiagonalLast);
    }

    #[test]
    fn test_flip_order_reads_from_json() {
        let config =
            ExportConfig::from_json(r#"{ "tex_coord_flip_order": "diagonal_first" }"#).unwrap();
        assert_eq!(config.tex_coord_flip_order, FlipOrder::DiagonalFirst);
    }

    #[test]
    fn test_json_round_trip_keeps_values() {
        let config = ExportConfig {
            circle_segments: 24,
            tex_coord_flip_order: FlipOrder::DiagonalFirst,
            export_collision: false,
            ..Default::default()
        };
        let parsed = ExportConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(matches!(
            ExportConfig::from_json(r#"{ "texel_bias_constant": 0.0 }"#),
            Err(ConfigError::InvalidTexelBias(_))
        ));
        assert!(matches!(
            ExportConfig::from_json(r#"{ "circle_segments": 2 }"#),
            Err(ConfigError::InvalidCircleSegments(2))
        ));
        assert!(matches!(
            ExportConfig::from_json("not json"),
            Err(ConfigError::Json(_))
        ));
    }
}
