//! Integer coordinate space the polygon union works in.

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};
use tiledmap_export_core::config::ExportConfig;

/// A point in the union's fixed-precision integer space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct IntPoint {
    pub x: i64,
    pub y: i64,
}

impl IntPoint {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

/// An ordered point list. Closed paths do not repeat their first point.
pub type IntPath = Vec<IntPoint>;

/// Uniform scale between world pixels and [`IntPoint`]s.
///
/// A larger scale keeps more sub-pixel precision and leaves less range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedPoint {
    pub scale: f32,
}

impl Default for FixedPoint {
    fn default() -> Self {
        Self::from_config(&ExportConfig::default())
    }
}

impl FixedPoint {
    pub const fn new(scale: f32) -> Self {
        Self { scale }
    }

    pub fn from_config(config: &ExportConfig) -> Self {
        Self::new(config.fixed_point_scale)
    }

    /// World pixels to integer space, rounding to the nearest step.
    pub fn to_fixed(&self, point: Vec2) -> IntPoint {
        let scale = f64::from(self.scale);
        IntPoint {
            x: (f64::from(point.x) * scale).round() as i64,
            y: (f64::from(point.y) * scale).round() as i64,
        }
    }

    /// Integer space back to world pixels.
    pub fn to_world(&self, point: IntPoint) -> Vec2 {
        let scale = f64::from(self.scale);
        Vec2::new((point.x as f64 / scale) as f32, (point.y as f64 / scale) as f32)
    }

    pub fn path_to_world(&self, path: &[IntPoint]) -> Vec<Vec2> {
        path.iter().map(|point| self.to_world(*point)).collect()
    }
}
