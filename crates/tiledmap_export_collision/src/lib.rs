//! # `tiledmap_export_collision`
//!
//! Merges the collision shapes authored on tiles (and placed in object groups) into
//! per-layer polygon sets.
//!
//! The union itself is a port ([`PolygonUnion`]); [`GeoUnion`] implements it with the
//! `geo` crate. Coordinates reach the union through a caller-supplied transform into
//! integer space, by default [`FixedPoint`] with the configured scale.
//!
//! ## Example
//!
//! ```rust
//! use tiledmap_export_collision::prelude::*;
//! use tiledmap_export_core::prelude::*;
//!
//! let mut group = ObjectGroup::new("Triggers");
//! group.objects.push(
//!     Shape::new(ShapeKind::Rectangle { width: 8.0, height: 8.0 }).with_position(4.0, 4.0),
//! );
//!
//! let merged = CollisionMerger::new(&GeoUnion, &LogDiagnostics).merge_object_group(&group);
//! let fixed = FixedPoint::default();
//! let outline = fixed.path_to_world(&merged.closed[0]);
//! assert_eq!(outline.len(), 4);
//! ```

pub mod fixed;
pub mod merger;
pub mod preview;
pub mod union;

pub mod prelude {
    //! Common imports for `tiledmap_export_collision` users.

    pub use crate::fixed::{FixedPoint, IntPath, IntPoint};
    pub use crate::merger::{
        CollisionMerger, MergeProgress, MergedLayerGeometry, SkipReason, SkippedShape,
    };
    pub use crate::preview::preview_size;
    pub use crate::union::{GeoUnion, PolygonUnion};
}

pub use fixed::{FixedPoint, IntPath, IntPoint};
pub use merger::{CollisionMerger, MergedLayerGeometry};
pub use union::{GeoUnion, PolygonUnion};

use tiledmap_export_core::{Diagnostics, ExportConfig, ExportError, Map, model::Layer};

/// Merge one layer with the default union and the config's fixed-point transform.
pub fn merge_layer(
    map: &Map,
    layer: &Layer,
    config: &ExportConfig,
    diagnostics: &dyn Diagnostics,
) -> Result<MergedLayerGeometry, ExportError> {
    CollisionMerger::from_config(config, &GeoUnion, diagnostics).merge_layer(map, layer)
}
