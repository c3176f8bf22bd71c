//! # `tiledmap_export_core`
//!
//! Shared backbone for `tiledmap_export`. Holds the in-memory map model and the
//! primitives both exporters build on.
//!
//! **This crate does NOT produce meshes or colliders** - those live in
//! `tiledmap_export_mesh` and `tiledmap_export_collision`, which consume the types
//! defined here.
//!
//! ## What this crate provides
//!
//! 1. **Map model**: [`Map`], [`Layer`], [`Tile`], [`Shape`] and object groups, already
//!    validated by whichever parser produced them
//! 2. **Flip transforms**: the diagonal-first and diagonal-last flip compositions
//! 3. **Animation expansion**: one tile reference into depth-ordered [`TileFrame`]s
//! 4. **Placement**: cell origin, tall-tile bottom alignment and layer offsets
//! 5. **Ambient plumbing**: [`ExportConfig`], [`ExportError`] and the [`Diagnostics`] sink
//!
//! ## Example
//!
//! ```rust
//! use tiledmap_export_core::prelude::*;
//!
//! let mut map = Map::new(1, 1, 16, 16);
//! map.insert_image("terrain.png", 64, 64);
//! map.insert_tile(Tile::new(1, 16, 16, "terrain.png"));
//!
//! let tile = map.tile(1).unwrap();
//! let frames: Vec<_> = expand_frames(&map, tile).collect::<Result<_, _>>().unwrap();
//! assert_eq!(frames.len(), 1);
//! assert_eq!(frames[0].depth, 0);
//! ```

pub mod animation;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod geometry;
pub mod model;
pub mod placement;
pub mod properties;

pub mod prelude {
    //! Common imports for `tiledmap_export_core` users.

    pub use crate::animation::{FrameIdAllocator, TileFrame, TileFrames, expand_frames};
    pub use crate::config::{ConfigError, ExportConfig};
    pub use crate::diagnostics::{
        CollectedDiagnostics, Diagnostic, DiagnosticLevel, Diagnostics, LogDiagnostics,
    };
    pub use crate::error::ExportError;
    pub use crate::geometry::{
        Flip, FlipOrder, flip_points, flip_points_diagonal_first, rotate_points, translate_points,
    };
    pub use crate::model::{
        Animation, DrawOrder, Frame, ImageInfo, Layer, LayerIgnore, Map, ObjectGroup, Shape,
        ShapeKind, Tile, TileRef,
    };
    pub use crate::placement::TilePlacement;
}

// Re-export the most used types at crate root for convenience
pub use config::ExportConfig;
pub use diagnostics::Diagnostics;
pub use error::ExportError;
pub use model::Map;
