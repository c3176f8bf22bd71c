//! # `tiledmap_export`
//!
//! Exports Tiled maps into a textured mesh (Wavefront OBJ text) and merged
//! per-layer collision polygons.
//!
//! This is the facade over the `tiledmap_export_*` crates:
//!
//! - [`core`]: map model, flip transforms, animation expansion, config and diagnostics
//! - [`mesh`]: face generation and the deduplicating mesh assembler
//! - [`collision`]: polygon union of tile collision shapes and object groups
//! - `assets` (feature `assets`, default): adapter from maps parsed by the `tiled` crate
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tiledmap_export::prelude::*;
//!
//! let config = ExportConfig::default();
//! let export = export_tmx("assets/maps/level1.tmx", &config, &LogDiagnostics).unwrap();
//! std::fs::write("level1.obj", &export.mesh).unwrap();
//! for layer in &export.collision {
//!     println!("{}: {} polygons", layer.name, layer.closed.len());
//! }
//! ```

mod error;
mod export;

pub use tiledmap_export_collision as collision;
pub use tiledmap_export_core as core;
pub use tiledmap_export_mesh as mesh;

#[cfg(feature = "assets")]
pub use tiledmap_export_assets as assets;

pub use error::Error;
pub use export::{MapExport, export_map};

#[cfg(feature = "assets")]
pub use export::export_tmx;

/// Unified prelude for `tiledmap_export`
pub mod prelude {
    pub use crate::{Error, MapExport, export_map};

    #[cfg(feature = "assets")]
    pub use crate::export_tmx;

    pub use tiledmap_export_collision::prelude::*;
    pub use tiledmap_export_core::prelude::*;
    pub use tiledmap_export_mesh::{IndexedFace, MeshAssembly, MeshGroup};
}
