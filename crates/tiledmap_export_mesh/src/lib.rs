//! # `tiledmap_export_mesh`
//!
//! Turns the tile layers of a [`Map`](tiledmap_export_core::Map) into one textured
//! mesh and writes it as Wavefront OBJ text.
//!
//! Every non-empty cell of every mesh-exporting layer becomes one quad per animation
//! frame ([`face`]). Quads are deduplicated into shared vertex and texture
//! coordinate pools and grouped per layer and source image ([`assembler`]), then
//! written out ([`obj`]).
//!
//! ## Example
//!
//! ```rust
//! use tiledmap_export_core::prelude::*;
//! use tiledmap_export_mesh::MeshAssembly;
//!
//! let mut map = Map::new(2, 1, 16, 16);
//! map.insert_image("terrain.png", 32, 32);
//! map.insert_tile(Tile::new(1, 16, 16, "terrain.png"));
//! let mut layer = Layer::new("Ground", 2, 1);
//! layer.set(0, 0, 1);
//! layer.set(1, 0, 1);
//! map.push_layer(layer);
//!
//! let mesh = MeshAssembly::assemble(&map, &ExportConfig::default(), &LogDiagnostics).unwrap();
//! assert_eq!(mesh.vertices.len(), 6);
//! assert!(mesh.to_obj("terrain").contains("g Ground_terrain"));
//! ```

pub mod assembler;
pub mod face;
pub mod obj;

pub use assembler::{FACE_NORMAL, IndexedFace, MeshAssembly, MeshGroup};
pub use face::{Face, generate_face};
