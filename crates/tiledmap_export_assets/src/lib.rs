//! # `tiledmap_export_assets`
//!
//! Boundary adapter from maps parsed by the [`tiled`] crate to the
//! `tiledmap_export_core` model.
//!
//! TMX/TSX parsing stays in `tiled`; this crate only assigns global tile ids, locates
//! atlas tiles, hands out animation frame ids, reads the `collision_only` and `ignore`
//! layer properties and flattens group layers.
//!
//! ## Example
//!
//! ```rust,no_run
//! use tiledmap_export_assets::load_map;
//! use tiledmap_export_core::prelude::*;
//!
//! let map = load_map("assets/maps/level1.tmx", &LogDiagnostics).unwrap();
//! println!("{} layers", map.layers.len());
//! ```

pub mod convert;

pub use convert::{ConvertError, convert_map, convert_object, load_map};
