//! Fatal export errors.
//!
//! These are configuration/data errors in the map model. Geometry that merely cannot
//! be merged is reported through [`Diagnostics`](crate::diagnostics::Diagnostics)
//! instead.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExportError {
    #[error("tile {gid} is not registered in the map")]
    UnknownTile { gid: u32 },

    #[error("animation of tile {owner} references unregistered tile {gid}")]
    UnknownFrameTile { owner: u32, gid: u32 },

    #[error("tile {gid} samples from image `{image}` which is not registered")]
    UnknownImage { gid: u32, image: String },

    #[error("invalid export config: {0}")]
    InvalidConfig(String),

    #[error("layer `{layer}` holds {actual} cells but declares {width}x{height}")]
    InvalidCellGrid {
        layer: String,
        width: u32,
        height: u32,
        actual: usize,
    },
}
