//! In-memory map model.
//!
//! The model is produced by an external parser (see `tiledmap_export_assets` for the
//! `tiled` crate adapter) and is read-only for the duration of an export.

use std::collections::HashMap;

use bevy::math::Vec2;

use crate::error::ExportError;
use crate::geometry::Flip;

/// Raw cell bit marking a horizontal flip.
pub const FLIPPED_HORIZONTALLY: u32 = 0x8000_0000;
/// Raw cell bit marking a vertical flip.
pub const FLIPPED_VERTICALLY: u32 = 0x4000_0000;
/// Raw cell bit marking a diagonal flip (X/Y swap across the main diagonal).
pub const FLIPPED_DIAGONALLY: u32 = 0x2000_0000;
/// Hexagonal 120° rotation bit. Not supported by the exporters, masked out of the id.
pub const ROTATED_HEXAGONAL_120: u32 = 0x1000_0000;

const GID_MASK: u32 =
    !(FLIPPED_HORIZONTALLY | FLIPPED_VERTICALLY | FLIPPED_DIAGONALLY | ROTATED_HEXAGONAL_120);

/// A decoded cell value: global tile id plus the three flip flags.
///
/// Id 0 is the empty cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TileRef {
    pub gid: u32,
    pub flip: Flip,
}

impl TileRef {
    /// Decode a raw cell value.
    pub fn from_raw(raw: u32) -> Self {
        Self {
            gid: raw & GID_MASK,
            flip: Flip {
                diagonal: raw & FLIPPED_DIAGONALLY != 0,
                horizontal: raw & FLIPPED_HORIZONTALLY != 0,
                vertical: raw & FLIPPED_VERTICALLY != 0,
            },
        }
    }

    /// Encode back into a raw cell value.
    pub fn to_raw(self) -> u32 {
        let mut raw = self.gid & GID_MASK;
        if self.flip.diagonal {
            raw |= FLIPPED_DIAGONALLY;
        }
        if self.flip.horizontal {
            raw |= FLIPPED_HORIZONTALLY;
        }
        if self.flip.vertical {
            raw |= FLIPPED_VERTICALLY;
        }
        raw
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.gid == 0
    }
}

/// Cell visiting direction per axis, derived from Tiled's render order.
///
/// `x`/`y` are `1` (increasing) or `-1` (decreasing).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawOrder {
    pub x: i32,
    pub y: i32,
}

impl Default for DrawOrder {
    /// Tiled's default `right-down` order.
    fn default() -> Self {
        Self { x: 1, y: 1 }
    }
}

impl DrawOrder {
    /// Parse one of Tiled's render order names.
    pub fn from_render_order(name: &str) -> Option<Self> {
        match name {
            "right-down" => Some(Self { x: 1, y: 1 }),
            "right-up" => Some(Self { x: 1, y: -1 }),
            "left-down" => Some(Self { x: -1, y: 1 }),
            "left-up" => Some(Self { x: -1, y: -1 }),
            _ => None,
        }
    }
}

/// Pixel dimensions of a source image referenced by tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
}

/// The tile map being exported.
#[derive(Debug, Clone)]
pub struct Map {
    /// Map width in cells
    pub width: u32,
    /// Map height in cells
    pub height: u32,
    /// Nominal cell width in pixels
    pub tile_width: u32,
    /// Nominal cell height in pixels
    pub tile_height: u32,
    pub draw_order: DrawOrder,
    /// Tile layers in authored (bottom to top) order
    pub layers: Vec<Layer>,
    pub object_groups: Vec<ObjectGroup>,
    /// Tile registry keyed by global tile id
    pub tiles: HashMap<u32, Tile>,
    /// Source images keyed by the name tiles reference them with
    pub images: HashMap<String, ImageInfo>,
}

impl Map {
    pub fn new(width: u32, height: u32, tile_width: u32, tile_height: u32) -> Self {
        Self {
            width,
            height,
            tile_width,
            tile_height,
            draw_order: DrawOrder::default(),
            layers: Vec::new(),
            object_groups: Vec::new(),
            tiles: HashMap::new(),
            images: HashMap::new(),
        }
    }

    /// Resolve a global tile id.
    pub fn tile(&self, gid: u32) -> Result<&Tile, ExportError> {
        self.tiles.get(&gid).ok_or(ExportError::UnknownTile { gid })
    }

    /// Resolve the source image a tile samples from.
    pub fn tile_image(&self, tile: &Tile) -> Result<&ImageInfo, ExportError> {
        self.images
            .get(&tile.image)
            .ok_or_else(|| ExportError::UnknownImage {
                gid: tile.gid,
                image: tile.image.clone(),
            })
    }

    pub fn insert_tile(&mut self, tile: Tile) {
        self.tiles.insert(tile.gid, tile);
    }

    pub fn insert_image(&mut self, name: impl Into<String>, width: u32, height: u32) {
        self.images.insert(name.into(), ImageInfo { width, height });
    }

    pub fn push_layer(&mut self, layer: Layer) {
        self.layers.push(layer);
    }

    /// Cell coordinates of a `width`×`height` grid in this map's draw order.
    ///
    /// Rows are visited in the vertical direction, cells within a row in the
    /// horizontal direction.
    pub fn cells_in_draw_order(
        &self,
        width: u32,
        height: u32,
    ) -> impl Iterator<Item = (u32, u32)> + use<> {
        let order = self.draw_order;
        (0..height).flat_map(move |row| {
            let y = if order.y < 0 { height - 1 - row } else { row };
            (0..width).map(move |column| {
                let x = if order.x < 0 { width - 1 - column } else { column };
                (x, y)
            })
        })
    }
}

/// Which exports a layer is excluded from (the `ignore` layer property).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayerIgnore {
    /// Layer takes part in every export
    #[default]
    Nothing,
    /// Layer is skipped entirely
    Everything,
    /// Layer produces mesh faces but no collision
    Collision,
    /// Layer produces collision but no mesh faces
    Visual,
}

/// A tile layer: a grid of raw cell values.
#[derive(Debug, Clone)]
pub struct Layer {
    pub name: String,
    pub visible: bool,
    /// Excluded from the mesh while still contributing collision
    pub collision_only: bool,
    pub ignore: LayerIgnore,
    /// Pixel offset applied to everything on the layer
    pub offset: Vec2,
    pub width: u32,
    pub height: u32,
    /// Flattened grid of raw cell values: index = y * width + x
    pub cells: Vec<u32>,
}

impl Layer {
    /// Create an empty, visible layer.
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            name: name.into(),
            visible: true,
            collision_only: false,
            ignore: LayerIgnore::Nothing,
            offset: Vec2::ZERO,
            width,
            height,
            cells: vec![0; (width * height) as usize],
        }
    }

    /// Set the raw cell value at a position (out of bounds is ignored).
    pub fn set(&mut self, x: u32, y: u32, raw: u32) {
        if x < self.width && y < self.height {
            let index = (y * self.width + x) as usize;
            if let Some(slot) = self.cells.get_mut(index) {
                *slot = raw;
            }
        }
    }

    /// Decoded cell at a position, `None` when empty or out of bounds.
    pub fn get(&self, x: u32, y: u32) -> Option<TileRef> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let raw = *self.cells.get((y * self.width + x) as usize)?;
        let tile = TileRef::from_raw(raw);
        (!tile.is_empty()).then_some(tile)
    }

    /// Check the cell grid matches the declared dimensions.
    pub fn validate(&self) -> Result<(), ExportError> {
        if self.cells.len() == (self.width * self.height) as usize {
            Ok(())
        } else {
            Err(ExportError::InvalidCellGrid {
                layer: self.name.clone(),
                width: self.width,
                height: self.height,
                actual: self.cells.len(),
            })
        }
    }

    /// Whether the layer's cells become mesh faces.
    pub fn exports_mesh(&self) -> bool {
        self.visible
            && !self.collision_only
            && !matches!(self.ignore, LayerIgnore::Everything | LayerIgnore::Visual)
    }

    /// Whether the layer's tiles contribute collision geometry.
    pub fn exports_collision(&self) -> bool {
        self.visible && !matches!(self.ignore, LayerIgnore::Everything | LayerIgnore::Collision)
    }
}

/// A tile definition from a tileset, keyed by its global id.
#[derive(Debug, Clone)]
pub struct Tile {
    pub gid: u32,
    /// Pixel width (may exceed the map's cell width)
    pub width: u32,
    /// Pixel height (may exceed the map's cell height - "tall tiles")
    pub height: u32,
    /// Name of the source image in [`Map::images`]
    pub image: String,
    /// Pixel location of the tile's top-left corner within the image
    pub image_x: u32,
    pub image_y: u32,
    pub animation: Option<Animation>,
    /// Collision shapes authored on the tile, in tile-local pixels
    pub collision: Vec<Shape>,
}

impl Tile {
    pub fn new(gid: u32, width: u32, height: u32, image: impl Into<String>) -> Self {
        Self {
            gid,
            width,
            height,
            image: image.into(),
            image_x: 0,
            image_y: 0,
            animation: None,
            collision: Vec::new(),
        }
    }

    /// Set the tile's pixel location within its source image.
    pub fn at(mut self, image_x: u32, image_y: u32) -> Self {
        self.image_x = image_x;
        self.image_y = image_y;
        self
    }

    pub fn with_animation(mut self, animation: Animation) -> Self {
        self.animation = Some(animation);
        self
    }

    pub fn with_collision(mut self, shapes: Vec<Shape>) -> Self {
        self.collision = shapes;
        self
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }
}

/// Frame sequence of an animated tile.
#[derive(Debug, Clone, Default)]
pub struct Animation {
    pub frames: Vec<Frame>,
}

/// One animation frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    /// Global id of the tile shown during this frame
    pub gid: u32,
    /// Export-wide unique, increasing identifier; only used to derive depth
    pub unique_id: u32,
    pub duration_ms: u32,
}

/// Geometry kinds a collision shape or map object can take.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeKind {
    /// Closed point list
    Polygon { points: Vec<Vec2> },
    /// Open point list
    Polyline { points: Vec<Vec2> },
    /// Axis-aligned rectangle anchored at its top-left corner
    Rectangle { width: f32, height: f32 },
    /// Ellipse anchored at the top-left of its bounds; only circles can be merged
    Ellipse { width: f32, height: f32 },
    /// The tile's own bounds, anchored at its bottom-left corner
    Tile { width: f32, height: f32 },
    /// Anything the exporters cannot interpret (points, text, ...)
    Unsupported { kind: String },
}

impl ShapeKind {
    pub fn name(&self) -> &str {
        match self {
            ShapeKind::Polygon { .. } => "polygon",
            ShapeKind::Polyline { .. } => "polyline",
            ShapeKind::Rectangle { .. } => "rectangle",
            ShapeKind::Ellipse { .. } => "ellipse",
            ShapeKind::Tile { .. } => "tile",
            ShapeKind::Unsupported { kind } => kind,
        }
    }
}

/// A positioned, rotated shape.
///
/// `position` and `rotation` (degrees, clockwise on screen) are relative to the
/// owning tile's top-left corner or the owning object group's origin.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub name: String,
    pub position: Vec2,
    pub rotation: f32,
    pub kind: ShapeKind,
}

impl Shape {
    pub fn new(kind: ShapeKind) -> Self {
        Self {
            name: String::new(),
            position: Vec2::ZERO,
            rotation: 0.0,
            kind,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.position = Vec2::new(x, y);
        self
    }

    pub fn with_rotation(mut self, degrees: f32) -> Self {
        self.rotation = degrees;
        self
    }

    /// Human readable label used in diagnostics.
    pub fn label(&self) -> String {
        if self.name.is_empty() {
            format!("unnamed {}", self.kind.name())
        } else {
            format!("{} `{}`", self.kind.name(), self.name)
        }
    }
}

/// An object layer.
#[derive(Debug, Clone)]
pub struct ObjectGroup {
    pub name: String,
    pub visible: bool,
    pub offset: Vec2,
    /// Objects positioned in map pixel space
    pub objects: Vec<Shape>,
}

impl ObjectGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visible: true,
            offset: Vec2::ZERO,
            objects: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_ref_decodes_flip_bits() {
        let raw = 7 | FLIPPED_HORIZONTALLY | FLIPPED_DIAGONALLY;
        let tile = TileRef::from_raw(raw);

        assert_eq!(tile.gid, 7);
        assert!(tile.flip.diagonal);
        assert!(tile.flip.horizontal);
        assert!(!tile.flip.vertical);
        assert_eq!(tile.to_raw(), raw);
    }

    #[test]
    fn test_tile_ref_masks_hexagonal_bit() {
        let tile = TileRef::from_raw(3 | ROTATED_HEXAGONAL_120);
        assert_eq!(tile.gid, 3);
        assert_eq!(tile.flip, Flip::NONE);
    }

    #[test]
    fn test_layer_get_skips_empty_and_out_of_bounds() {
        let mut layer = Layer::new("ground", 2, 2);
        layer.set(1, 0, 5);
        layer.set(9, 9, 5);

        assert_eq!(layer.get(1, 0).map(|t| t.gid), Some(5));
        assert!(layer.get(0, 0).is_none());
        assert!(layer.get(2, 0).is_none());
    }

    #[test]
    fn test_layer_export_filters() {
        let mut layer = Layer::new("walls", 1, 1);
        assert!(layer.exports_mesh());
        assert!(layer.exports_collision());

        layer.collision_only = true;
        assert!(!layer.exports_mesh());
        assert!(layer.exports_collision());

        layer.collision_only = false;
        layer.ignore = LayerIgnore::Collision;
        assert!(layer.exports_mesh());
        assert!(!layer.exports_collision());

        layer.ignore = LayerIgnore::Nothing;
        layer.visible = false;
        assert!(!layer.exports_mesh());
        assert!(!layer.exports_collision());
    }

    #[test]
    fn test_cells_in_draw_order() {
        let mut map = Map::new(2, 2, 16, 16);
        let right_down: Vec<_> = map.cells_in_draw_order(2, 2).collect();
        assert_eq!(right_down, vec![(0, 0), (1, 0), (0, 1), (1, 1)]);

        map.draw_order = DrawOrder::from_render_order("left-up").unwrap();
        let left_up: Vec<_> = map.cells_in_draw_order(2, 2).collect();
        assert_eq!(left_up, vec![(1, 1), (0, 1), (1, 0), (0, 0)]);
    }

    #[test]
    fn test_layer_validate_rejects_short_grid() {
        let mut layer = Layer::new("ground", 2, 2);
        assert!(layer.validate().is_ok());

        layer.cells.pop();
        assert!(matches!(
            layer.validate(),
            Err(ExportError::InvalidCellGrid { actual: 3, .. })
        ));
    }

    #[test]
    fn test_unknown_tile_is_an_error() {
        let map = Map::new(1, 1, 16, 16);
        assert!(matches!(
            map.tile(42),
            Err(ExportError::UnknownTile { gid: 42 })
        ));
    }
}
