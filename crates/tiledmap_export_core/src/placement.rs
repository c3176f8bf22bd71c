//! Where a tile instance lands in world pixel space.

use bevy::math::Vec2;

use crate::geometry::Flip;
use crate::model::{Layer, Map, Tile};

/// Rendered footprint of one tile in one cell, in Y-down world pixels.
///
/// Tiles taller than the map's cell height are aligned to the bottom of their cell,
/// and a diagonal flip swaps the footprint's width and height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TilePlacement {
    /// Top-left corner of the footprint
    pub origin: Vec2,
    /// Footprint size after the diagonal flip
    pub size: Vec2,
}

impl TilePlacement {
    pub fn new(map: &Map, layer: &Layer, x: u32, y: u32, tile: &Tile, flip: Flip) -> Self {
        let size = if flip.diagonal {
            Vec2::new(tile.height as f32, tile.width as f32)
        } else {
            tile.size()
        };

        let cell = Vec2::new(
            (x * map.tile_width) as f32,
            (y * map.tile_height) as f32,
        );
        let bottom_align = Vec2::new(0.0, map.tile_height as f32 - size.y);

        Self {
            origin: cell + bottom_align + layer.offset,
            size,
        }
    }

    /// Corners in `[top-left, top-right, bottom-right, bottom-left]` order.
    pub fn corners(&self) -> [Vec2; 4] {
        let Vec2 { x, y } = self.origin;
        let right = x + self.size.x;
        let bottom = y + self.size.y;
        [
            Vec2::new(x, y),
            Vec2::new(right, y),
            Vec2::new(right, bottom),
            Vec2::new(x, bottom),
        ]
    }

    pub fn center(&self) -> Vec2 {
        self.origin + self.size / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regular_tile_fills_its_cell() {
        let map = Map::new(4, 4, 16, 16);
        let layer = Layer::new("ground", 4, 4);
        let tile = Tile::new(1, 16, 16, "terrain.png");

        let placement = TilePlacement::new(&map, &layer, 2, 1, &tile, Flip::NONE);

        assert_eq!(placement.origin, Vec2::new(32.0, 16.0));
        assert_eq!(placement.size, Vec2::new(16.0, 16.0));
        assert_eq!(placement.corners()[2], Vec2::new(48.0, 32.0));
    }

    #[test]
    fn test_tall_tile_aligns_to_cell_bottom() {
        let map = Map::new(4, 4, 16, 16);
        let layer = Layer::new("trees", 4, 4);
        let tile = Tile::new(1, 16, 48, "trees.png");

        let placement = TilePlacement::new(&map, &layer, 0, 2, &tile, Flip::NONE);

        assert_eq!(placement.origin, Vec2::new(0.0, 0.0));
        // Bottom edge matches the bottom of cell row 2
        assert_eq!(placement.corners()[3], Vec2::new(0.0, 48.0));
    }

    #[test]
    fn test_diagonal_flip_swaps_footprint() {
        let map = Map::new(4, 4, 16, 16);
        let mut layer = Layer::new("trees", 4, 4);
        layer.offset = Vec2::new(4.0, 2.0);
        let tile = Tile::new(1, 16, 32, "trees.png");

        let placement = TilePlacement::new(&map, &layer, 1, 1, &tile, Flip::new(true, false, false));

        assert_eq!(placement.size, Vec2::new(32.0, 16.0));
        assert_eq!(placement.origin, Vec2::new(20.0, 18.0));
        assert_eq!(placement.center(), Vec2::new(36.0, 26.0));
    }
}
