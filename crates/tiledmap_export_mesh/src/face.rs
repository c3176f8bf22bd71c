//! Face generation: one textured quad per map cell and animation frame.

use bevy::math::{Vec2, Vec3};
use tiledmap_export_core::animation::TileFrame;
use tiledmap_export_core::geometry::{Flip, FlipOrder};
use tiledmap_export_core::model::{ImageInfo, Layer, Map, Tile};
use tiledmap_export_core::placement::TilePlacement;

/// A textured quad in mesh space.
///
/// Vertices and texture coordinates are stored bottom-left, bottom-right, top-right,
/// top-left: counter-clockwise once the source Y-down pixels are turned Y-up.
#[derive(Debug, Clone, PartialEq)]
pub struct Face<'m> {
    pub layer: &'m str,
    /// Name of the source image the quad samples from
    pub image: &'m str,
    pub vertices: [Vec3; 4],
    pub tex_coords: [Vec2; 4],
}

/// Build the face for one frame of the tile in cell (`x`, `y`).
///
/// The quad covers the tile's rendered footprint (see [`TilePlacement`]); its Z is
/// the frame depth. Orientation is carried by the texture coordinates: the source
/// rectangle is flipped with `order`, then pulled inward by `texel_bias`.
/// [`FlipOrder::DiagonalLast`] undoes Tiled's diagonal-first draw order and is
/// what reproduces the editor's look.
pub fn generate_face<'m>(
    map: &Map,
    layer: &'m Layer,
    x: u32,
    y: u32,
    frame: TileFrame<'m>,
    flip: Flip,
    order: FlipOrder,
    image: &ImageInfo,
    texel_bias: f32,
) -> Face<'m> {
    let tile = frame.tile;
    let placement = TilePlacement::new(map, layer, x, y, tile, flip);
    let z = canonical(frame.depth as f32);

    let vertices = placement
        .corners()
        .map(|corner| Vec3::new(canonical(corner.x), canonical(-corner.y), z));
    let tex_coords = tex_coords(tile, flip, order, image, texel_bias);

    Face {
        layer: &layer.name,
        image: &tile.image,
        vertices: reversed(vertices),
        tex_coords: reversed(tex_coords),
    }
}

/// Normalized texture coordinates of a tile's source rectangle, in
/// `[top-left, top-right, bottom-right, bottom-left]` screen order.
fn tex_coords(
    tile: &Tile,
    flip: Flip,
    order: FlipOrder,
    image: &ImageInfo,
    texel_bias: f32,
) -> [Vec2; 4] {
    // Flip in unit space so non-square tiles stay inside their source rectangle.
    let mut corners = [
        Vec2::new(0.0, 0.0),
        Vec2::new(1.0, 0.0),
        Vec2::new(1.0, 1.0),
        Vec2::new(0.0, 1.0),
    ];
    order.apply(&mut corners, Vec2::splat(0.5), flip);

    let origin = Vec2::new(tile.image_x as f32, tile.image_y as f32);
    let size = tile.size();
    let image_size = Vec2::new(image.width as f32, image.height as f32);

    let uv = corners.map(|corner| {
        let pixel = origin + corner * size;
        Vec2::new(pixel.x / image_size.x, 1.0 - pixel.y / image_size.y)
    });

    apply_bias(uv, texel_bias)
}

/// Move every corner `bias` toward the quad's center on both axes.
///
/// The bias is capped at a quarter of the quad's extent per axis, so corners
/// never cross the center and the texture cannot invert.
fn apply_bias(uv: [Vec2; 4], bias: f32) -> [Vec2; 4] {
    let min = uv.iter().fold(Vec2::splat(f32::INFINITY), |acc, p| acc.min(*p));
    let max = uv.iter().fold(Vec2::splat(f32::NEG_INFINITY), |acc, p| acc.max(*p));
    let center = (min + max) / 2.0;
    let limit = (max - min) / 4.0;
    let bias = Vec2::new(bias.max(0.0).min(limit.x), bias.max(0.0).min(limit.y));

    uv.map(|p| {
        Vec2::new(
            canonical(toward(p.x, center.x, bias.x)),
            canonical(toward(p.y, center.y, bias.y)),
        )
    })
}

#[inline]
fn toward(value: f32, center: f32, bias: f32) -> f32 {
    if value < center {
        value + bias
    } else if value > center {
        value - bias
    } else {
        value
    }
}

/// Fold `-0.0` into `0.0` so equal coordinates share one bit pattern.
#[inline]
pub(crate) fn canonical(value: f32) -> f32 {
    value + 0.0
}

#[inline]
fn reversed<T: Copy>(corners: [T; 4]) -> [T; 4] {
    [corners[3], corners[2], corners[1], corners[0]]
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiledmap_export_core::animation::expand_frames;

    fn single_tile_map(tile: Tile, image_width: u32, image_height: u32) -> (Map, Layer) {
        let mut map = Map::new(1, 1, 16, 16);
        map.insert_image(tile.image.clone(), image_width, image_height);
        map.insert_tile(tile);
        let mut layer = Layer::new("ground", 1, 1);
        layer.set(0, 0, 1);
        (map, layer)
    }

    fn face_for(map: &Map, layer: &Layer, flip: Flip, bias: f32) -> [Vec2; 4] {
        face_with_order(map, layer, flip, FlipOrder::DiagonalLast, bias)
    }

    fn face_with_order(
        map: &Map,
        layer: &Layer,
        flip: Flip,
        order: FlipOrder,
        bias: f32,
    ) -> [Vec2; 4] {
        let tile = map.tile(1).unwrap();
        let frame = expand_frames(map, tile).next().unwrap().unwrap();
        let image = map.tile_image(tile).unwrap();
        generate_face(map, layer, 0, 0, frame, flip, order, image, bias).tex_coords
    }

    #[test]
    fn test_full_image_tile_stays_strictly_inside_unit_square() {
        let (map, layer) = single_tile_map(Tile::new(1, 16, 16, "single.png"), 16, 16);
        let bias = 1.0 / 8192.0;

        let tex_coords = face_for(&map, &layer, Flip::NONE, bias);

        for uv in tex_coords {
            assert!(uv.x > 0.0 && uv.x < 1.0, "u = {} on the edge", uv.x);
            assert!(uv.y > 0.0 && uv.y < 1.0, "v = {} on the edge", uv.y);
        }
    }

    #[test]
    fn test_vertices_are_counter_clockwise_in_mesh_space() {
        let (map, layer) = single_tile_map(Tile::new(1, 16, 16, "single.png"), 16, 16);
        let tile = map.tile(1).unwrap();
        let frame = expand_frames(&map, tile).next().unwrap().unwrap();
        let image = map.tile_image(tile).unwrap();

        let face = generate_face(
            &map,
            &layer,
            0,
            0,
            frame,
            Flip::NONE,
            FlipOrder::DiagonalLast,
            image,
            0.0,
        );

        assert_eq!(
            face.vertices,
            [
                Vec3::new(0.0, -16.0, 0.0),
                Vec3::new(16.0, -16.0, 0.0),
                Vec3::new(16.0, 0.0, 0.0),
                Vec3::new(0.0, 0.0, 0.0),
            ]
        );
        // Signed area of the XY projection is positive for CCW winding.
        let v = face.vertices;
        let area: f32 = (0..4)
            .map(|i| {
                let (a, b) = (v[i], v[(i + 1) % 4]);
                a.x * b.y - b.x * a.y
            })
            .sum();
        assert!(area > 0.0);
        // No negative zero leaks into the output.
        assert!(face.vertices.iter().all(|p| p.z.to_bits() == 0));
    }

    #[test]
    fn test_unflipped_tex_coords_follow_vertices() {
        let (map, layer) = single_tile_map(Tile::new(1, 16, 16, "atlas.png").at(16, 0), 32, 16);

        let tex_coords = face_for(&map, &layer, Flip::NONE, 0.0);

        // bottom-left, bottom-right, top-right, top-left of the right half
        assert_eq!(
            tex_coords,
            [
                Vec2::new(0.5, 0.0),
                Vec2::new(1.0, 0.0),
                Vec2::new(1.0, 1.0),
                Vec2::new(0.5, 1.0),
            ]
        );
    }

    #[test]
    fn test_horizontal_flip_mirrors_tex_coords() {
        let (map, layer) = single_tile_map(Tile::new(1, 16, 16, "single.png"), 16, 16);

        let tex_coords = face_for(&map, &layer, Flip::new(false, true, false), 0.0);

        // The bottom-left vertex now shows the image's bottom-right corner.
        assert_eq!(tex_coords[0], Vec2::new(1.0, 0.0));
        assert_eq!(tex_coords[3], Vec2::new(1.0, 1.0));
    }

    #[test]
    fn test_diagonal_flip_transposes_tex_coords() {
        let (map, layer) = single_tile_map(Tile::new(1, 16, 16, "single.png"), 16, 16);

        let tex_coords = face_for(&map, &layer, Flip::new(true, false, false), 0.0);

        // Screen top-right (index 2) shows the image's bottom-left corner.
        assert_eq!(tex_coords[2], Vec2::new(0.0, 0.0));
        // Screen bottom-left (index 0) shows the image's top-right corner.
        assert_eq!(tex_coords[0], Vec2::new(1.0, 1.0));
    }

    #[test]
    fn test_bias_moves_each_corner_toward_center() {
        let (map, layer) = single_tile_map(Tile::new(1, 16, 16, "atlas.png"), 64, 64);
        let bias = 1.0 / 1024.0;

        let plain = face_for(&map, &layer, Flip::NONE, 0.0);
        let biased = face_for(&map, &layer, Flip::NONE, bias);

        let center = (plain[0] + plain[2]) / 2.0;
        for (p, b) in plain.iter().zip(biased.iter()) {
            assert!(b.distance(center) < p.distance(center));
            assert!(((b.x - p.x).abs() - bias).abs() < 1e-7);
            assert!(((b.y - p.y).abs() - bias).abs() < 1e-7);
        }
    }

    #[test]
    fn test_diagonal_and_horizontal_turn_texture_clockwise() {
        let (map, layer) = single_tile_map(Tile::new(1, 16, 16, "single.png"), 16, 16);

        let tex_coords = face_for(&map, &layer, Flip::new(true, true, false), 0.0);

        // A quarter turn clockwise: the image's bottom-left corner lands top-left
        // on screen, its top-left corner top-right, and so on around the quad.
        assert_eq!(
            tex_coords,
            [
                Vec2::new(1.0, 0.0),
                Vec2::new(1.0, 1.0),
                Vec2::new(0.0, 1.0),
                Vec2::new(0.0, 0.0),
            ]
        );
    }

    #[test]
    fn test_diagonal_first_order_turns_the_other_way() {
        let (map, layer) = single_tile_map(Tile::new(1, 16, 16, "single.png"), 16, 16);
        let flip = Flip::new(true, true, false);

        let last = face_with_order(&map, &layer, flip, FlipOrder::DiagonalLast, 0.0);
        let first = face_with_order(&map, &layer, flip, FlipOrder::DiagonalFirst, 0.0);

        assert_ne!(first, last);
        // Screen top-left shows the image's top-right corner: counter-clockwise.
        assert_eq!(first[3], Vec2::new(1.0, 1.0));
        assert_eq!(first[1], Vec2::new(0.0, 0.0));
    }

    #[test]
    fn test_oversized_bias_never_inverts_texture() {
        let (map, layer) = single_tile_map(Tile::new(1, 16, 16, "atlas.png").at(16, 0), 32, 16);

        for bias in [1.0, 0.5, f32::INFINITY, f32::NAN, -1.0] {
            let tex_coords = face_for(&map, &layer, Flip::NONE, bias);

            assert!(tex_coords.iter().all(|uv| uv.is_finite()), "bias {bias}");
            // bottom-left stays left of bottom-right and below top-left
            assert!(tex_coords[0].x < tex_coords[1].x, "bias {bias}");
            assert!(tex_coords[0].y < tex_coords[3].y, "bias {bias}");
            assert!(tex_coords.iter().all(|uv| uv.x >= 0.5 && uv.x <= 1.0));
        }
    }
}
