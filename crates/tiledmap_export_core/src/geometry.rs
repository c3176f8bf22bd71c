//! Point-set transforms shared by the mesh and collision exporters.
//!
//! All functions work in place on point slices of any length, so the same
//! primitive serves four-corner quads and arbitrary collision polygons.
//!
//! # Flip orderings
//!
//! Tiled applies a cell's flips to the tile image diagonal first, then horizontal,
//! then vertical. [`flip_points_diagonal_first`] is that mapping (tile-local point →
//! rendered point) and [`flip_points`] applies the same three flags in the reverse
//! order, which makes it the inverse mapping. The two differ whenever the diagonal
//! flag is combined with exactly one of the mirror flags; picking the wrong one
//! rotates the result by 180°.

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

/// The three independent flip flags of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Flip {
    /// Swap X and Y (mirror across the tile's top-left to bottom-right diagonal)
    pub diagonal: bool,
    /// Mirror X
    pub horizontal: bool,
    /// Mirror Y
    pub vertical: bool,
}

impl Flip {
    pub const NONE: Self = Self {
        diagonal: false,
        horizontal: false,
        vertical: false,
    };

    pub const fn new(diagonal: bool, horizontal: bool, vertical: bool) -> Self {
        Self {
            diagonal,
            horizontal,
            vertical,
        }
    }
}

/// Which end of the composition the diagonal swap sits at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlipOrder {
    /// Swap, then mirror X, then mirror Y (Tiled's draw order)
    DiagonalFirst,
    /// Mirror X, mirror Y, then swap (inverse of the draw order)
    #[default]
    DiagonalLast,
}

impl FlipOrder {
    pub fn apply(self, points: &mut [Vec2], center: Vec2, flip: Flip) {
        match self {
            FlipOrder::DiagonalFirst => flip_points_diagonal_first(points, center, flip),
            FlipOrder::DiagonalLast => flip_points(points, center, flip),
        }
    }
}

/// Mirror X and Y about `center` as requested, then swap the axes about `center`.
pub fn flip_points(points: &mut [Vec2], center: Vec2, flip: Flip) {
    for point in points.iter_mut() {
        let mut p = *point;
        if flip.horizontal {
            p = mirror_x(p, center);
        }
        if flip.vertical {
            p = mirror_y(p, center);
        }
        if flip.diagonal {
            p = swap_axes(p, center);
        }
        *point = p;
    }
}

/// Swap the axes about `center`, then mirror X and Y about `center` as requested.
pub fn flip_points_diagonal_first(points: &mut [Vec2], center: Vec2, flip: Flip) {
    for point in points.iter_mut() {
        let mut p = *point;
        if flip.diagonal {
            p = swap_axes(p, center);
        }
        if flip.horizontal {
            p = mirror_x(p, center);
        }
        if flip.vertical {
            p = mirror_y(p, center);
        }
        *point = p;
    }
}

/// Offset every point.
pub fn translate_points(points: &mut [Vec2], offset: Vec2) {
    for point in points.iter_mut() {
        *point += offset;
    }
}

/// Rotate every point about the origin by `degrees`, clockwise in a Y-down space.
///
/// A zero rotation leaves the points bit-for-bit untouched.
pub fn rotate_points(points: &mut [Vec2], degrees: f32) {
    if degrees == 0.0 {
        return;
    }
    let (sin, cos) = degrees.to_radians().sin_cos();
    for point in points.iter_mut() {
        *point = Vec2::new(
            point.x * cos - point.y * sin,
            point.x * sin + point.y * cos,
        );
    }
}

#[inline]
fn mirror_x(p: Vec2, center: Vec2) -> Vec2 {
    Vec2::new(2.0 * center.x - p.x, p.y)
}

#[inline]
fn mirror_y(p: Vec2, center: Vec2) -> Vec2 {
    Vec2::new(p.x, 2.0 * center.y - p.y)
}

#[inline]
fn swap_axes(p: Vec2, center: Vec2) -> Vec2 {
    Vec2::new(center.x + (p.y - center.y), center.y + (p.x - center.x))
}
