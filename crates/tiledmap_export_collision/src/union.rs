//! Boolean union port and its default `geo` backed implementation.

use geo::algorithm::orient::{Direction, Orient};
use geo::{BooleanOps, Coord, LineString, MultiPolygon, Polygon};

use crate::fixed::{IntPath, IntPoint};

/// Boolean union of closed subject paths.
///
/// Implementations return `(closed, open)`. Holes must come back as their own
/// closed paths. The exporters treat this as a trusted primitive and never
/// inspect how the union is computed.
pub trait PolygonUnion {
    fn union(&self, subjects: &[IntPath]) -> (Vec<IntPath>, Vec<IntPath>);
}

/// Union through [`geo::BooleanOps`].
///
/// Every output polygon is emitted as its exterior ring (counter-clockwise)
/// followed by its holes (clockwise). Rings do not repeat their first point and
/// carry no collinear or repeated points.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeoUnion;

impl PolygonUnion for GeoUnion {
    fn union(&self, subjects: &[IntPath]) -> (Vec<IntPath>, Vec<IntPath>) {
        let polygons: Vec<MultiPolygon<f64>> = subjects
            .iter()
            .map(Vec::as_slice)
            .filter_map(to_polygon)
            .map(|polygon| MultiPolygon::new(vec![polygon]))
            .collect();

        let Some(merged) = union_all(polygons) else {
            return (Vec::new(), Vec::new());
        };

        let mut closed = Vec::new();
        for polygon in merged.orient(Direction::Default) {
            closed.extend(ring_to_path(polygon.exterior()));
            closed.extend(polygon.interiors().iter().filter_map(ring_to_path));
        }
        (closed, Vec::new())
    }
}

/// Pairwise reduction keeps every intermediate union small.
fn union_all(mut level: Vec<MultiPolygon<f64>>) -> Option<MultiPolygon<f64>> {
    while level.len() > 1 {
        let mut next = Vec::with_capacity(level.len().div_ceil(2));
        let mut pairs = level.into_iter();
        while let Some(first) = pairs.next() {
            match pairs.next() {
                Some(second) => next.push(first.union(&second)),
                None => next.push(first),
            }
        }
        level = next;
    }
    level.pop()
}

fn to_polygon(path: &[IntPoint]) -> Option<Polygon<f64>> {
    let ring = clean_ring(path.to_vec());
    if ring.len() < 3 {
        return None;
    }
    let coords: Vec<Coord<f64>> = ring
        .iter()
        .map(|p| Coord {
            x: p.x as f64,
            y: p.y as f64,
        })
        .collect();
    Some(Polygon::new(LineString::new(coords), Vec::new()))
}

fn ring_to_path(ring: &LineString<f64>) -> Option<IntPath> {
    let points: IntPath = ring
        .coords()
        .map(|c| IntPoint::new(c.x.round() as i64, c.y.round() as i64))
        .collect();
    let cleaned = clean_ring(points);
    (cleaned.len() >= 3).then_some(cleaned)
}

/// Drop the closing duplicate, repeated points and collinear points of a ring.
fn clean_ring(mut points: IntPath) -> IntPath {
    points.dedup();
    while points.len() > 1 && points.first() == points.last() {
        points.pop();
    }

    loop {
        let count = points.len();
        if count < 3 {
            return points;
        }
        let redundant = (0..count).find(|&i| {
            let prev = points[(i + count - 1) % count];
            let next = points[(i + 1) % count];
            let current = points[i];
            current == prev || cross(prev, current, next) == 0
        });
        match redundant {
            Some(index) => {
                points.remove(index);
            }
            None => return points,
        }
    }
}

#[inline]
fn cross(a: IntPoint, b: IntPoint, c: IntPoint) -> i128 {
    let ab = (i128::from(b.x - a.x), i128::from(b.y - a.y));
    let bc = (i128::from(c.x - b.x), i128::from(c.y - b.y));
    ab.0 * bc.1 - ab.1 * bc.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x: i64, y: i64, w: i64, h: i64) -> IntPath {
        vec![
            IntPoint::new(x, y),
            IntPoint::new(x + w, y),
            IntPoint::new(x + w, y + h),
            IntPoint::new(x, y + h),
        ]
    }

    fn signed_area(path: &[IntPoint]) -> i128 {
        (0..path.len())
            .map(|i| {
                let (a, b) = (path[i], path[(i + 1) % path.len()]);
                i128::from(a.x) * i128::from(b.y) - i128::from(b.x) * i128::from(a.y)
            })
            .sum()
    }

    #[test]
    fn test_adjoining_squares_merge_without_seam() {
        let (closed, open) = GeoUnion.union(&[rect(0, 0, 16, 16), rect(16, 0, 16, 16)]);

        assert!(open.is_empty());
        assert_eq!(closed.len(), 1);
        assert_eq!(closed[0].len(), 4);
        assert_eq!(signed_area(&closed[0]).abs(), 2 * 32 * 16);
    }

    #[test]
    fn test_disjoint_squares_stay_separate() {
        let (closed, _) = GeoUnion.union(&[rect(0, 0, 4, 4), rect(10, 0, 4, 4)]);
        assert_eq!(closed.len(), 2);
    }

    #[test]
    fn test_ring_of_squares_keeps_hole() {
        // 3x3 block of squares with the center missing
        let subjects: Vec<IntPath> = (0..3)
            .flat_map(|y| (0..3).map(move |x| (x, y)))
            .filter(|&(x, y)| (x, y) != (1, 1))
            .map(|(x, y)| rect(x * 10, y * 10, 10, 10))
            .collect();

        let (closed, _) = GeoUnion.union(&subjects);

        assert_eq!(closed.len(), 2);
        let outer = signed_area(&closed[0]);
        let hole = signed_area(&closed[1]);
        assert_eq!(outer.abs(), 2 * 30 * 30);
        assert_eq!(hole.abs(), 2 * 10 * 10);
        // Exterior and hole wind in opposite directions.
        assert!(outer.signum() != hole.signum());
    }

    #[test]
    fn test_degenerate_subjects_are_ignored() {
        let line = vec![IntPoint::new(0, 0), IntPoint::new(5, 0), IntPoint::new(10, 0)];
        let (closed, open) = GeoUnion.union(&[line, Vec::new()]);
        assert!(closed.is_empty());
        assert!(open.is_empty());
    }

    #[test]
    fn test_clean_ring_removes_redundant_points() {
        let ring = vec![
            IntPoint::new(0, 0),
            IntPoint::new(5, 0),
            IntPoint::new(10, 0),
            IntPoint::new(10, 0),
            IntPoint::new(10, 10),
            IntPoint::new(0, 10),
            IntPoint::new(0, 0),
        ];
        assert_eq!(clean_ring(ring), rect(0, 0, 10, 10));
    }
}
