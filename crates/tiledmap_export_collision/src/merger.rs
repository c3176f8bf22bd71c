//! Collision polygon merging.
//!
//! Collects the collision shapes of every tile on a layer (or every object of an
//! object group), places them in world pixel space and unions the closed ones
//! into as few polygons as possible. Open polylines are passed through untouched.

use std::f32::consts::TAU;

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};
use tiledmap_export_core::config::ExportConfig;
use tiledmap_export_core::diagnostics::Diagnostics;
use tiledmap_export_core::error::ExportError;
use tiledmap_export_core::geometry::{flip_points_diagonal_first, rotate_points, translate_points};
use tiledmap_export_core::model::{Layer, Map, ObjectGroup, Shape, ShapeKind};
use tiledmap_export_core::placement::TilePlacement;

use crate::fixed::{FixedPoint, IntPath, IntPoint};
use crate::union::PolygonUnion;

/// Why a shape was left out of the union.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// Ellipses can only be merged as circles
    NonCircularEllipse,
    /// Shape kind the merger does not understand
    Unsupported,
}

/// A shape excluded from the union, kept so callers can still draw it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedShape {
    pub label: String,
    pub reason: SkipReason,
}

/// Merged collision geometry of one layer or object group.
///
/// Points are in the caller's fixed-point space; convert them back with the
/// inverse of the transform the merger was given (for example
/// [`FixedPoint::to_world`]).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedLayerGeometry {
    pub name: String,
    /// Union output: each polygon's exterior followed by its holes
    pub closed: Vec<IntPath>,
    /// Polylines, unmerged
    pub open: Vec<IntPath>,
    pub skipped: Vec<SkippedShape>,
}

impl MergedLayerGeometry {
    pub fn is_empty(&self) -> bool {
        self.closed.is_empty() && self.open.is_empty()
    }
}

/// Coarse milestones reported while merging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeProgress {
    /// Shapes collected for `done` of `total` rows (or objects)
    Gathering { done: usize, total: usize },
    /// About to union this many closed subjects
    Clipping { subjects: usize },
    Done { closed: usize, open: usize },
}

/// A shape in shape-local space after its own rotation and offset.
enum Outline {
    Closed(Vec<Vec2>),
    Open(Vec<Vec2>),
    Rejected(SkipReason),
}

/// Merges collision shapes through an injected [`PolygonUnion`].
///
/// # Example
///
/// ```rust
/// use tiledmap_export_collision::prelude::*;
/// use tiledmap_export_core::prelude::*;
///
/// let mut map = Map::new(2, 1, 16, 16);
/// map.insert_image("walls.png", 16, 16);
/// map.insert_tile(
///     Tile::new(1, 16, 16, "walls.png")
///         .with_collision(vec![Shape::new(ShapeKind::Rectangle { width: 16.0, height: 16.0 })]),
/// );
/// let mut layer = Layer::new("Walls", 2, 1);
/// layer.set(0, 0, 1);
/// layer.set(1, 0, 1);
///
/// let diagnostics = CollectedDiagnostics::new();
/// let mut merger = CollisionMerger::new(&GeoUnion, &diagnostics)
///     .with_transform(|p| IntPoint::new(p.x as i64, p.y as i64));
/// let merged = merger.merge_layer(&map, &layer).unwrap();
/// assert_eq!(merged.closed.len(), 1);
/// ```
pub struct CollisionMerger<'a> {
    union: &'a dyn PolygonUnion,
    diagnostics: &'a dyn Diagnostics,
    to_fixed: Box<dyn Fn(Vec2) -> IntPoint + 'a>,
    progress: Option<Box<dyn FnMut(&MergeProgress) + 'a>>,
    circle_segments: u32,
}

impl<'a> CollisionMerger<'a> {
    /// A merger using the default [`FixedPoint`] transform and no progress callback.
    pub fn new(union: &'a dyn PolygonUnion, diagnostics: &'a dyn Diagnostics) -> Self {
        Self::from_config(&ExportConfig::default(), union, diagnostics)
    }

    /// A merger using the config's fixed-point scale and circle segmentation.
    pub fn from_config(
        config: &ExportConfig,
        union: &'a dyn PolygonUnion,
        diagnostics: &'a dyn Diagnostics,
    ) -> Self {
        let fixed = FixedPoint::from_config(config);
        Self {
            union,
            diagnostics,
            to_fixed: Box::new(move |point| fixed.to_fixed(point)),
            progress: None,
            circle_segments: config.circle_segments.max(3),
        }
    }

    /// Replace the world → integer coordinate transform.
    pub fn with_transform(mut self, to_fixed: impl Fn(Vec2) -> IntPoint + 'a) -> Self {
        self.to_fixed = Box::new(to_fixed);
        self
    }

    /// Observe merge milestones. The callback never changes the output.
    pub fn with_progress(mut self, progress: impl FnMut(&MergeProgress) + 'a) -> Self {
        self.progress = Some(Box::new(progress));
        self
    }

    pub fn with_circle_segments(mut self, segments: u32) -> Self {
        self.circle_segments = segments.max(3);
        self
    }

    /// Merge the collision shapes of every tile on `layer`.
    ///
    /// Each shape is rotated and offset in tile space, flipped with the cell's flags
    /// about the tile center, re-anchored to the rendered footprint and moved to the
    /// cell. Unresolvable tiles are fatal; unsupported shapes are skipped with a
    /// warning. Hidden layers and layers ignored for collision merge to nothing.
    pub fn merge_layer(
        &mut self,
        map: &Map,
        layer: &Layer,
    ) -> Result<MergedLayerGeometry, ExportError> {
        layer.validate()?;
        if !layer.exports_collision() {
            return Ok(MergedLayerGeometry {
                name: layer.name.clone(),
                ..Default::default()
            });
        }

        let mut subjects = Vec::new();
        let mut open = Vec::new();
        let mut skipped = Vec::new();
        let rows = layer.height as usize;

        for y in 0..layer.height {
            for x in 0..layer.width {
                let Some(cell) = layer.get(x, y) else {
                    continue;
                };
                let tile = map.tile(cell.gid)?;
                if tile.collision.is_empty() {
                    continue;
                }

                let placement = TilePlacement::new(map, layer, x, y, tile, cell.flip);
                let center = tile.size() / 2.0;
                let anchor = placement.origin + (placement.size - tile.size()) / 2.0;

                for shape in &tile.collision {
                    match outline(shape, self.circle_segments) {
                        Outline::Closed(mut points) => {
                            flip_points_diagonal_first(&mut points, center, cell.flip);
                            translate_points(&mut points, anchor);
                            subjects.push(self.fixed(&points));
                        }
                        Outline::Open(mut points) => {
                            flip_points_diagonal_first(&mut points, center, cell.flip);
                            translate_points(&mut points, anchor);
                            open.push(self.fixed(&points));
                        }
                        Outline::Rejected(reason) => {
                            let context = format!("layer `{}` cell ({x}, {y})", layer.name);
                            skipped.push(self.reject(&context, shape, reason));
                        }
                    }
                }
            }
            self.report(MergeProgress::Gathering {
                done: y as usize + 1,
                total: rows,
            });
        }

        Ok(self.finish(&layer.name, subjects, open, skipped))
    }

    /// Merge the shapes of an object group.
    ///
    /// Objects are already in map pixel space; only the group offset is added.
    pub fn merge_object_group(&mut self, group: &ObjectGroup) -> MergedLayerGeometry {
        let mut subjects = Vec::new();
        let mut open = Vec::new();
        let mut skipped = Vec::new();

        for object in &group.objects {
            match outline(object, self.circle_segments) {
                Outline::Closed(mut points) => {
                    translate_points(&mut points, group.offset);
                    subjects.push(self.fixed(&points));
                }
                Outline::Open(mut points) => {
                    translate_points(&mut points, group.offset);
                    open.push(self.fixed(&points));
                }
                Outline::Rejected(reason) => {
                    let context = format!("object group `{}`", group.name);
                    skipped.push(self.reject(&context, object, reason));
                }
            }
        }
        self.report(MergeProgress::Gathering {
            done: group.objects.len(),
            total: group.objects.len(),
        });

        self.finish(&group.name, subjects, open, skipped)
    }

    fn finish(
        &mut self,
        name: &str,
        subjects: Vec<IntPath>,
        mut open: Vec<IntPath>,
        skipped: Vec<SkippedShape>,
    ) -> MergedLayerGeometry {
        self.report(MergeProgress::Clipping {
            subjects: subjects.len(),
        });

        let (closed, union_open) = if subjects.is_empty() {
            (Vec::new(), Vec::new())
        } else {
            self.union.union(&subjects)
        };
        open.extend(union_open);

        self.report(MergeProgress::Done {
            closed: closed.len(),
            open: open.len(),
        });

        MergedLayerGeometry {
            name: name.to_string(),
            closed,
            open,
            skipped,
        }
    }

    fn fixed(&self, points: &[Vec2]) -> IntPath {
        points.iter().map(|point| (self.to_fixed)(*point)).collect()
    }

    fn report(&mut self, progress: MergeProgress) {
        if let Some(callback) = self.progress.as_mut() {
            callback(&progress);
        }
    }

    fn reject(&self, context: &str, shape: &Shape, reason: SkipReason) -> SkippedShape {
        let label = shape.label();
        match reason {
            SkipReason::NonCircularEllipse => self.diagnostics.warn(&format!(
                "{context}: {label} is not a circle, excluded from collision"
            )),
            SkipReason::Unsupported => self.diagnostics.warn(&format!(
                "{context}: unhandled object ({label}), excluded from collision"
            )),
        }
        SkippedShape { label, reason }
    }
}

/// Points of a shape relative to its owner: local outline, rotated about the
/// shape's origin, then moved to the shape's position.
fn outline(shape: &Shape, circle_segments: u32) -> Outline {
    let mut points = match &shape.kind {
        ShapeKind::Polygon { points } | ShapeKind::Polyline { points } => points.clone(),
        ShapeKind::Rectangle { width, height } => vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(*width, 0.0),
            Vec2::new(*width, *height),
            Vec2::new(0.0, *height),
        ],
        // Tile objects hang from their bottom-left corner.
        ShapeKind::Tile { width, height } => vec![
            Vec2::new(0.0, -*height),
            Vec2::new(*width, -*height),
            Vec2::new(*width, 0.0),
            Vec2::new(0.0, 0.0),
        ],
        ShapeKind::Ellipse { width, height } => {
            if !is_circle(*width, *height) {
                return Outline::Rejected(SkipReason::NonCircularEllipse);
            }
            circle_points(*width / 2.0, circle_segments)
        }
        ShapeKind::Unsupported { .. } => return Outline::Rejected(SkipReason::Unsupported),
    };

    rotate_points(&mut points, shape.rotation);
    translate_points(&mut points, shape.position);

    match shape.kind {
        ShapeKind::Polyline { .. } => Outline::Open(points),
        _ => Outline::Closed(points),
    }
}

fn is_circle(width: f32, height: f32) -> bool {
    (width - height).abs() <= f32::EPSILON * width.abs().max(height.abs()).max(1.0)
}

/// Regular polygon inscribed in the circle whose bounds start at the origin.
fn circle_points(radius: f32, segments: u32) -> Vec<Vec2> {
    let center = Vec2::splat(radius);
    (0..segments)
        .map(|i| {
            let angle = TAU * i as f32 / segments as f32;
            center + Vec2::new(angle.cos(), angle.sin()) * radius
        })
        .collect()
}
