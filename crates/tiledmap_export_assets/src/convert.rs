//! Conversion from a parsed `tiled::Map` into the export model.

use std::path::Path;

use bevy::math::Vec2;
use thiserror::Error;
use tiled::{ObjectShape, PropertyValue};
use tiledmap_export_core::animation::FrameIdAllocator;
use tiledmap_export_core::diagnostics::Diagnostics;
use tiledmap_export_core::error::ExportError;
use tiledmap_export_core::geometry::Flip;
use tiledmap_export_core::model::{
    Animation, Layer, LayerIgnore, Map, ObjectGroup, Shape, ShapeKind, Tile, TileRef,
};
use tiledmap_export_core::properties::{
    COLLISION_ONLY_PROPERTY, IGNORE_PROPERTY, parse_bool, parse_ignore,
};

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("Failed to load map: {0}")]
    Tiled(#[from] tiled::Error),

    #[error("Tile {tile_id} of tileset `{tileset}` has no image")]
    MissingImage { tileset: String, tile_id: u32 },

    #[error("Tile {tile_id} of tileset `{tileset}` lies outside its {width}x{height} atlas")]
    OutsideAtlas {
        tileset: String,
        tile_id: u32,
        width: u32,
        height: u32,
    },

    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Load a TMX file through `tiled::Loader` and convert it.
pub fn load_map(
    path: impl AsRef<Path>,
    diagnostics: &dyn Diagnostics,
) -> Result<Map, ConvertError> {
    let mut loader = tiled::Loader::new();
    let source = loader.load_tmx_map(path)?;
    convert_map(&source, diagnostics)
}

/// Convert a parsed map.
///
/// Global tile ids are assigned per tileset in declaration order starting at 1,
/// animation frames get their unique ids in the same order. Group layers are
/// flattened: their offsets accumulate and a hidden group hides its children.
pub fn convert_map(source: &tiled::Map, diagnostics: &dyn Diagnostics) -> Result<Map, ConvertError> {
    let mut map = Map::new(source.width, source.height, source.tile_width, source.tile_height);
    let mut frame_ids = FrameIdAllocator::new();

    // Index of each tileset's first gid, matching `LayerTile::tileset_index()`
    let mut first_gids = Vec::with_capacity(source.tilesets().len());
    let mut current_gid = 1u32;
    for tileset in source.tilesets() {
        first_gids.push(current_gid);
        convert_tileset(tileset, current_gid, &mut frame_ids, &mut map)?;
        current_gid += gid_span(tileset);
    }

    let context = LayerContext {
        first_gids: &first_gids,
        diagnostics,
    };
    context.convert_layers(source.layers(), Vec2::ZERO, true, &mut map);

    for layer in &map.layers {
        layer.validate()?;
    }
    Ok(map)
}

/// Number of global ids a tileset occupies.
///
/// Image collections may use sparse tile ids beyond `tilecount`, so the span
/// also covers the largest id in use (including animation frame targets).
fn gid_span(tileset: &tiled::Tileset) -> u32 {
    let mut span = tileset.tilecount;
    for (tile_id, data) in tileset.tiles() {
        span = span.max(tile_id + 1);
        if let Some(frames) = data.animation.as_ref() {
            for frame in frames {
                span = span.max(frame.tile_id + 1);
            }
        }
    }
    span
}

fn convert_tileset(
    tileset: &tiled::Tileset,
    first_gid: u32,
    frame_ids: &mut FrameIdAllocator,
    map: &mut Map,
) -> Result<(), ConvertError> {
    if let Some(ref image) = tileset.image {
        // Texture atlas: one spritesheet, tiles on a grid
        let name = image.source.to_string_lossy().to_string();
        let (width, height) = (image.width.max(0) as u32, image.height.max(0) as u32);
        map.insert_image(name.clone(), width, height);

        for tile_id in 0..tileset.tilecount {
            let (x, y) = atlas_position(tileset, tile_id);
            if tileset.columns == 0
                || x + tileset.tile_width > width
                || y + tileset.tile_height > height
            {
                return Err(ConvertError::OutsideAtlas {
                    tileset: tileset.name.clone(),
                    tile_id,
                    width,
                    height,
                });
            }

            let tile = Tile::new(first_gid + tile_id, tileset.tile_width, tileset.tile_height, &name)
                .at(x, y);
            map.insert_tile(with_tile_data(tile, tileset, tile_id, first_gid, frame_ids));
        }
    } else {
        // Image collection: one image per tile
        let mut tiles: Vec<_> = tileset.tiles().collect();
        tiles.sort_by_key(|(tile_id, _)| *tile_id);

        for (tile_id, data) in tiles {
            let Some(ref image) = data.image else {
                return Err(ConvertError::MissingImage {
                    tileset: tileset.name.clone(),
                    tile_id,
                });
            };
            let name = image.source.to_string_lossy().to_string();
            let (width, height) = (image.width.max(0) as u32, image.height.max(0) as u32);
            map.insert_image(name.clone(), width, height);

            let tile = Tile::new(first_gid + tile_id, width, height, name);
            map.insert_tile(with_tile_data(tile, tileset, tile_id, first_gid, frame_ids));
        }
    }
    Ok(())
}

/// Top-left pixel of an atlas tile, honouring margin and spacing.
fn atlas_position(tileset: &tiled::Tileset, tile_id: u32) -> (u32, u32) {
    let columns = tileset.columns.max(1);
    let col = tile_id % columns;
    let row = tile_id / columns;
    (
        tileset.margin + col * (tileset.tile_width + tileset.spacing),
        tileset.margin + row * (tileset.tile_height + tileset.spacing),
    )
}

/// Attach the animation and collision authored on a tile, if any.
fn with_tile_data(
    mut tile: Tile,
    tileset: &tiled::Tileset,
    tile_id: u32,
    first_gid: u32,
    frame_ids: &mut FrameIdAllocator,
) -> Tile {
    let Some(data) = tileset.get_tile(tile_id) else {
        return tile;
    };

    if let Some(frames) = data.animation.as_ref() {
        tile = tile.with_animation(Animation {
            frames: frames
                .iter()
                .map(|frame| frame_ids.frame(first_gid + frame.tile_id, frame.duration))
                .collect(),
        });
    }

    if let Some(collision) = data.collision.as_ref() {
        tile = tile.with_collision(collision.object_data().iter().map(convert_object).collect());
    }

    tile
}

/// Convert an object (map object or tile collision shape).
pub fn convert_object(object: &tiled::ObjectData) -> Shape {
    let kind = match &object.shape {
        // Tile objects carry a rectangle shape plus a tile reference.
        ObjectShape::Rect { width, height } if object.tile_data().is_some() => ShapeKind::Tile {
            width: *width,
            height: *height,
        },

        ObjectShape::Rect { width, height } => ShapeKind::Rectangle {
            width: *width,
            height: *height,
        },

        ObjectShape::Ellipse { width, height } => ShapeKind::Ellipse {
            width: *width,
            height: *height,
        },

        ObjectShape::Polyline { points } => ShapeKind::Polyline {
            points: points.iter().map(|(x, y)| Vec2::new(*x, *y)).collect(),
        },

        ObjectShape::Polygon { points } => ShapeKind::Polygon {
            points: points.iter().map(|(x, y)| Vec2::new(*x, *y)).collect(),
        },

        ObjectShape::Point(_, _) => ShapeKind::Unsupported {
            kind: "point".to_string(),
        },

        ObjectShape::Text { .. } => ShapeKind::Unsupported {
            kind: "text".to_string(),
        },
    };

    Shape::new(kind)
        .with_name(object.name.clone())
        .with_position(object.x, object.y)
        .with_rotation(object.rotation)
}

struct LayerContext<'a> {
    first_gids: &'a [u32],
    diagnostics: &'a dyn Diagnostics,
}

impl LayerContext<'_> {
    fn convert_layers<'map>(
        &self,
        layers: impl Iterator<Item = tiled::Layer<'map>>,
        parent_offset: Vec2,
        parent_visible: bool,
        map: &mut Map,
    ) {
        for layer in layers {
            let offset = parent_offset + Vec2::new(layer.offset_x, layer.offset_y);
            let visible = parent_visible && layer.visible;

            if let Some(tile_layer) = layer.as_tile_layer() {
                if let Some(mut converted) = self.convert_tile_layer(&layer, &tile_layer) {
                    converted.offset = offset;
                    converted.visible = visible;
                    map.push_layer(converted);
                }
            } else if let Some(object_layer) = layer.as_object_layer() {
                let mut group = ObjectGroup::new(layer.name.clone());
                group.offset = offset;
                group.visible = visible;
                group.objects = object_layer
                    .objects()
                    .map(|object| convert_object(&object))
                    .collect();
                map.object_groups.push(group);
            } else if let Some(group) = layer.as_group_layer() {
                self.convert_layers(group.layers(), offset, visible, map);
            }
        }
    }

    fn convert_tile_layer(
        &self,
        layer: &tiled::Layer,
        tile_layer: &tiled::TileLayer,
    ) -> Option<Layer> {
        let (Some(width), Some(height)) = (tile_layer.width(), tile_layer.height()) else {
            self.diagnostics.warn(&format!(
                "layer `{}`: infinite tile layers are not exported",
                layer.name
            ));
            return None;
        };

        let mut converted = Layer::new(layer.name.clone(), width, height);
        let owner = format!("layer `{}`", layer.name);
        converted.collision_only = self.collision_only(&owner, &layer.properties);
        converted.ignore = self.ignore(&owner, &layer.properties);

        for y in 0..height {
            for x in 0..width {
                let Some(tile) = tile_layer.get_tile(x as i32, y as i32) else {
                    continue;
                };
                let Some(first_gid) = self.first_gids.get(tile.tileset_index()) else {
                    self.diagnostics.warn(&format!(
                        "{owner}: tile at ({x}, {y}) references unknown tileset {}",
                        tile.tileset_index()
                    ));
                    continue;
                };
                let cell = TileRef {
                    gid: first_gid + tile.id(),
                    flip: Flip::new(tile.flip_d, tile.flip_h, tile.flip_v),
                };
                converted.set(x, y, cell.to_raw());
            }
        }
        Some(converted)
    }

    fn collision_only(&self, owner: &str, properties: &tiled::Properties) -> bool {
        match properties.get(COLLISION_ONLY_PROPERTY) {
            None => false,
            Some(PropertyValue::BoolValue(value)) => *value,
            Some(PropertyValue::StringValue(value)) => {
                parse_bool(owner, COLLISION_ONLY_PROPERTY, value, self.diagnostics)
            }
            Some(other) => {
                self.diagnostics.warn(&format!(
                    "{owner}: property `{COLLISION_ONLY_PROPERTY}` should be a bool, got {other:?}, using false"
                ));
                false
            }
        }
    }

    fn ignore(&self, owner: &str, properties: &tiled::Properties) -> LayerIgnore {
        match properties.get(IGNORE_PROPERTY) {
            None | Some(PropertyValue::BoolValue(false)) => LayerIgnore::Nothing,
            Some(PropertyValue::BoolValue(true)) => LayerIgnore::Everything,
            Some(PropertyValue::StringValue(value)) => parse_ignore(owner, value, self.diagnostics),
            Some(other) => {
                self.diagnostics.warn(&format!(
                    "{owner}: property `{IGNORE_PROPERTY}` should be a string, got {other:?}, ignoring it"
                ));
                LayerIgnore::Nothing
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiledmap_export_core::diagnostics::CollectedDiagnostics;
    use tiledmap_export_core::model::Frame;

    const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/courtyard.tmx");

    fn courtyard(diagnostics: &CollectedDiagnostics) -> Map {
        load_map(FIXTURE, diagnostics).unwrap()
    }

    #[test]
    fn test_map_dimensions_and_atlas_tiles() {
        let diagnostics = CollectedDiagnostics::new();
        let map = courtyard(&diagnostics);

        assert_eq!((map.width, map.height), (3, 2));
        assert_eq!((map.tile_width, map.tile_height), (16, 16));
        assert_eq!(map.tiles.len(), 4);
        assert_eq!(map.images.len(), 1);

        let tile = map.tile(4).unwrap();
        assert_eq!((tile.image_x, tile.image_y), (16, 16));
        assert!(map.tile_image(tile).is_ok());
        assert!(diagnostics.warnings().is_empty());
    }

    #[test]
    fn test_animation_frames_get_global_ids() {
        let diagnostics = CollectedDiagnostics::new();
        let map = courtyard(&diagnostics);

        let animation = map.tile(4).unwrap().animation.as_ref().unwrap();
        assert_eq!(
            animation.frames,
            vec![
                Frame { gid: 2, unique_id: 1, duration_ms: 100 },
                Frame { gid: 3, unique_id: 2, duration_ms: 150 },
            ]
        );
    }

    #[test]
    fn test_tile_collision_shapes() {
        let diagnostics = CollectedDiagnostics::new();
        let map = courtyard(&diagnostics);

        let collision = &map.tile(1).unwrap().collision;
        assert_eq!(collision.len(), 1);
        assert_eq!(
            collision[0].kind,
            ShapeKind::Rectangle { width: 16.0, height: 16.0 }
        );
        assert!(map.tile(2).unwrap().collision.is_empty());
    }

    #[test]
    fn test_layers_cells_and_properties() {
        let diagnostics = CollectedDiagnostics::new();
        let map = courtyard(&diagnostics);

        assert_eq!(map.layers.len(), 2);
        let ground = &map.layers[0];
        assert_eq!(ground.name, "Ground");
        assert_eq!(ground.get(0, 1).map(|cell| cell.gid), Some(4));
        assert!(ground.get(1, 1).is_none());

        let flipped = ground.get(2, 1).unwrap();
        assert_eq!(flipped.gid, 3);
        assert_eq!(flipped.flip, Flip::new(false, true, false));

        let walls = &map.layers[1];
        assert!(walls.collision_only);
        assert!(!walls.exports_mesh());
        assert_eq!(walls.offset, Vec2::new(4.0, -2.0));
    }

    #[test]
    fn test_object_group_shapes() {
        let diagnostics = CollectedDiagnostics::new();
        let map = courtyard(&diagnostics);

        assert_eq!(map.object_groups.len(), 1);
        let group = &map.object_groups[0];
        assert_eq!(group.name, "Triggers");

        let kinds: Vec<&str> = group.objects.iter().map(|object| object.kind.name()).collect();
        assert_eq!(kinds, vec!["rectangle", "ellipse", "polyline", "point"]);
        assert_eq!(group.objects[0].position, Vec2::new(8.0, 8.0));
        assert_eq!(
            group.objects[2].kind,
            ShapeKind::Polyline { points: vec![Vec2::new(0.0, 0.0), Vec2::new(16.0, 0.0)] }
        );
    }

    #[test]
    fn test_sparse_collection_ids_do_not_overlap_next_tileset() {
        let grove = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/grove.tmx");
        let diagnostics = CollectedDiagnostics::new();
        let map = load_map(grove, &diagnostics).unwrap();

        // Two collection tiles plus four atlas tiles, none overwritten.
        assert_eq!(map.tiles.len(), 6);

        let layer = &map.layers[0];
        let tree = map.tile(layer.get(0, 0).unwrap().gid).unwrap();
        assert_eq!(tree.gid, 6);
        assert!(tree.image.ends_with("tree.png"));
        assert_eq!((tree.width, tree.height), (16, 32));

        let grass = map.tile(layer.get(1, 0).unwrap().gid).unwrap();
        assert_eq!(grass.gid, 10);
        assert!(grass.image.ends_with("terrain.png"));
        assert_eq!((grass.image_x, grass.image_y), (16, 16));
        assert!(diagnostics.warnings().is_empty());
    }

    #[test]
    fn test_missing_file_is_a_load_error() {
        let diagnostics = CollectedDiagnostics::new();
        let result = load_map("does/not/exist.tmx", &diagnostics);
        assert!(matches!(result, Err(ConvertError::Tiled(_))));
    }

    #[test]
    fn test_malformed_layer_properties_warn_and_default() {
        let diagnostics = CollectedDiagnostics::new();
        let context = LayerContext {
            first_gids: &[1],
            diagnostics: &diagnostics,
        };
        let mut properties = tiled::Properties::new();
        properties.insert(COLLISION_ONLY_PROPERTY.to_string(), PropertyValue::IntValue(1));
        properties.insert(
            IGNORE_PROPERTY.to_string(),
            PropertyValue::StringValue("collision".to_string()),
        );

        assert!(!context.collision_only("layer `x`", &properties));
        assert_eq!(context.ignore("layer `x`", &properties), LayerIgnore::Collision);
        assert_eq!(diagnostics.warnings().len(), 1);
    }
}
