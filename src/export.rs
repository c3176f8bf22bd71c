//! The export pipeline: mesh assembly followed by collision merging.

use tiledmap_export_collision::{CollisionMerger, GeoUnion, MergedLayerGeometry};
use tiledmap_export_core::{Diagnostics, ExportConfig, Map};
use tiledmap_export_mesh::MeshAssembly;

use crate::error::Error;

/// Everything exported from one map.
#[derive(Debug, Clone)]
pub struct MapExport {
    pub assembly: MeshAssembly,
    /// `assembly` as OBJ text
    pub mesh: String,
    /// One entry per collision-exporting tile layer, in layer order
    pub collision: Vec<MergedLayerGeometry>,
    /// One entry per visible object group, in group order
    pub objects: Vec<MergedLayerGeometry>,
}

/// Export a map: the mesh once, collision once per layer and object group.
///
/// Nothing is returned unless every step succeeds.
pub fn export_map(
    map: &Map,
    config: &ExportConfig,
    diagnostics: &dyn Diagnostics,
) -> Result<MapExport, Error> {
    config.validate()?;

    let assembly = MeshAssembly::assemble(map, config, diagnostics)?;
    let mesh = assembly.to_obj(&config.mesh_header);

    let mut collision = Vec::new();
    let mut objects = Vec::new();
    if config.export_collision {
        let mut merger = CollisionMerger::from_config(config, &GeoUnion, diagnostics);

        for layer in map.layers.iter().filter(|layer| layer.exports_collision()) {
            let merged = merger.merge_layer(map, layer)?;
            diagnostics.info(&format!(
                "layer `{}`: {} closed and {} open collision paths",
                merged.name,
                merged.closed.len(),
                merged.open.len()
            ));
            collision.push(merged);
        }

        for group in map.object_groups.iter().filter(|group| group.visible) {
            let merged = merger.merge_object_group(group);
            diagnostics.info(&format!(
                "object group `{}`: {} closed and {} open collision paths",
                merged.name,
                merged.closed.len(),
                merged.open.len()
            ));
            objects.push(merged);
        }
    }

    Ok(MapExport {
        assembly,
        mesh,
        collision,
        objects,
    })
}

/// Load a TMX file with the `tiled` crate and export it.
#[cfg(feature = "assets")]
pub fn export_tmx(
    path: impl AsRef<std::path::Path>,
    config: &ExportConfig,
    diagnostics: &dyn Diagnostics,
) -> Result<MapExport, Error> {
    let map = tiledmap_export_assets::load_map(path, diagnostics)?;
    export_map(&map, config, diagnostics)
}
