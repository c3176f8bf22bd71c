//! Mesh assembly: faces from every exportable layer, deduplicated into shared
//! vertex and texture coordinate pools and grouped by layer and source image.

use std::collections::{HashMap, HashSet};
use std::ffi::OsStr;
use std::hash::Hash;
use std::path::Path;

use bevy::math::{Vec2, Vec3};
use tiledmap_export_core::animation::expand_frames;
use tiledmap_export_core::config::ExportConfig;
use tiledmap_export_core::diagnostics::Diagnostics;
use tiledmap_export_core::error::ExportError;
use tiledmap_export_core::model::Map;

use crate::face::{Face, generate_face};

/// Every face shares this normal: the mesh faces the viewer along -Z.
pub const FACE_NORMAL: Vec3 = Vec3::new(0.0, 0.0, -1.0);

/// A face as four 1-based indices into each pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexedFace {
    pub vertices: [u32; 4],
    pub tex_coords: [u32; 4],
}

/// Faces sharing one layer and one source image.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshGroup {
    /// Sanitized, unique group name
    pub name: String,
    pub layer: String,
    pub image: String,
    pub faces: Vec<IndexedFace>,
}

/// The assembled mesh.
///
/// Pools are in first-occurrence order and groups in the order their first face was
/// produced, so the same map always assembles into the same mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshAssembly {
    pub vertices: Vec<Vec3>,
    pub tex_coords: Vec<Vec2>,
    pub groups: Vec<MeshGroup>,
}

impl MeshAssembly {
    /// Walk every mesh-exporting layer in draw order and assemble its faces.
    ///
    /// Fails on an invalid config and on the first tile, frame tile or image the
    /// map does not register.
    pub fn assemble(
        map: &Map,
        config: &ExportConfig,
        diagnostics: &dyn Diagnostics,
    ) -> Result<Self, ExportError> {
        config
            .validate()
            .map_err(|error| ExportError::InvalidConfig(error.to_string()))?;
        let texel_bias = config.texel_bias();
        let flip_order = config.tex_coord_flip_order;
        let mut builder = Builder::default();

        for layer in map.layers.iter().filter(|layer| layer.exports_mesh()) {
            layer.validate()?;
            let before = builder.face_count;

            for (x, y) in map.cells_in_draw_order(layer.width, layer.height) {
                let Some(cell) = layer.get(x, y) else {
                    continue;
                };
                let tile = map.tile(cell.gid)?;
                for frame in expand_frames(map, tile) {
                    let frame = frame?;
                    let image = map.tile_image(frame.tile)?;
                    builder.push(generate_face(
                        map, layer, x, y, frame, cell.flip, flip_order, image, texel_bias,
                    ));
                }
            }

            diagnostics.info(&format!(
                "layer `{}`: {} faces",
                layer.name,
                builder.face_count - before
            ));
        }

        let assembly = builder.finish();
        diagnostics.info(&format!(
            "mesh: {} vertices, {} texture coordinates, {} faces in {} groups",
            assembly.vertices.len(),
            assembly.tex_coords.len(),
            assembly.face_count(),
            assembly.groups.len()
        ));
        Ok(assembly)
    }

    pub fn face_count(&self) -> usize {
        self.groups.iter().map(|group| group.faces.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Insertion-ordered interning of values by an exact bit key.
struct Pool<K, V> {
    values: Vec<V>,
    index: HashMap<K, u32>,
}

impl<K, V> Default for Pool<K, V> {
    fn default() -> Self {
        Self {
            values: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash, V> Pool<K, V> {
    /// 1-based index of `value`, appending it on first sight.
    fn intern(&mut self, key: K, value: V) -> u32 {
        let next = self.values.len() as u32 + 1;
        *self.index.entry(key).or_insert_with(|| {
            self.values.push(value);
            next
        })
    }
}

#[derive(Default)]
struct Builder {
    vertices: Pool<[u32; 3], Vec3>,
    tex_coords: Pool<[u32; 2], Vec2>,
    groups: Vec<MeshGroup>,
    group_index: HashMap<(String, String), usize>,
    used_names: HashSet<String>,
    face_count: usize,
}

impl Builder {
    fn push(&mut self, face: Face<'_>) {
        let vertices = face
            .vertices
            .map(|v| self.vertices.intern(v.to_array().map(f32::to_bits), v));
        let tex_coords = face
            .tex_coords
            .map(|t| self.tex_coords.intern(t.to_array().map(f32::to_bits), t));

        let group = self.group(face.layer, face.image);
        self.groups[group].faces.push(IndexedFace {
            vertices,
            tex_coords,
        });
        self.face_count += 1;
    }

    fn group(&mut self, layer: &str, image: &str) -> usize {
        let key = (layer.to_string(), image.to_string());
        if let Some(&index) = self.group_index.get(&key) {
            return index;
        }

        let name = unique_name(&group_name(layer, image), &mut self.used_names);
        let index = self.groups.len();
        self.groups.push(MeshGroup {
            name,
            layer: key.0.clone(),
            image: key.1.clone(),
            faces: Vec::new(),
        });
        self.group_index.insert(key, index);
        index
    }

    fn finish(self) -> MeshAssembly {
        MeshAssembly {
            vertices: self.vertices.values,
            tex_coords: self.tex_coords.values,
            groups: self.groups,
        }
    }
}

/// `<layer>_<image stem>`, restricted to `[A-Za-z0-9_]`.
fn group_name(layer: &str, image: &str) -> String {
    let stem = Path::new(image)
        .file_stem()
        .and_then(OsStr::to_str)
        .unwrap_or(image);
    format!("{layer}_{stem}")
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// Suffix `_2`, `_3`, ... until `base` no longer collides with an earlier group.
fn unique_name(base: &str, used: &mut HashSet<String>) -> String {
    let mut candidate = base.to_string();
    let mut suffix = 2;
    while used.contains(&candidate) {
        candidate = format!("{base}_{suffix}");
        suffix += 1;
    }
    used.insert(candidate.clone());
    candidate
}
