//! Parsing of the layer properties the exporters understand.
//!
//! Malformed values never abort an export: they are reported as a warning and the
//! safe default is used.

use crate::diagnostics::Diagnostics;
use crate::model::LayerIgnore;

/// Layer property excluding a layer from the mesh.
pub const COLLISION_ONLY_PROPERTY: &str = "collision_only";
/// Layer property selecting which exports skip the layer.
pub const IGNORE_PROPERTY: &str = "ignore";

/// Parse a boolean property value, defaulting to `false`.
pub fn parse_bool(owner: &str, property: &str, value: &str, diagnostics: &dyn Diagnostics) -> bool {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => true,
        "false" | "0" | "no" | "" => false,
        _ => {
            diagnostics.warn(&format!(
                "{owner}: property `{property}` has non-boolean value `{value}`, using false"
            ));
            false
        }
    }
}

/// Parse the `ignore` property, defaulting to [`LayerIgnore::Nothing`].
pub fn parse_ignore(owner: &str, value: &str, diagnostics: &dyn Diagnostics) -> LayerIgnore {
    match value.trim().to_ascii_lowercase().as_str() {
        "false" | "" => LayerIgnore::Nothing,
        "true" => LayerIgnore::Everything,
        "collision" => LayerIgnore::Collision,
        "visual" => LayerIgnore::Visual,
        _ => {
            diagnostics.warn(&format!(
                "{owner}: property `{IGNORE_PROPERTY}` has unknown value `{value}` \
                (expected false, true, collision or visual), ignoring it"
            ));
            LayerIgnore::Nothing
        }
    }
}
