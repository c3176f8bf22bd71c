//! Bitmap sizing for collision previews.

use bevy::math::UVec2;
use tiledmap_export_core::diagnostics::Diagnostics;
use tiledmap_export_core::model::Map;

/// Size of the bitmap a preview of `map` drawn at `scale` needs.
///
/// The result is capped so neither side exceeds `max_dimension`, keeping the
/// aspect ratio; capping is reported as an info notice. Never returns a zero side.
pub fn preview_size(
    map: &Map,
    scale: f32,
    max_dimension: u32,
    diagnostics: &dyn Diagnostics,
) -> UVec2 {
    let max_dimension = max_dimension.max(1);
    let scale = if scale.is_finite() && scale > 0.0 {
        scale
    } else {
        diagnostics.warn(&format!("preview scale {scale} is not usable, drawing at 1x"));
        1.0
    };

    let width = f64::from(map.width) * f64::from(map.tile_width) * f64::from(scale);
    let height = f64::from(map.height) * f64::from(map.tile_height) * f64::from(scale);
    let largest = width.max(height);
    let limit = f64::from(max_dimension);

    let (width, height) = if largest > limit {
        let factor = limit / largest;
        let capped = (
            (width * factor).round().clamp(1.0, limit),
            (height * factor).round().clamp(1.0, limit),
        );
        diagnostics.info(&format!(
            "preview of {width:.0}x{height:.0} pixels exceeds {max_dimension}, \
             reduced to {:.0}x{:.0}",
            capped.0, capped.1
        ));
        capped
    } else {
        (width.ceil().max(1.0), height.ceil().max(1.0))
    };

    UVec2::new(width as u32, height as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiledmap_export_core::diagnostics::CollectedDiagnostics;

    #[test]
    fn test_small_map_is_not_capped() {
        let map = Map::new(10, 5, 16, 16);
        let diagnostics = CollectedDiagnostics::new();

        assert_eq!(preview_size(&map, 2.0, 4096, &diagnostics), UVec2::new(320, 160));
        assert!(diagnostics.entries().is_empty());
    }

    #[test]
    fn test_oversized_preview_is_capped_with_notice() {
        let map = Map::new(1000, 500, 32, 32);
        let diagnostics = CollectedDiagnostics::new();

        let size = preview_size(&map, 4.0, 8192, &diagnostics);

        assert_eq!(size, UVec2::new(8192, 4096));
        assert_eq!(diagnostics.infos().len(), 1);
    }

    #[test]
    fn test_degenerate_input_still_yields_a_pixel() {
        let map = Map::new(0, 0, 16, 16);
        let diagnostics = CollectedDiagnostics::new();

        assert_eq!(preview_size(&map, f32::NAN, 0, &diagnostics), UVec2::new(1, 1));
        assert_eq!(diagnostics.warnings().len(), 1);
    }
}
