use tiledmap_export_core::config::ConfigError;
use tiledmap_export_core::error::ExportError;

/// Any failure of a facade export call.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[cfg(feature = "assets")]
    #[error(transparent)]
    Convert(#[from] tiledmap_export_assets::ConvertError),
}
