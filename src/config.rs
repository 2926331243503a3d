use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use tracing::{info, warn};
use vxmesh_core::OptimizationLevel;
use vxmesh_format::{BoundsPolicy, MeshVariant};

pub const DEFAULT_CONFIG_PATH: &str = "config/vxmesh.toml";

/// Converter settings read from `config/vxmesh.toml`; CLI flags win.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ConverterConfig {
    /// 0 keeps every voxel, 1 culls enclosed voxels, 2 is reserved (same as 1).
    pub optimization: OptimizationLevel,
    pub variant: MeshVariant,
    /// `last-frame` or `union`.
    pub bounds_policy: BoundsPolicy,
    /// Worker threads, 0 = one per core.
    pub jobs: usize,
    pub source_extension: String,
    pub description_extension: String,
    pub animated_extension: String,
    pub static_extension: String,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            optimization: OptimizationLevel::default(),
            variant: MeshVariant::default(),
            bounds_policy: BoundsPolicy::default(),
            jobs: 0,
            source_extension: "vox".to_string(),
            description_extension: "txt".to_string(),
            animated_extension: "vxm".to_string(),
            static_extension: "vox".to_string(),
        }
    }
}

impl ConverterConfig {
    /// Load from an explicit path, falling back to defaults on errors.
    pub fn load_from_path(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<ConverterConfig>(&contents) {
                Ok(cfg) => cfg,
                Err(err) => {
                    warn!("Failed to parse {}: {err}. Using defaults", path.display());
                    ConverterConfig::default()
                }
            },
            Err(err) => {
                if path != Path::new(DEFAULT_CONFIG_PATH)
                    || err.kind() != std::io::ErrorKind::NotFound
                {
                    warn!("Failed to read {}: {err}. Using defaults", path.display());
                } else {
                    info!(
                        "Converter config not found at {}. Using defaults",
                        path.display()
                    );
                }
                ConverterConfig::default()
            }
        }
    }

    /// Output extension for the configured variant.
    pub fn output_extension(&self, variant: MeshVariant) -> &str {
        match variant {
            MeshVariant::Animated => &self.animated_extension,
            MeshVariant::Static => &self.static_extension,
        }
    }
}
