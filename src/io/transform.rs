//! Sources of the canonical-space transform
//!
//! The loader asks a [`TransformLoader`] for the transform at the sibling
//! path of the surface. Parsing of native `.xfm` files is left to callers;
//! the crate ships a JSON matrix reader and fixed/no-op loaders.

use crate::config::SurfaceConfig;
use crate::error::{Result, SurfaceError};
use crate::mesh::LinearTransform;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Something that can produce the transform for a surface
pub trait TransformLoader {
    /// Load the transform expected at `path`
    ///
    /// `Ok(None)` means no transform is available; errors are reported as
    /// diagnostics by the caller and never fail a surface read.
    fn load(&self, path: &Path) -> Result<Option<Arc<LinearTransform>>>;
}

/// Never provides a transform
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTransform;

impl TransformLoader for NoTransform {
    fn load(&self, _path: &Path) -> Result<Option<Arc<LinearTransform>>> {
        Ok(None)
    }
}

/// Always provides the same transform
#[derive(Debug, Clone)]
pub struct FixedTransform(pub Arc<LinearTransform>);

impl TransformLoader for FixedTransform {
    fn load(&self, _path: &Path) -> Result<Option<Arc<LinearTransform>>> {
        Ok(Some(Arc::clone(&self.0)))
    }
}

/// On-disk JSON form: the three affine rows of a 3x4 matrix
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformFile {
    pub rows: [[f64; 4]; 3],
}

/// Reads a [`TransformFile`] from the requested path or a fixed override
#[derive(Debug, Clone, Default)]
pub struct JsonTransformLoader {
    pub override_path: Option<PathBuf>,
}

impl JsonTransformLoader {
    pub fn new(override_path: Option<PathBuf>) -> Self {
        Self { override_path }
    }
}

impl TransformLoader for JsonTransformLoader {
    fn load(&self, path: &Path) -> Result<Option<Arc<LinearTransform>>> {
        let path = self.override_path.as_deref().unwrap_or(path);
        if !path.exists() {
            log::debug!("No transform at {}", path.display());
            return Ok(None);
        }

        let transform = read_transform_json(path)?;
        log::info!("Loaded transform from {}", path.display());
        Ok(Some(Arc::new(transform)))
    }
}

/// Parse a JSON transform file
pub fn read_transform_json(path: &Path) -> Result<LinearTransform> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        SurfaceError::ConfigError(format!("Failed to read transform {}: {}", path.display(), e))
    })?;
    let file: TransformFile = serde_json::from_str(&content).map_err(|e| {
        SurfaceError::ConfigError(format!("Failed to parse transform {}: {}", path.display(), e))
    })?;
    Ok(LinearTransform::from_rows(file.rows))
}

/// Loader selected by a configuration
pub fn transform_loader_for(config: &SurfaceConfig) -> Box<dyn TransformLoader> {
    if !config.load_transform {
        return Box::new(NoTransform);
    }
    Box::new(JsonTransformLoader::new(
        config.transform_file.as_ref().map(PathBuf::from),
    ))
}
