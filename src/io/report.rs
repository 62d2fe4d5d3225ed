//! JSON summary of a ready surface

use crate::error::{Result, SurfaceError};
use crate::io::surface::FormatKind;
use crate::mesh::{total_vertex_area, Hemisphere, Poles, Surface};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Summary written by the `info` command
#[derive(Debug, Serialize, Deserialize)]
pub struct SurfaceReport {
    /// Source surface file
    pub surface_file: String,

    /// Timestamp when the report was produced
    pub timestamp: String,

    pub format: Option<String>,
    pub hemisphere: Hemisphere,
    pub num_vertices: usize,
    pub num_faces: usize,
    pub bounds_lo: [f32; 3],
    pub bounds_hi: [f32; 3],
    pub center: [f32; 3],
    pub min_curv: f32,
    pub max_curv: f32,

    /// Total from the area side-file, zero when none was read
    pub total_area: f32,

    /// Total from the last normal pass
    pub computed_area: f32,

    pub border_vertices: usize,
    pub poles: Poles,
}

impl SurfaceReport {
    pub fn new(surface_file: String, format: Option<FormatKind>, surface: &Surface) -> Self {
        Self {
            surface_file,
            timestamp: chrono::Utc::now().to_rfc3339(),
            format: format.map(|f| f.to_string()),
            hemisphere: surface.hemisphere,
            num_vertices: surface.num_vertices(),
            num_faces: surface.num_faces(),
            bounds_lo: surface.bounds.lo.coords.into(),
            bounds_hi: surface.bounds.hi.coords.into(),
            center: surface.center.coords.into(),
            min_curv: surface.min_curv,
            max_curv: surface.max_curv,
            total_area: surface.total_area,
            computed_area: total_vertex_area(surface),
            border_vertices: surface.vertices.iter().filter(|v| v.border).count(),
            poles: surface.poles,
        }
    }

    /// Export the report to a JSON file
    pub fn export<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path.as_ref())?;
        serde_json::to_writer_pretty(file, self).map_err(|e| {
            SurfaceError::ConfigError(format!("Failed to write JSON report: {}", e))
        })?;
        Ok(())
    }

    /// Render the report as pretty JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| SurfaceError::ConfigError(format!("Failed to serialize report: {}", e)))
    }
}
