//! Derived surfaces: clone, recenter, ellipsoid projection, Talairach mapping
//!
//! Every derivation allocates (or reuses a caller-supplied) destination with
//! its own vertex and face arrays. The only state a derived surface shares
//! with its source is the read-only affine transform handle.

use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::error::{Result, SurfaceError};
use crate::mesh::geometry::compute_normals;
use crate::mesh::types::{Bounds, Point, PoleKind, Surface, Vertex};
use serde::{Deserialize, Serialize};

/// An `a` axis below this magnitude selects the default axes
const ZERO_AXIS: f32 = 1e-5;

/// Semi-axes of the projection ellipsoid along x, y and z
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EllipsoidAxes {
    pub a: f32,
    pub b: f32,
    pub c: f32,
}

impl Default for EllipsoidAxes {
    fn default() -> Self {
        Self {
            a: 45.0,
            b: 130.0,
            c: 75.0,
        }
    }
}

impl EllipsoidAxes {
    /// Create new axes
    pub fn new(a: f32, b: f32, c: f32) -> Self {
        Self { a, b, c }
    }

    /// The axes to actually use: the defaults replace everything when `a` is zero
    pub fn resolved(&self) -> Self {
        if self.a.abs() < ZERO_AXIS {
            Self::default()
        } else {
            *self
        }
    }

    /// Implicit ellipsoid value `(x/a)^2 + (y/b)^2 + (z/c)^2` at a point
    pub fn implicit(&self, p: &Point) -> f32 {
        (p.x / self.a).powi(2) + (p.y / self.b).powi(2) + (p.z / self.c).powi(2)
    }
}

/// Deep copy of a surface with every curvature value negated
///
/// Topology, geometry, aggregates and pole indices are copied unchanged; the
/// transform handle is shared. Tether marks are not carried over. Callers
/// must account for the curvature sign flip.
pub fn clone_surface(src: &Surface) -> Surface {
    let vertices = src
        .vertices
        .iter()
        .map(|v| Vertex {
            curv: -v.curv,
            tethered: None,
            ..v.clone()
        })
        .collect();

    Surface {
        vertices,
        faces: src.faces.clone(),
        bounds: src.bounds,
        center: src.center,
        hemisphere: src.hemisphere,
        min_curv: src.min_curv,
        max_curv: src.max_curv,
        total_area: src.total_area,
        poles: src.poles,
        transform: src.transform.clone(),
    }
}

/// Translate the destination so the source center sits at the origin
///
/// The source's center is reset to zero as a side effect; its vertices and
/// bounds are left alone.
pub fn recenter(src: &mut Surface, dst: Option<Surface>) -> Result<Surface> {
    let mut dst = destination(src, dst)?;
    let offset = src.center.coords;

    for vertex in &mut dst.vertices {
        vertex.position -= offset;
    }

    src.center = Point::origin();
    Ok(dst)
}

/// Radially project the surface onto an ellipsoid centered at the origin
///
/// Each vertex's offset from the destination's center is scaled by
/// `abc / sqrt(b²c²x² + a²c²y² + a²b²z²)`. Located poles are then pinned to
/// the ellipsoid's axis extremes and tethered, and normals are recomputed.
pub fn project_onto_ellipsoid(
    src: &Surface,
    dst: Option<Surface>,
    axes: &EllipsoidAxes,
    sink: &mut dyn DiagnosticSink,
) -> Result<Surface> {
    let EllipsoidAxes { a, b, c } = axes.resolved();
    log::info!("Projecting onto ellipsoid ({}, {}, {})", a, b, c);

    let mut dst = destination(src, dst)?;
    let center = dst.center;
    let asq_bsq = a * a * b * b;
    let asq_csq = a * a * c * c;
    let bsq_csq = b * b * c * c;
    let abc = a * b * c;

    for (vno, (vsrc, vdst)) in src.vertices.iter().zip(dst.vertices.iter_mut()).enumerate() {
        let d = vsrc.position - center;
        let denom = (bsq_csq * d.x * d.x + asq_csq * d.y * d.y + asq_bsq * d.z * d.z).sqrt();

        if denom > 0.0 {
            vdst.position = Point::from(d * (abc / denom));
        } else {
            vdst.position = Point::origin();
            sink.report(Diagnostic::DegenerateProjection { vertex: vno });
        }
    }

    let anchors = [
        (PoleKind::Temporal, Point::new(0.0, 0.0, -c)),
        (PoleKind::Frontal, Point::new(0.0, b, 0.0)),
        (PoleKind::Occipital, Point::new(0.0, -b, 0.0)),
    ];
    for (kind, anchor) in anchors {
        if let Some(vno) = dst.poles.get(kind) {
            let vertex = &mut dst.vertices[vno];
            vertex.position = anchor;
            vertex.tethered = Some(kind);
        }
    }

    compute_normals(&mut dst, sink);
    Ok(dst)
}

/// Map every vertex through the surface's affine transform
///
/// Input axes are permuted (x, y, z) -> (-x, z, y) before the transform and
/// the result (xt, yt, zt) is stored as (-xt, zt, yt). Only the low bounds and
/// the center are refreshed afterward; the high bounds keep their old values.
pub fn talairach_transform(src: &Surface, dst: Option<Surface>) -> Result<Surface> {
    let xform = src.transform.clone().ok_or(SurfaceError::MissingTransform)?;
    let mut dst = destination(src, dst)?;

    for vertex in &mut dst.vertices {
        let p = vertex.position;
        let (xt, yt, zt) = xform.transform_point(-(p.x as f64), p.z as f64, p.y as f64);
        vertex.position = Point::new(-xt as f32, zt as f32, yt as f32);
    }

    let mapped = Bounds::from_points(dst.vertices.iter().map(|v| &v.position));
    dst.bounds.lo = mapped.lo;
    dst.center = mapped.center();

    Ok(dst)
}

/// Use the caller's destination when it matches the source, else a clone
fn destination(src: &Surface, dst: Option<Surface>) -> Result<Surface> {
    match dst {
        Some(dst) if dst.num_vertices() != src.num_vertices() => {
            Err(SurfaceError::InvalidMeshTopology(format!(
                "Destination has {} vertices, source has {}",
                dst.num_vertices(),
                src.num_vertices()
            )))
        }
        Some(dst) => Ok(dst),
        None => Ok(clone_surface(src)),
    }
}
