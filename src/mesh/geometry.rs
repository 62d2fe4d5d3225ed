//! Per-vertex normals and areas
//!
//! The accumulation follows the legacy surface tools exactly:
//!
//! - the normal contribution of a face corner is the cross product of the
//!   two *normalized* edge vectors meeting at that corner, so every face
//!   counts equally regardless of its size;
//! - the area contribution is half the magnitude of the cross product of the
//!   *raw* edge vectors. For quads this overestimates the true area; only the
//!   surface-wide total is ever corrected (halved once).

use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::mesh::types::{next_corner, prev_corner, Surface, Vec3};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Vertex count above which the accumulation runs on the rayon pool
#[cfg(feature = "parallel")]
const PARALLEL_THRESHOLD: usize = 5000;

/// Compute normals and areas for every non-ripped vertex
///
/// Faces with the rip flag set mark their four vertices as border vertices
/// and are skipped. A vertex whose original area is still unset adopts the
/// freshly computed area as its baseline.
pub fn compute_normals(surface: &mut Surface, sink: &mut dyn DiagnosticSink) {
    log::debug!("Computing surface normals...");

    for fno in 0..surface.faces.len() {
        if surface.faces[fno].ripped {
            let corners = surface.faces[fno].v;
            for vno in corners {
                surface.vertices[vno].border = true;
            }
            sink.report(Diagnostic::RippedFace { face: fno });
        }
    }

    let shared: &Surface = surface;
    let accumulate = |vno: usize| {
        (!shared.vertices[vno].ripped).then(|| accumulate_vertex(shared, vno))
    };

    #[cfg(feature = "parallel")]
    let sums: Vec<Option<(Vec3, f32)>> = if shared.vertices.len() >= PARALLEL_THRESHOLD {
        (0..shared.vertices.len()).into_par_iter().map(accumulate).collect()
    } else {
        (0..shared.vertices.len()).map(accumulate).collect()
    };

    #[cfg(not(feature = "parallel"))]
    let sums: Vec<Option<(Vec3, f32)>> = (0..shared.vertices.len()).map(accumulate).collect();

    for (vertex, sum) in surface.vertices.iter_mut().zip(sums) {
        let Some((normal_sum, area)) = sum else {
            continue;
        };
        vertex.normal = normalize_or_zero(normal_sum);
        vertex.area = area;
        if vertex.orig_area < 0.0 {
            vertex.orig_area = area;
        }
    }

    log::debug!("Normals done");
}

fn accumulate_vertex(surface: &Surface, vno: usize) -> (Vec3, f32) {
    let vertex = &surface.vertices[vno];
    let mut normal_sum = Vec3::zeros();
    let mut area = 0.0;

    for (&fno, &corner) in vertex.faces.iter().zip(&vertex.corners) {
        if surface.faces[fno].ripped {
            continue;
        }
        let (e0, e1) = corner_edges(surface, fno, corner as usize);
        normal_sum += normalize_or_zero(e0).cross(&normalize_or_zero(e1));
        area += e0.cross(&e1).norm() / 2.0;
    }

    (normal_sum, area)
}

/// Edge vectors at a face corner: previous corner to this corner, and this
/// corner to the next one
pub fn corner_edges(surface: &Surface, fno: usize, corner: usize) -> (Vec3, Vec3) {
    let face = &surface.faces[fno];
    let p_prev = surface.vertices[face.v[prev_corner(corner)]].position;
    let p = surface.vertices[face.v[corner]].position;
    let p_next = surface.vertices[face.v[next_corner(corner)]].position;

    (p - p_prev, p_next - p)
}

/// Direction-only normal contribution of a face corner (not unit length)
pub fn corner_normal(surface: &Surface, fno: usize, corner: usize) -> Vec3 {
    let (e0, e1) = corner_edges(surface, fno, corner);
    normalize_or_zero(e0).cross(&normalize_or_zero(e1))
}

/// Triangle-style area contribution of a face corner
pub fn corner_area(surface: &Surface, fno: usize, corner: usize) -> f32 {
    let (e0, e1) = corner_edges(surface, fno, corner);
    e0.cross(&e1).norm() / 2.0
}

/// Normalize a vector, leaving a zero-length vector as zero
pub fn normalize_or_zero(v: Vec3) -> Vec3 {
    v.try_normalize(0.0).unwrap_or_else(Vec3::zeros)
}

/// Sum of per-vertex areas, halved once to undo the per-vertex overestimate
pub fn total_vertex_area(surface: &Surface) -> f32 {
    surface.vertices.iter().map(|v| v.area).sum::<f32>() / 2.0
}

/// Compute the angle between two vectors in degrees
pub fn angle_between_vectors(v1: &Vec3, v2: &Vec3) -> f32 {
    let norm_product = v1.norm() * v2.norm();

    if norm_product < 1e-12 {
        return 90.0;
    }

    let cos_angle = (v1.dot(v2) / norm_product).clamp(-1.0, 1.0);
    cos_angle.acos().to_degrees()
}
