//! Neighbor discovery from face incidence

use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::mesh::types::{next_corner, prev_corner, Surface};

/// Build neighbor lists, then run the incidence consistency check
///
/// Returns the number of incidence mismatches reported to `sink`. The pass
/// itself never fails.
pub fn build_topology(surface: &mut Surface, sink: &mut dyn DiagnosticSink) -> usize {
    log::debug!("Finding surface neighbors...");
    find_neighbors(surface);
    let mismatches = check_incidence(surface, sink);
    log::debug!("Neighbor search done ({} incidence mismatches)", mismatches);
    mismatches
}

/// Fill every vertex's neighbor list from its incident faces
///
/// For each incident face, the corners before and after the vertex's own
/// corner are candidates. A candidate is appended only if not already present
/// and never when it is the vertex itself (packed triangles repeat a slot).
pub fn find_neighbors(surface: &mut Surface) {
    for vno in 0..surface.vertices.len() {
        let neighbors = {
            let vertex = &surface.vertices[vno];
            let mut neighbors: Vec<usize> = Vec::with_capacity(vertex.num() * 2);

            for (&fno, &corner) in vertex.faces.iter().zip(&vertex.corners) {
                let face = &surface.faces[fno];
                let n = corner as usize;
                for candidate in [face.v[prev_corner(n)], face.v[next_corner(n)]] {
                    // linear scan, degree is small
                    if candidate != vno && !neighbors.contains(&candidate) {
                        neighbors.push(candidate);
                    }
                }
            }
            neighbors
        };

        surface.vertices[vno].neighbors = neighbors;
    }
}

/// Verify that every face corner is listed in its vertex's incident faces
///
/// Mismatches are reported to `sink`; the count is returned so callers that
/// want a hard gate can build one.
pub fn check_incidence(surface: &Surface, sink: &mut dyn DiagnosticSink) -> usize {
    let mut mismatches = 0;

    for (fno, face) in surface.faces.iter().enumerate() {
        for (corner, &vno) in face.v.iter().enumerate() {
            if !surface.vertices[vno].faces.contains(&fno) {
                sink.report(Diagnostic::IncidenceMismatch {
                    face: fno,
                    corner,
                    vertex: vno,
                });
                mismatches += 1;
            }
        }
    }

    mismatches
}
