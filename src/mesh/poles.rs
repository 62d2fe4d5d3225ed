//! Cortical pole detection
//!
//! Finds the frontal, occipital and temporal poles of a hemisphere surface.
//! Needs neighbor lists and normals, so it runs after the topology and
//! normal passes.

use crate::mesh::geometry::angle_between_vectors;
use crate::mesh::types::{Poles, Surface, Vec3};
use serde::{Deserialize, Serialize};

/// Thresholds a temporal-pole candidate must satisfy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoleCriteria {
    /// Ceiling on the candidate's Y in the canonical frame
    pub max_talairach_y: f32,

    /// Minimum drop in Z from the frontal pole
    pub min_z_distance: f32,

    /// Minimum drop in Y from the frontal pole
    pub min_y_distance: f32,

    /// Maximum angle between the candidate normal and +Y, in degrees
    pub max_normal_angle: f32,
}

impl Default for PoleCriteria {
    fn default() -> Self {
        Self {
            max_talairach_y: 100.0,
            min_z_distance: 30.0,
            min_y_distance: 30.0,
            max_normal_angle: 30.0,
        }
    }
}

/// Locate all three poles and store them on the surface
pub fn find_poles(surface: &mut Surface, criteria: &PoleCriteria) -> Poles {
    log::debug!(
        "Bounds ({:.0}, {:.0}, {:.0}) --> ({:.0}, {:.0}, {:.0}), center ({:.0}, {:.0}, {:.0})",
        surface.bounds.lo.x,
        surface.bounds.lo.y,
        surface.bounds.lo.z,
        surface.bounds.hi.x,
        surface.bounds.hi.y,
        surface.bounds.hi.z,
        surface.center.x,
        surface.center.y,
        surface.center.z
    );

    let (frontal, occipital) = find_extreme_poles(surface);
    let temporal = frontal.and_then(|f| find_temporal_pole(surface, f, criteria));

    let poles = Poles {
        frontal,
        occipital,
        temporal,
    };
    surface.poles = poles;

    match temporal {
        Some(t) => log::info!(
            "Poles: frontal {:?}, temporal {}, occipital {:?}",
            frontal,
            t,
            occipital
        ),
        None => log::info!(
            "Poles: frontal {:?}, temporal NOT FOUND, occipital {:?}",
            frontal,
            occipital
        ),
    }

    poles
}

/// First vertex reaching the maximum and minimum Y bounds
pub fn find_extreme_poles(surface: &Surface) -> (Option<usize>, Option<usize>) {
    let mut frontal = None;
    let mut occipital = None;

    for (vno, vertex) in surface.vertices.iter().enumerate() {
        if frontal.is_none() && vertex.position.y >= surface.bounds.hi.y {
            frontal = Some(vno);
        }
        if occipital.is_none() && vertex.position.y <= surface.bounds.lo.y {
            occipital = Some(vno);
        }
    }

    (frontal, occipital)
}

/// Highest qualifying temporal-pole candidate, if any
///
/// Candidates are scanned once in index order, keeping the one with the
/// greatest Y seen so far.
pub fn find_temporal_pole(
    surface: &Surface,
    frontal: usize,
    criteria: &PoleCriteria,
) -> Option<usize> {
    let front = surface.vertices[frontal].position;
    let anterior = Vec3::y();
    let mut best: Option<(usize, f32)> = None;

    for (vno, vertex) in surface.vertices.iter().enumerate() {
        let p = vertex.position;
        let yt = canonical_y(surface, p.x, p.y, p.z);

        if yt >= criteria.max_talairach_y
            || front.z - p.z <= criteria.min_z_distance
            || front.y - p.y <= criteria.min_y_distance
        {
            continue;
        }
        if best.is_some_and(|(_, y_hi)| p.y <= y_hi) {
            continue;
        }

        let local_max = vertex
            .neighbors
            .iter()
            .all(|&n| surface.vertices[n].position.y <= p.y);
        if local_max
            && angle_between_vectors(&vertex.normal, &anterior) < criteria.max_normal_angle
        {
            best = Some((vno, p.y));
        }
    }

    best.map(|(vno, _)| vno)
}

/// Y of a point in the canonical frame
///
/// Axes are permuted (x, y, z) -> (-x, z, y) before the optional transform.
fn canonical_y(surface: &Surface, x: f32, y: f32, z: f32) -> f32 {
    match &surface.transform {
        Some(xform) => {
            let (_, yt, _) = xform.transform_point(-(x as f64), z as f64, y as f64);
            yt as f32
        }
        None => z,
    }
}
