//! Surface data structures and passes

pub mod factory;
pub mod geometry;
pub mod poles;
pub mod topology;
pub mod types;

pub use factory::*;
pub use geometry::*;
pub use poles::*;
pub use topology::*;
pub use types::*;

use crate::diagnostics::DiagnosticSink;

/// Run the topology, normal and pole passes on an in-memory surface
///
/// Returns the number of incidence mismatches found by the topology pass.
pub fn prepare(
    surface: &mut Surface,
    criteria: &PoleCriteria,
    sink: &mut dyn DiagnosticSink,
) -> usize {
    let mismatches = build_topology(surface, sink);
    compute_normals(surface, sink);
    find_poles(surface, criteria);
    mismatches
}
