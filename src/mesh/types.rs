//! Core surface data structures
//!
//! Vertices and faces live in flat, index-addressed arrays. Every cross
//! reference (vertex to incident faces, vertex to neighbors, surface to pole
//! vertices) is an index into one of those arrays.

use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::error::{Result, SurfaceError};
use nalgebra::{Matrix4, Point3, Vector3, Vector4};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// 3D point type
pub type Point = Point3<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// Number of vertex slots in every face record
pub const FACE_CORNERS: usize = 4;

/// Sentinel stored in [`Vertex::orig_area`] until an area has been computed
pub const UNSET_AREA: f32 = -1.0;

/// Previous corner of a face, cyclic within the four slots
#[inline]
pub fn prev_corner(n: usize) -> usize {
    (n + FACE_CORNERS - 1) % FACE_CORNERS
}

/// Next corner of a face, cyclic within the four slots
#[inline]
pub fn next_corner(n: usize) -> usize {
    (n + 1) % FACE_CORNERS
}

/// Face with four vertex slots
///
/// Triangles use the same record; the slots are passed through exactly as
/// stored on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Face {
    /// Vertex indices in stored order
    pub v: [usize; FACE_CORNERS],

    /// Excluded from normal/area accumulation
    pub ripped: bool,
}

impl Face {
    /// Create a new face
    pub fn new(v: [usize; FACE_CORNERS]) -> Self {
        Self { v, ripped: false }
    }

    /// The `n`-th slot (in slot order) occupied by `vertex`
    pub fn nth_corner_of(&self, vertex: usize, n: usize) -> Option<usize> {
        self.v
            .iter()
            .enumerate()
            .filter(|&(_, &v)| v == vertex)
            .nth(n)
            .map(|(slot, _)| slot)
    }
}

/// Anatomical landmark vertex kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoleKind {
    Frontal,
    Occipital,
    Temporal,
}

/// Surface vertex with its incidence and adjacency lists
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    pub position: Point,

    /// Unit normal, or zero when no incident face contributed
    pub normal: Vec3,

    pub curv: f32,

    /// Area accumulated by the last normal pass (overestimated, see geometry)
    pub area: f32,

    /// Baseline area; negative until the first area computation
    pub orig_area: f32,

    pub border: bool,

    /// Excluded from geometry
    pub ripped: bool,

    /// Set when the vertex is pinned to a canonical location
    pub tethered: Option<PoleKind>,

    /// Incident faces, one entry per corner occupied
    pub faces: Vec<usize>,

    /// Corner this vertex occupies in the parallel entry of `faces`
    pub corners: Vec<u8>,

    /// Unique neighboring vertices, filled by the topology pass
    pub neighbors: Vec<usize>,
}

impl Vertex {
    /// Create a vertex at `position` with freshly initialized fields
    pub fn new(position: Point) -> Self {
        Self {
            position,
            normal: Vec3::zeros(),
            curv: 0.0,
            area: 0.0,
            orig_area: UNSET_AREA,
            border: false,
            ripped: false,
            tethered: None,
            faces: Vec::new(),
            corners: Vec::new(),
            neighbors: Vec::new(),
        }
    }

    /// Incident-face count
    pub fn num(&self) -> usize {
        self.faces.len()
    }

    /// Neighbor-vertex count
    pub fn vnum(&self) -> usize {
        self.neighbors.len()
    }
}

/// Axis-aligned bounds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub lo: Point,
    pub hi: Point,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            lo: Point::origin(),
            hi: Point::origin(),
        }
    }
}

impl Bounds {
    /// Compute the bounds of a set of points; empty input yields zero bounds
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point>) -> Self {
        let mut iter = points.into_iter();
        let Some(first) = iter.next() else {
            return Self::default();
        };

        iter.fold(
            Self {
                lo: *first,
                hi: *first,
            },
            |b, p| Self {
                lo: b.lo.inf(p),
                hi: b.hi.sup(p),
            },
        )
    }

    /// Midpoint of the bounds
    pub fn center(&self) -> Point {
        nalgebra::center(&self.lo, &self.hi)
    }
}

/// Hemisphere a surface belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Hemisphere {
    #[default]
    Left,
    Right,
}

impl Hemisphere {
    /// Right hemisphere when the file name mentions "rh", left otherwise
    ///
    /// Only the file name is inspected. Callers pass the final path
    /// component, so a directory such as `/data/rhesus/` does not make a
    /// left surface right.
    pub fn from_file_name(name: &str) -> Self {
        if name.contains("rh") {
            Hemisphere::Right
        } else {
            Hemisphere::Left
        }
    }
}

/// Pole vertex indices; `None` until located
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Poles {
    pub frontal: Option<usize>,
    pub occipital: Option<usize>,
    pub temporal: Option<usize>,
}

impl Poles {
    /// Vertex index of the given pole
    pub fn get(&self, kind: PoleKind) -> Option<usize> {
        match kind {
            PoleKind::Frontal => self.frontal,
            PoleKind::Occipital => self.occipital,
            PoleKind::Temporal => self.temporal,
        }
    }
}

/// Affine transform into the canonical (Talairach) frame
///
/// Loaded by an external collaborator and shared read-only between a
/// surface and everything derived from it.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearTransform {
    matrix: Matrix4<f64>,
}

impl LinearTransform {
    /// Build a transform from the three affine rows `[r00 r01 r02 t0]`, ...
    pub fn from_rows(rows: [[f64; 4]; 3]) -> Self {
        let mut matrix = Matrix4::identity();
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                matrix[(r, c)] = *value;
            }
        }
        Self { matrix }
    }

    /// Identity transform
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Map a point through the transform
    pub fn transform_point(&self, x: f64, y: f64, z: f64) -> (f64, f64, f64) {
        let p = self.matrix * Vector4::new(x, y, z, 1.0);
        (p.x, p.y, p.z)
    }
}

/// Complete surface representation
#[derive(Debug, Clone)]
pub struct Surface {
    pub vertices: Vec<Vertex>,
    pub faces: Vec<Face>,
    pub bounds: Bounds,

    /// Center of the bounds at load time; mutated independently by recentering
    pub center: Point,

    pub hemisphere: Hemisphere,
    pub min_curv: f32,
    pub max_curv: f32,
    pub total_area: f32,
    pub poles: Poles,
    pub transform: Option<Arc<LinearTransform>>,
}

impl Surface {
    /// Build a surface from positions and face slots
    ///
    /// Incident-face lists are reconstructed in two passes: corner counts
    /// first, then a fill that records the corner each entry occupies.
    pub fn from_quads(positions: Vec<Point>, faces: Vec<[usize; FACE_CORNERS]>) -> Result<Self> {
        validate_face_indices(&faces, positions.len())?;

        let mut counts = vec![0usize; positions.len()];
        for face in &faces {
            for &v in face {
                counts[v] += 1;
            }
        }

        let mut vertices: Vec<Vertex> = positions
            .into_iter()
            .zip(counts)
            .map(|(position, count)| {
                let mut vertex = Vertex::new(position);
                vertex.faces = Vec::with_capacity(count);
                vertex.corners = Vec::with_capacity(count);
                vertex
            })
            .collect();

        for (fno, face) in faces.iter().enumerate() {
            for (n, &v) in face.iter().enumerate() {
                vertices[v].faces.push(fno);
                vertices[v].corners.push(n as u8);
            }
        }

        Ok(Self::assemble(vertices, faces))
    }

    /// Build a surface whose incident-face lists are already known
    ///
    /// Local corners are recovered by scanning each incident face for the
    /// vertex. A face listed k times takes its k-th matching slot, so packed
    /// triangles get the same corners as [`Surface::from_quads`]. Entries with
    /// no matching slot left are dropped and reported to `sink`.
    pub fn from_incidence(
        positions: Vec<Point>,
        incident_faces: Vec<Vec<usize>>,
        faces: Vec<[usize; FACE_CORNERS]>,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<Self> {
        validate_face_indices(&faces, positions.len())?;

        let mut vertices = Vec::with_capacity(positions.len());
        for (vno, (position, incident)) in positions.into_iter().zip(incident_faces).enumerate() {
            let mut vertex = Vertex::new(position);
            vertex.faces = Vec::with_capacity(incident.len());
            vertex.corners = Vec::with_capacity(incident.len());

            for (k, &fno) in incident.iter().enumerate() {
                let face = faces.get(fno).ok_or_else(|| {
                    SurfaceError::InvalidMeshTopology(format!(
                        "Vertex {} references face {} of {}",
                        vno,
                        fno,
                        faces.len()
                    ))
                })?;
                let seen = incident[..k].iter().filter(|&&f| f == fno).count();
                match Face::new(*face).nth_corner_of(vno, seen) {
                    Some(corner) => {
                        vertex.faces.push(fno);
                        vertex.corners.push(corner as u8);
                    }
                    None => sink.report(Diagnostic::StrayIncidence {
                        vertex: vno,
                        face: fno,
                    }),
                }
            }
            vertices.push(vertex);
        }

        Ok(Self::assemble(vertices, faces))
    }

    fn assemble(vertices: Vec<Vertex>, faces: Vec<[usize; FACE_CORNERS]>) -> Self {
        let bounds = Bounds::from_points(vertices.iter().map(|v| &v.position));

        Self {
            vertices,
            faces: faces.into_iter().map(Face::new).collect(),
            bounds,
            center: bounds.center(),
            hemisphere: Hemisphere::default(),
            min_curv: 0.0,
            max_curv: 0.0,
            total_area: 0.0,
            poles: Poles::default(),
            transform: None,
        }
    }

    /// Get total number of vertices
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Get total number of faces
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Recompute bounds and center from the current vertex positions
    pub fn update_bounds(&mut self) {
        self.bounds = Bounds::from_points(self.vertices.iter().map(|v| &v.position));
        self.center = self.bounds.center();
    }

    /// Position of a located pole
    pub fn pole_position(&self, kind: PoleKind) -> Option<Point> {
        self.poles.get(kind).map(|vno| self.vertices[vno].position)
    }
}

fn validate_face_indices(faces: &[[usize; FACE_CORNERS]], num_vertices: usize) -> Result<()> {
    for (fno, face) in faces.iter().enumerate() {
        if let Some(&v) = face.iter().find(|&&v| v >= num_vertices) {
            return Err(SurfaceError::InvalidMeshTopology(format!(
                "Face {} references vertex {} of {}",
                fno, v, num_vertices
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::VecSink;
    use approx::assert_relative_eq;

    fn unit_square() -> Surface {
        let positions = vec![
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 0.0, 0.0),
            Point::new(1.0, 1.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
        ];
        Surface::from_quads(positions, vec![[0, 1, 2, 3]]).unwrap()
    }

    #[test]
    fn test_corner_cycle() {
        assert_eq!(prev_corner(0), 3);
        assert_eq!(next_corner(3), 0);
        assert_eq!(prev_corner(2), 1);
        assert_eq!(next_corner(1), 2);
    }

    #[test]
    fn test_from_quads_builds_incidence() {
        let surface = unit_square();

        assert_eq!(surface.num_vertices(), 4);
        assert_eq!(surface.num_faces(), 1);
        for (vno, vertex) in surface.vertices.iter().enumerate() {
            assert_eq!(vertex.faces, vec![0]);
            assert_eq!(vertex.corners, vec![vno as u8]);
            assert_eq!(vertex.orig_area, UNSET_AREA);
            assert_eq!(vertex.curv, 0.0);
        }
    }

    #[test]
    fn test_packed_triangle_counts_each_corner() {
        let positions = vec![
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 0.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
        ];
        let surface = Surface::from_quads(positions, vec![[0, 1, 2, 2]]).unwrap();

        assert_eq!(surface.vertices[2].num(), 2);
        assert_eq!(surface.vertices[2].corners, vec![2, 3]);
        assert_eq!(surface.faces[0].v, [0, 1, 2, 2]);
    }

    #[test]
    fn test_from_quads_rejects_bad_index() {
        let positions = vec![Point::new(0.0, 0.0, 0.0)];
        let result = Surface::from_quads(positions, vec![[0, 0, 0, 5]]);
        assert!(matches!(result, Err(SurfaceError::InvalidMeshTopology(_))));
    }

    #[test]
    fn test_from_incidence_recovers_corners() {
        let positions = vec![
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 0.0, 0.0),
            Point::new(1.0, 1.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
        ];
        let incidence = vec![vec![0], vec![0], vec![0], vec![0]];
        let mut sink = VecSink::new();
        let surface =
            Surface::from_incidence(positions, incidence, vec![[2, 3, 0, 1]], &mut sink).unwrap();

        assert_eq!(surface.vertices[0].corners, vec![2]);
        assert_eq!(surface.vertices[2].corners, vec![0]);
        assert!(sink.diagnostics.is_empty());
    }

    #[test]
    fn test_from_incidence_repeated_face_takes_successive_slots() {
        let positions = vec![
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 0.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
        ];
        let incidence = vec![vec![0], vec![0], vec![0, 0]];
        let surface = Surface::from_incidence(
            positions.clone(),
            incidence,
            vec![[0, 1, 2, 2]],
            &mut VecSink::new(),
        )
        .unwrap();
        let quads = Surface::from_quads(positions, vec![[0, 1, 2, 2]]).unwrap();

        assert_eq!(surface.vertices[2].faces, vec![0, 0]);
        assert_eq!(surface.vertices[2].corners, vec![2, 3]);
        for (a, b) in surface.vertices.iter().zip(&quads.vertices) {
            assert_eq!(a.corners, b.corners);
        }
    }

    #[test]
    fn test_from_incidence_drops_stray_entries() {
        let positions = vec![
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 0.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
            Point::new(5.0, 5.0, 0.0),
        ];
        // vertex 3 is not in face 0; vertex 1 lists face 0 once too often
        let incidence = vec![vec![0], vec![0, 0], vec![0, 0], vec![0]];
        let mut sink = VecSink::new();
        let surface =
            Surface::from_incidence(positions, incidence, vec![[0, 1, 2, 2]], &mut sink).unwrap();

        assert!(surface.vertices[3].faces.is_empty());
        assert!(surface.vertices[3].corners.is_empty());
        assert_eq!(surface.vertices[1].faces, vec![0]);
        assert_eq!(surface.vertices[1].corners, vec![1]);
        assert_eq!(
            sink.diagnostics,
            vec![
                Diagnostic::StrayIncidence { vertex: 1, face: 0 },
                Diagnostic::StrayIncidence { vertex: 3, face: 0 },
            ]
        );
        assert_eq!(sink.incidence_mismatches(), 2);
    }

    #[test]
    fn test_nth_corner_of() {
        let face = Face::new([4, 7, 7, 9]);
        assert_eq!(face.nth_corner_of(7, 0), Some(1));
        assert_eq!(face.nth_corner_of(7, 1), Some(2));
        assert_eq!(face.nth_corner_of(7, 2), None);
        assert_eq!(face.nth_corner_of(5, 0), None);
    }

    #[test]
    fn test_bounds_and_center() {
        let surface = unit_square();
        assert_relative_eq!(surface.bounds.hi.x, 1.0);
        assert_relative_eq!(surface.bounds.lo.y, 0.0);
        assert_relative_eq!(surface.center.x, 0.5);
        assert_relative_eq!(surface.center.y, 0.5);
        assert_relative_eq!(surface.center.z, 0.0);
    }

    #[test]
    fn test_empty_bounds() {
        let bounds = Bounds::from_points(std::iter::empty::<&Point>());
        assert_eq!(bounds, Bounds::default());
    }

    #[test]
    fn test_hemisphere_from_name() {
        assert_eq!(Hemisphere::from_file_name("rh.white"), Hemisphere::Right);
        assert_eq!(Hemisphere::from_file_name("lh.orig"), Hemisphere::Left);
    }

    #[test]
    fn test_linear_transform_applies_translation() {
        let xform = LinearTransform::from_rows([
            [1.0, 0.0, 0.0, 5.0],
            [0.0, 2.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, -1.0],
        ]);
        let (x, y, z) = xform.transform_point(1.0, 1.0, 1.0);
        assert_relative_eq!(x, 6.0);
        assert_relative_eq!(y, 2.0);
        assert_relative_eq!(z, 0.0);
    }
}
