//! Binary surface file reader and writer
//!
//! All integers are big-endian. The file starts with an optional 3-byte magic
//! number; when it is absent the stream is the legacy layout.
//!
//! ```text
//! [magic: u24 = 0xFFFFFF]            new format only
//! nvertices: u24
//! nfaces: u24
//! per vertex: x, y, z as i16 (hundredths)
//!             legacy only: num: u8, then num face indices (u24)
//! per face:   4 vertex indices (u24)
//! ```

use crate::config::SurfaceConfig;
use crate::diagnostics::{Diagnostic, DiagnosticSink, LogSink};
use crate::error::{Result, SurfaceError};
use crate::io::sidefile::{read_areas, read_curvature, side_file_path, transform_path};
use crate::io::transform::{transform_loader_for, TransformLoader};
use crate::mesh::{
    build_topology, compute_normals, find_poles, Hemisphere, Point, Surface, FACE_CORNERS,
};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::fmt;
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};

/// Magic number announcing the new surface layout
pub const NEW_VERSION_MAGIC: u32 = 0x00FF_FFFF;

/// Fixed-point scale of stored coordinates
pub const COORD_SCALE: f32 = 100.0;

const MAX_U24: usize = 0x00FF_FFFF;

/// On-disk layout of a surface file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatKind {
    /// Incident-face lists stored inline with each vertex
    Legacy,
    /// Magic-prefixed; incident-face lists rebuilt from the face list
    New,
}

impl FormatKind {
    /// Inspect the first three bytes of a stream
    pub fn detect(bytes: &[u8]) -> Self {
        match bytes {
            [a, b, c, ..] if u32::from_be_bytes([0, *a, *b, *c]) == NEW_VERSION_MAGIC => {
                FormatKind::New
            }
            _ => FormatKind::Legacy,
        }
    }
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatKind::Legacy => write!(f, "legacy"),
            FormatKind::New => write!(f, "new"),
        }
    }
}

/// Binary surface file reader
pub struct SurfaceReader {
    path: PathBuf,
    bytes: Vec<u8>,
    format: FormatKind,
}

impl SurfaceReader {
    /// Open a surface file for reading
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let bytes = std::fs::read(&path).map_err(|e| {
            SurfaceError::FileNotFound(format!("{}: {}", path.display(), e))
        })?;
        let format = FormatKind::detect(&bytes);
        log::info!("{} surface file format: {}", format, path.display());

        Ok(Self {
            path,
            bytes,
            format,
        })
    }

    /// Layout detected from the magic number
    pub fn format(&self) -> FormatKind {
        self.format
    }

    /// Decode vertices, faces and incidence only, logging diagnostics
    pub fn read_mesh(&self) -> Result<Surface> {
        self.read_mesh_with(&mut LogSink)
    }

    /// Decode vertices, faces and incidence only
    ///
    /// The hemisphere is taken from the final file-name component, not from
    /// the directories above it.
    pub fn read_mesh_with(&self, sink: &mut dyn DiagnosticSink) -> Result<Surface> {
        let mut surface = decode_surface_with(&self.bytes, sink)?;
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        surface.hemisphere = Hemisphere::from_file_name(&name);
        Ok(surface)
    }

    /// Decode the surface and run every pass needed to make it ready
    ///
    /// Topology and normals are computed first, then the transform and the
    /// curvature/area side-files are ingested, then the poles are located.
    /// Transform and side-file problems are reported to `sink` and do not
    /// fail the read.
    pub fn read_surface(
        &self,
        config: &SurfaceConfig,
        transforms: &dyn TransformLoader,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<Surface> {
        let mut surface = self.read_mesh_with(sink)?;

        build_topology(&mut surface, sink);
        compute_normals(&mut surface, sink);

        if config.load_transform {
            let xfm = transform_path(&self.path);
            match transforms.load(&xfm) {
                Ok(transform) => surface.transform = transform,
                Err(e) => sink.report(Diagnostic::TransformUnavailable {
                    path: xfm.display().to_string(),
                    reason: e.to_string(),
                }),
            }
        }

        if config.read_curvature {
            self.ingest_side_file(&mut surface, "curv", sink, |s, p| {
                read_curvature(s, p).map(|_| ())
            });
        }
        if config.read_areas {
            self.ingest_side_file(&mut surface, "area", sink, |s, p| {
                read_areas(s, p).map(|_| ())
            });
        }

        find_poles(&mut surface, &config.pole_criteria);
        Ok(surface)
    }

    fn ingest_side_file(
        &self,
        surface: &mut Surface,
        extension: &str,
        sink: &mut dyn DiagnosticSink,
        read: impl FnOnce(&mut Surface, &Path) -> Result<()>,
    ) {
        let path = match side_file_path(&self.path, extension) {
            Ok(path) => path,
            Err(e) => {
                sink.report(Diagnostic::SideFileSkipped {
                    path: self.path.display().to_string(),
                    reason: e.to_string(),
                });
                return;
            }
        };

        if let Err(e) = read(surface, &path) {
            sink.report(Diagnostic::SideFileSkipped {
                path: path.display().to_string(),
                reason: e.to_string(),
            });
        }
    }
}

/// Read a ready surface with the default configuration
pub fn read_surface<P: AsRef<Path>>(path: P) -> Result<Surface> {
    read_surface_with(path, &SurfaceConfig::default())
}

/// Read a ready surface, logging diagnostics
pub fn read_surface_with<P: AsRef<Path>>(path: P, config: &SurfaceConfig) -> Result<Surface> {
    let reader = SurfaceReader::open(path)?;
    let loader = transform_loader_for(config);
    reader.read_surface(config, loader.as_ref(), &mut LogSink)
}

/// Decode a complete surface stream, logging diagnostics
pub fn decode_surface(bytes: &[u8]) -> Result<Surface> {
    decode_surface_with(bytes, &mut LogSink)
}

/// Decode a complete surface stream into a populated surface
///
/// No topology or geometry pass is run. Legacy incident-face entries that do
/// not match their face are dropped and reported to `sink`.
pub fn decode_surface_with(bytes: &[u8], sink: &mut dyn DiagnosticSink) -> Result<Surface> {
    let format = FormatKind::detect(bytes);
    let mut cursor = Cursor::new(bytes);
    if format == FormatKind::New {
        cursor.set_position(3);
    }

    let nvertices = read_count(&mut cursor, "vertex count")?;
    let nfaces = read_count(&mut cursor, "face count")?;
    log::info!("Reading {} vertices and {} faces", nvertices, nfaces);

    let remaining = bytes.len().saturating_sub(cursor.position() as usize);
    let per_vertex = match format {
        FormatKind::New => 6,
        FormatKind::Legacy => 7,
    };
    if nvertices * per_vertex + nfaces * 12 > remaining {
        return Err(SurfaceError::SurfaceReadError(format!(
            "header declares {} vertices and {} faces but only {} bytes follow",
            nvertices, nfaces, remaining
        )));
    }

    match format {
        FormatKind::New => decode_new(&mut cursor, nvertices, nfaces),
        FormatKind::Legacy => decode_legacy(&mut cursor, nvertices, nfaces, sink),
    }
}

fn decode_new(cursor: &mut Cursor<&[u8]>, nvertices: usize, nfaces: usize) -> Result<Surface> {
    let mut positions = Vec::with_capacity(nvertices);
    for _ in 0..nvertices {
        positions.push(read_position(cursor)?);
    }
    let faces = read_faces(cursor, nfaces)?;

    Surface::from_quads(positions, faces)
}

fn decode_legacy(
    cursor: &mut Cursor<&[u8]>,
    nvertices: usize,
    nfaces: usize,
    sink: &mut dyn DiagnosticSink,
) -> Result<Surface> {
    let mut positions = Vec::with_capacity(nvertices);
    let mut incident = Vec::with_capacity(nvertices);
    for _ in 0..nvertices {
        positions.push(read_position(cursor)?);
        let num = cursor.read_u8().map_err(truncated("vertex face count"))?;
        let mut faces = Vec::with_capacity(num as usize);
        for _ in 0..num {
            faces.push(read_count(cursor, "vertex face index")?);
        }
        incident.push(faces);
    }
    let faces = read_faces(cursor, nfaces)?;

    Surface::from_incidence(positions, incident, faces, sink)
}

fn read_position(cursor: &mut Cursor<&[u8]>) -> Result<Point> {
    let mut coords = [0.0f32; 3];
    for c in &mut coords {
        *c = cursor
            .read_i16::<BigEndian>()
            .map_err(truncated("vertex coordinate"))? as f32
            / COORD_SCALE;
    }
    Ok(Point::from(coords))
}

fn read_faces(cursor: &mut Cursor<&[u8]>, nfaces: usize) -> Result<Vec<[usize; FACE_CORNERS]>> {
    let mut faces = Vec::with_capacity(nfaces);
    for _ in 0..nfaces {
        let mut v = [0usize; FACE_CORNERS];
        for slot in &mut v {
            *slot = read_count(cursor, "face vertex index")?;
        }
        faces.push(v);
    }
    Ok(faces)
}

fn read_count<R: Read>(reader: &mut R, what: &'static str) -> Result<usize> {
    let value = reader.read_u24::<BigEndian>().map_err(truncated(what))?;
    Ok(value as usize)
}

fn truncated(what: &'static str) -> impl Fn(std::io::Error) -> SurfaceError {
    move |e| SurfaceError::SurfaceReadError(format!("truncated {}: {}", what, e))
}

/// Encode a surface in the given layout
///
/// Coordinates are rounded to the nearest hundredth and saturate at the
/// 16-bit range.
pub fn encode_surface(surface: &Surface, format: FormatKind) -> Result<Vec<u8>> {
    let mut out = Vec::new();

    if format == FormatKind::New {
        out.write_u24::<BigEndian>(NEW_VERSION_MAGIC)?;
    }
    write_count(&mut out, surface.num_vertices(), "vertex count")?;
    write_count(&mut out, surface.num_faces(), "face count")?;

    for (vno, vertex) in surface.vertices.iter().enumerate() {
        for c in vertex.position.iter() {
            out.write_i16::<BigEndian>((c * COORD_SCALE).round() as i16)?;
        }
        if format == FormatKind::Legacy {
            let num = u8::try_from(vertex.num()).map_err(|_| {
                SurfaceError::InvalidMeshTopology(format!(
                    "Vertex {} has {} incident faces; the legacy layout stores at most 255",
                    vno,
                    vertex.num()
                ))
            })?;
            out.write_u8(num)?;
            for &fno in &vertex.faces {
                write_count(&mut out, fno, "face index")?;
            }
        }
    }

    for face in &surface.faces {
        for &v in &face.v {
            write_count(&mut out, v, "vertex index")?;
        }
    }

    Ok(out)
}

/// Write a surface file
pub fn write_surface<P: AsRef<Path>>(surface: &Surface, path: P, format: FormatKind) -> Result<()> {
    let bytes = encode_surface(surface, format)?;
    let mut file = std::fs::File::create(path.as_ref())?;
    file.write_all(&bytes)?;
    log::info!(
        "Wrote {} vertices and {} faces to {}",
        surface.num_vertices(),
        surface.num_faces(),
        path.as_ref().display()
    );
    Ok(())
}

fn write_count<W: Write>(writer: &mut W, value: usize, what: &str) -> Result<()> {
    if value > MAX_U24 {
        return Err(SurfaceError::InvalidMeshTopology(format!(
            "{} {} does not fit in 3 bytes",
            what, value
        )));
    }
    writer.write_u24::<BigEndian>(value as u32)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::VecSink;
    use approx::assert_relative_eq;

    fn square() -> Surface {
        let positions = vec![
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.5, 0.0, -2.25),
            Point::new(1.5, 1.0, 0.0),
            Point::new(0.0, 1.0, 3.14),
        ];
        Surface::from_quads(positions, vec![[0, 1, 2, 3]]).unwrap()
    }

    #[test]
    fn test_detect_format() {
        assert_eq!(FormatKind::detect(&[0xFF, 0xFF, 0xFF, 0]), FormatKind::New);
        assert_eq!(FormatKind::detect(&[0x00, 0x00, 0x04]), FormatKind::Legacy);
        assert_eq!(FormatKind::detect(&[0xFF]), FormatKind::Legacy);
    }

    #[test]
    fn test_new_format_layout() {
        let bytes = encode_surface(&square(), FormatKind::New).unwrap();

        // magic + counts + 4 * 6 coordinate bytes + 12 face bytes
        assert_eq!(bytes.len(), 9 + 24 + 12);
        assert_eq!(&bytes[..3], &[0xFF, 0xFF, 0xFF]);
        assert_eq!(&bytes[3..9], &[0, 0, 4, 0, 0, 1]);
        // x of vertex 1: 150 hundredths
        assert_eq!(&bytes[15..17], &[0x00, 0x96]);
    }

    #[test]
    fn test_decode_new_rebuilds_incidence() {
        let bytes = encode_surface(&square(), FormatKind::New).unwrap();
        let surface = decode_surface(&bytes).unwrap();

        assert_eq!(surface.num_vertices(), 4);
        assert_eq!(surface.num_faces(), 1);
        assert_eq!(surface.vertices[3].faces, vec![0]);
        assert_eq!(surface.vertices[3].corners, vec![3]);
        assert_relative_eq!(surface.vertices[3].position.z, 3.14, epsilon = 1e-6);
        assert_relative_eq!(surface.vertices[1].position.z, -2.25, epsilon = 1e-6);
    }

    #[test]
    fn test_decode_legacy_uses_inline_faces() {
        let bytes = encode_surface(&square(), FormatKind::Legacy).unwrap();
        assert_eq!(FormatKind::detect(&bytes), FormatKind::Legacy);

        let surface = decode_surface(&bytes).unwrap();
        assert_eq!(surface.vertices[2].faces, vec![0]);
        assert_eq!(surface.vertices[2].corners, vec![2]);
        assert_relative_eq!(surface.center.x, 0.75, epsilon = 1e-6);
    }

    #[test]
    fn test_decode_legacy_drops_stray_face_reference() {
        let mut positions = square().vertices.iter().map(|v| v.position).collect::<Vec<_>>();
        positions.push(Point::new(5.0, 5.0, 5.0));
        let surface = Surface::from_quads(positions, vec![[0, 1, 2, 3]]).unwrap();
        let mut bytes = encode_surface(&surface, FormatKind::Legacy).unwrap();

        // counts, four vertices of 10 bytes, then the isolated vertex's
        // coordinates; its face count becomes 1 pointing at face 0
        let num_at = 6 + 4 * 10 + 6;
        assert_eq!(bytes[num_at], 0);
        bytes[num_at] = 1;
        bytes.splice(num_at + 1..num_at + 1, [0, 0, 0]);

        let mut sink = VecSink::new();
        let decoded = decode_surface_with(&bytes, &mut sink).unwrap();

        assert!(decoded.vertices[4].faces.is_empty());
        assert!(decoded.vertices[4].corners.is_empty());
        assert_eq!(decoded.vertices[0].corners, vec![0]);
        assert_eq!(
            sink.diagnostics,
            vec![Diagnostic::StrayIncidence { vertex: 4, face: 0 }]
        );
    }

    #[test]
    fn test_truncated_stream_is_rejected() {
        let bytes = encode_surface(&square(), FormatKind::New).unwrap();
        let result = decode_surface(&bytes[..bytes.len() - 1]);
        assert!(matches!(result, Err(SurfaceError::SurfaceReadError(_))));
    }

    #[test]
    fn test_out_of_range_face_index_is_rejected() {
        let mut bytes = encode_surface(&square(), FormatKind::New).unwrap();
        let last = bytes.len() - 1;
        bytes[last] = 9;
        assert!(matches!(
            decode_surface(&bytes),
            Err(SurfaceError::InvalidMeshTopology(_))
        ));
    }

    #[test]
    fn test_coordinates_saturate() {
        let positions = vec![Point::new(400.0, -400.0, 0.004)];
        let surface = Surface::from_quads(positions, vec![[0, 0, 0, 0]]).unwrap();
        let decoded = decode_surface(&encode_surface(&surface, FormatKind::New).unwrap()).unwrap();

        let p = decoded.vertices[0].position;
        assert_relative_eq!(p.x, 327.67, epsilon = 1e-4);
        assert_relative_eq!(p.y, -327.68, epsilon = 1e-4);
        assert_relative_eq!(p.z, 0.0);
    }

    #[test]
    fn test_open_missing_file() {
        let result = SurfaceReader::open("/nonexistent/lh.white");
        assert!(matches!(result, Err(SurfaceError::FileNotFound(_))));
    }
}
