//! Per-vertex curvature and area files stored next to a surface
//!
//! Both files share a header of two 3-byte counts (vertices, faces). Curvature
//! values follow as i16 hundredths, areas as f32. A file is decoded completely
//! before the surface is touched, so a rejected file leaves every field as it
//! was.

use crate::error::{Result, SurfaceError};
use crate::mesh::Surface;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::Cursor;
use std::path::{Path, PathBuf};

const CURV_SCALE: f32 = 100.0;

/// Two-character hemisphere code taken from just before the last '.'
pub fn hemisphere_code(primary: &Path) -> Result<String> {
    let name = primary
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let dot = name.rfind('.').ok_or_else(|| {
        SurfaceError::BadParameter(format!(
            "could not scan hemisphere from file name {}",
            primary.display()
        ))
    })?;
    let stem: Vec<char> = name[..dot].chars().collect();
    if stem.len() < 2 {
        return Err(SurfaceError::BadParameter(format!(
            "could not scan hemisphere from file name {}",
            primary.display()
        )));
    }

    Ok(stem[stem.len() - 2..].iter().collect())
}

/// `<dir>/<hemi>.<extension>` for a primary surface path
pub fn side_file_path(primary: &Path, extension: &str) -> Result<PathBuf> {
    let hemi = hemisphere_code(primary)?;
    Ok(parent_dir(primary).join(format!("{}.{}", hemi, extension)))
}

/// Talairach transform location for a primary surface path
pub fn transform_path(primary: &Path) -> PathBuf {
    parent_dir(primary)
        .join("..")
        .join("mri")
        .join("transforms")
        .join("talairach.xfm")
}

fn parent_dir(primary: &Path) -> PathBuf {
    match primary.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Read a curvature file into `surface`
///
/// Sets every vertex's curvature and the surface's curvature range. Returns
/// the (min, max) range.
pub fn read_curvature<P: AsRef<Path>>(surface: &mut Surface, path: P) -> Result<(f32, f32)> {
    let path = path.as_ref();
    let bytes = read_side_file(path)?;
    let mut cursor = Cursor::new(bytes.as_slice());
    check_header(&mut cursor, path, surface.num_vertices())?;

    let mut values = Vec::with_capacity(surface.num_vertices());
    for _ in 0..surface.num_vertices() {
        let raw = cursor
            .read_i16::<BigEndian>()
            .map_err(|e| truncated(path, e))?;
        values.push(raw as f32 / CURV_SCALE);
    }

    let (min, max) = values
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &c| {
            (lo.min(c), hi.max(c))
        });
    let (min, max) = if values.is_empty() { (0.0, 0.0) } else { (min, max) };

    for (vertex, curv) in surface.vertices.iter_mut().zip(values) {
        vertex.curv = curv;
    }
    surface.min_curv = min;
    surface.max_curv = max;

    log::info!("Curvature from {}: min={:.3} max={:.3}", path.display(), min, max);
    Ok((min, max))
}

/// Read an area file into `surface`
///
/// Sets every vertex's original area and the surface total (sum halved once).
/// Returns the total.
pub fn read_areas<P: AsRef<Path>>(surface: &mut Surface, path: P) -> Result<f32> {
    let path = path.as_ref();
    let bytes = read_side_file(path)?;
    let mut cursor = Cursor::new(bytes.as_slice());
    check_header(&mut cursor, path, surface.num_vertices())?;

    let mut values = Vec::with_capacity(surface.num_vertices());
    for _ in 0..surface.num_vertices() {
        values.push(
            cursor
                .read_f32::<BigEndian>()
                .map_err(|e| truncated(path, e))?,
        );
    }

    let total = values.iter().sum::<f32>() / 2.0;
    for (vertex, area) in surface.vertices.iter_mut().zip(values) {
        vertex.orig_area = area;
    }
    surface.total_area = total;

    log::info!("Total area from {}: {:.1}", path.display(), total);
    Ok(total)
}

/// Write every vertex's curvature
pub fn write_curvature<P: AsRef<Path>>(surface: &Surface, path: P) -> Result<()> {
    let mut out = header(surface)?;
    for vertex in &surface.vertices {
        out.write_i16::<BigEndian>((vertex.curv * CURV_SCALE).round() as i16)?;
    }
    std::fs::write(path, out)?;
    Ok(())
}

/// Write every vertex's original area
pub fn write_areas<P: AsRef<Path>>(surface: &Surface, path: P) -> Result<()> {
    let mut out = header(surface)?;
    for vertex in &surface.vertices {
        out.write_f32::<BigEndian>(vertex.orig_area)?;
    }
    std::fs::write(path, out)?;
    Ok(())
}

fn header(surface: &Surface) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(6 + surface.num_vertices() * 4);
    for count in [surface.num_vertices(), surface.num_faces()] {
        let count = u32::try_from(count)
            .ok()
            .filter(|&c| c <= 0x00FF_FFFF)
            .ok_or_else(|| {
                SurfaceError::InvalidMeshTopology(format!("count {} does not fit in 3 bytes", count))
            })?;
        out.write_u24::<BigEndian>(count)?;
    }
    Ok(out)
}

fn read_side_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path)
        .map_err(|e| SurfaceError::FileNotFound(format!("{}: {}", path.display(), e)))
}

fn check_header(cursor: &mut Cursor<&[u8]>, path: &Path, expected: usize) -> Result<()> {
    let found = cursor
        .read_u24::<BigEndian>()
        .map_err(|e| truncated(path, e))? as usize;
    // face count is stored but not checked
    cursor
        .read_u24::<BigEndian>()
        .map_err(|e| truncated(path, e))?;

    if found != expected {
        return Err(SurfaceError::VertexCountMismatch {
            path: path.display().to_string(),
            expected,
            found,
        });
    }
    Ok(())
}

fn truncated(path: &Path, e: std::io::Error) -> SurfaceError {
    SurfaceError::SurfaceReadError(format!("truncated side-file {}: {}", path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::Point;
    use approx::assert_relative_eq;
    use tempfile::TempDir;

    fn strip(n: usize) -> Surface {
        let positions: Vec<Point> = (0..n).map(|i| Point::new(i as f32, 0.0, 0.0)).collect();
        let faces = (0..n.saturating_sub(1))
            .map(|i| [i, i + 1, i + 1, i])
            .collect();
        Surface::from_quads(positions, faces).unwrap()
    }

    #[test]
    fn test_hemisphere_code() {
        assert_eq!(hemisphere_code(Path::new("/subj/surf/lh.white")).unwrap(), "lh");
        assert_eq!(hemisphere_code(Path::new("rh.orig.nofix")).unwrap(), "ig");
        assert!(matches!(
            hemisphere_code(Path::new("/subj/surf/white")),
            Err(SurfaceError::BadParameter(_))
        ));
        assert!(hemisphere_code(Path::new("h.white")).is_err());
    }

    #[test]
    fn test_sibling_paths() {
        let primary = Path::new("/subj/surf/rh.white");
        assert_eq!(
            side_file_path(primary, "curv").unwrap(),
            PathBuf::from("/subj/surf/rh.curv")
        );
        assert_eq!(
            transform_path(primary),
            PathBuf::from("/subj/surf/../mri/transforms/talairach.xfm")
        );
        assert_eq!(
            side_file_path(Path::new("lh.white"), "area").unwrap(),
            PathBuf::from("./lh.area")
        );
    }

    #[test]
    fn test_curvature_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lh.curv");

        let mut source = strip(3);
        source.vertices[0].curv = -0.25;
        source.vertices[1].curv = 1.5;
        source.vertices[2].curv = 0.0;
        write_curvature(&source, &path).unwrap();

        let mut surface = strip(3);
        let (min, max) = read_curvature(&mut surface, &path).unwrap();

        assert_relative_eq!(min, -0.25);
        assert_relative_eq!(max, 1.5);
        assert_relative_eq!(surface.vertices[0].curv, -0.25);
        assert_relative_eq!(surface.max_curv, 1.5);
    }

    #[test]
    fn test_area_file_total_is_halved() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lh.area");

        let mut source = strip(2);
        source.vertices[0].orig_area = 3.0;
        source.vertices[1].orig_area = 5.0;
        write_areas(&source, &path).unwrap();

        let mut surface = strip(2);
        let total = read_areas(&mut surface, &path).unwrap();

        assert_relative_eq!(total, 4.0);
        assert_relative_eq!(surface.total_area, 4.0);
        assert_relative_eq!(surface.vertices[1].orig_area, 5.0);
    }

    #[test]
    fn test_mismatched_vertex_count_leaves_surface_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lh.curv");

        let mut source = strip(4);
        for vertex in &mut source.vertices {
            vertex.curv = 2.0;
        }
        write_curvature(&source, &path).unwrap();

        let mut surface = strip(3);
        let result = read_curvature(&mut surface, &path);

        assert!(matches!(
            result,
            Err(SurfaceError::VertexCountMismatch {
                expected: 3,
                found: 4,
                ..
            })
        ));
        assert!(surface.vertices.iter().all(|v| v.curv == 0.0));
        assert_eq!(surface.max_curv, 0.0);
    }

    #[test]
    fn test_truncated_area_file_leaves_surface_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lh.area");

        let mut source = strip(3);
        for vertex in &mut source.vertices {
            vertex.orig_area = 1.0;
        }
        write_areas(&source, &path).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        std::fs::write(&path, &bytes[..bytes.len() - 2]).unwrap();

        let mut surface = strip(3);
        assert!(matches!(
            read_areas(&mut surface, &path),
            Err(SurfaceError::SurfaceReadError(_))
        ));
        assert!(surface.vertices.iter().all(|v| v.orig_area < 0.0));
    }
}
