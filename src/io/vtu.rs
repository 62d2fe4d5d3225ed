//! VTU (VTK Unstructured Grid) export of a ready surface

use crate::error::{Result, SurfaceError};
use crate::mesh::{Face, Surface};
use std::path::Path;
use vtkio::model::*;

/// Default VTK file format version (2.2 for broad compatibility)
pub const DEFAULT_VTK_VERSION: (u8, u8) = (2, 2);

/// Write a surface to a VTU file
///
/// Faces become quad cells; packed triangles (fourth slot repeating another
/// corner) become triangle cells. Normals, curvature, area and the border flag
/// are attached as point data.
pub fn write_surface_to_vtu(
    surface: &Surface,
    output_path: &Path,
    vtk_version: Option<(u8, u8)>,
) -> Result<()> {
    let version = vtk_version.unwrap_or(DEFAULT_VTK_VERSION);
    log::info!(
        "Writing surface with {} vertices and {} faces to {:?} (VTK version {}.{})",
        surface.num_vertices(),
        surface.num_faces(),
        output_path,
        version.0,
        version.1
    );

    let points: Vec<f64> = surface
        .vertices
        .iter()
        .flat_map(|v| [v.position.x as f64, v.position.y as f64, v.position.z as f64])
        .collect();

    let mut connectivity = Vec::with_capacity(surface.num_faces() * 4);
    let mut offsets = Vec::with_capacity(surface.num_faces());
    let mut types = Vec::with_capacity(surface.num_faces());
    for face in &surface.faces {
        let (cell_type, corners) = cell_of(face);
        connectivity.extend(corners.iter().map(|&v| v as u64));
        offsets.push(connectivity.len() as u64);
        types.push(cell_type);
    }

    let mut ugrid = UnstructuredGridPiece {
        points: IOBuffer::F64(points),
        cells: Cells {
            cell_verts: VertexNumbers::XML {
                connectivity,
                offsets,
            },
            types,
        },
        data: Attributes::new(),
    };

    let normals: Vec<f64> = surface
        .vertices
        .iter()
        .flat_map(|v| [v.normal.x as f64, v.normal.y as f64, v.normal.z as f64])
        .collect();
    ugrid.data.point.push(Attribute::DataArray(DataArray {
        name: "normals".into(),
        elem: ElementType::Vectors,
        data: IOBuffer::F64(normals),
    }));

    ugrid.data.point.push(scalar_array(
        "curvature",
        surface.vertices.iter().map(|v| v.curv as f64).collect(),
    ));
    ugrid.data.point.push(scalar_array(
        "area",
        surface.vertices.iter().map(|v| v.area as f64).collect(),
    ));
    ugrid.data.point.push(Attribute::DataArray(DataArray {
        name: "border".into(),
        elem: ElementType::Scalars {
            num_comp: 1,
            lookup_table: None,
        },
        data: IOBuffer::I32(surface.vertices.iter().map(|v| v.border as i32).collect()),
    }));

    let vtk = Vtk {
        version: Version::new(version),
        title: format!("Surface ({:?} hemisphere)", surface.hemisphere),
        byte_order: ByteOrder::LittleEndian,
        data: DataSet::UnstructuredGrid {
            pieces: vec![Piece::Inline(Box::new(ugrid))],
            meta: None,
        },
        file_path: None,
    };

    vtk.export(output_path)
        .map_err(|e| SurfaceError::VtkError(format!("Failed to write VTU file: {}", e)))?;

    log::info!("Successfully wrote VTU file to {:?}", output_path);

    Ok(())
}

fn cell_of(face: &Face) -> (CellType, Vec<usize>) {
    let [a, b, c, d] = face.v;
    if d == c || d == a {
        (CellType::Triangle, vec![a, b, c])
    } else {
        (CellType::Quad, vec![a, b, c, d])
    }
}

fn scalar_array(name: &str, data: Vec<f64>) -> Attribute {
    Attribute::DataArray(DataArray {
        name: name.into(),
        elem: ElementType::Scalars {
            num_comp: 1,
            lookup_table: None,
        },
        data: IOBuffer::F64(data),
    })
}
