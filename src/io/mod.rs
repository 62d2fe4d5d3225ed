//! I/O module for reading and writing surface files

pub mod report;
pub mod sidefile;
pub mod surface;
pub mod transform;
pub mod vtu;

pub use report::SurfaceReport;
pub use sidefile::{
    hemisphere_code, read_areas, read_curvature, side_file_path, transform_path, write_areas,
    write_curvature,
};
pub use surface::{
    decode_surface, decode_surface_with, encode_surface, read_surface, read_surface_with,
    write_surface, FormatKind, SurfaceReader, NEW_VERSION_MAGIC,
};
pub use transform::{
    read_transform_json, transform_loader_for, FixedTransform, JsonTransformLoader, NoTransform,
    TransformFile, TransformLoader,
};
pub use vtu::{write_surface_to_vtu, DEFAULT_VTK_VERSION};
