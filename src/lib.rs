//! Cortex Surface Library
//!
//! Reading, preparing and deriving cortical surface meshes: binary surface
//! files, neighbor topology, vertex normals and areas, anatomical poles, and
//! recentered, ellipsoidal and Talairach-space copies.

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod io;
pub mod mesh;

pub use error::{Result, SurfaceError};
