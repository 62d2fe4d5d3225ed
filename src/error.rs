//! Error types for the cortical surface engine
//!
//! This module defines all error types that can occur while reading surface
//! files and side-files, and while deriving new surfaces from a loaded one.

use thiserror::Error;

/// Error types for surface operations
///
/// Soft topology violations are never represented here; they are reported
/// through a [`crate::diagnostics::DiagnosticSink`] instead.
#[derive(Error, Debug)]
pub enum SurfaceError {
    /// The primary surface file could not be opened
    #[error("Could not open surface file: {0}")]
    FileNotFound(String),

    /// The surface stream is truncated or otherwise malformed
    ///
    /// No partially populated surface is ever returned alongside this error.
    #[error("Failed to read surface: {0}")]
    SurfaceReadError(String),

    /// Mesh topology is invalid
    ///
    /// Raised when a face references a vertex outside the vertex array, or a
    /// legacy-format vertex references a face outside the face array.
    #[error("Invalid mesh topology: {0}")]
    InvalidMeshTopology(String),

    /// A curvature or area side-file does not match the primary surface
    #[error("Incompatible vertex count in {path}: expected {expected}, found {found}")]
    VertexCountMismatch {
        path: String,
        expected: usize,
        found: usize,
    },

    /// A parameter derived from the caller's input is unusable
    ///
    /// For example, a hemisphere code cannot be scanned from a file name.
    #[error("Bad parameter: {0}")]
    BadParameter(String),

    /// An operation needs an affine transform but none is loaded
    #[error("No affine transform loaded")]
    MissingTransform,

    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Configuration error
    ///
    /// Invalid configuration file format, missing required fields,
    /// or invalid parameter values.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// VTK file writing error
    #[error("VTK error: {0}")]
    VtkError(String),
}

/// Convenience type alias for Results with [`SurfaceError`]
///
/// # Example
/// ```
/// use cortex_surface::Result;
///
/// fn my_function() -> Result<()> {
///     Ok(())
/// }
/// ```
pub type Result<T> = std::result::Result<T, SurfaceError>;
