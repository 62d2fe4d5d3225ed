//! Non-fatal diagnostics emitted by the surface passes
//!
//! Topology and geometry passes never fail on soft violations. They describe
//! what they found to a [`DiagnosticSink`] and carry on.

use std::fmt;

/// A soft, non-fatal observation made while building or deriving a surface
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// A face lists a vertex whose incident-face list does not contain that face
    IncidenceMismatch {
        face: usize,
        corner: usize,
        vertex: usize,
    },

    /// A vertex lists a face it does not occupy; the entry was dropped
    StrayIncidence { vertex: usize, face: usize },

    /// A ripped face was excluded and its corners marked as border vertices
    RippedFace { face: usize },

    /// A side-file was not ingested; the primary surface is unchanged
    SideFileSkipped { path: String, reason: String },

    /// No affine transform could be loaded for the surface
    TransformUnavailable { path: String, reason: String },

    /// A vertex coincides with the projection center and cannot be scaled
    DegenerateProjection { vertex: usize },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::IncidenceMismatch {
                face,
                corner,
                vertex,
            } => write!(
                f,
                "face[{}].v[{}] = {} is missing from the vertex's face list",
                face, corner, vertex
            ),
            Diagnostic::StrayIncidence { vertex, face } => write!(
                f,
                "vertex {} lists face {} but is not one of its corners",
                vertex, face
            ),
            Diagnostic::RippedFace { face } => {
                write!(f, "face {} is ripped; its corners are border vertices", face)
            }
            Diagnostic::SideFileSkipped { path, reason } => {
                write!(f, "skipped side-file {}: {}", path, reason)
            }
            Diagnostic::TransformUnavailable { path, reason } => {
                write!(f, "could not read transform {}: {}", path, reason)
            }
            Diagnostic::DegenerateProjection { vertex } => {
                write!(f, "vertex {} sits at the projection center", vertex)
            }
        }
    }
}

/// Consumer of diagnostics
pub trait DiagnosticSink {
    /// Record a single diagnostic.
    fn report(&mut self, diagnostic: Diagnostic);
}

/// Forwards every diagnostic to the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        match diagnostic {
            Diagnostic::RippedFace { .. } => log::debug!("{}", diagnostic),
            _ => log::warn!("{}", diagnostic),
        }
    }
}

/// Collects diagnostics in memory for later inspection
#[derive(Debug, Default, Clone)]
pub struct VecSink {
    /// Collected diagnostics, in emission order.
    pub diagnostics: Vec<Diagnostic>,
}

impl VecSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of incidence mismatches (either direction) collected so far.
    pub fn incidence_mismatches(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| {
                matches!(
                    d,
                    Diagnostic::IncidenceMismatch { .. } | Diagnostic::StrayIncidence { .. }
                )
            })
            .count()
    }
}

impl DiagnosticSink for VecSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}
