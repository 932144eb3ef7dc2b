//! Error types for mesh repair operations.

use mesh_types::MeshError;
use thiserror::Error;

/// Result type for repair operations.
pub type RepairResult<T> = Result<T, RepairError>;

/// Errors that can occur during mesh repair.
///
/// Recoverable roughness is not an error: it is logged and carried in the
/// report as a [`crate::NonManifoldWarning`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RepairError {
    /// The input mesh is structurally invalid.
    #[error(transparent)]
    InvalidMesh(#[from] MeshError),

    /// Manifoldness was required, but the bounded retry made no progress.
    #[error(
        "repair exhausted: {remaining} non-manifold elements remain after {attempts} attempt(s)"
    )]
    Exhausted {
        /// Boundary edges, multi-face edges and non-manifold vertices left.
        remaining: usize,
        /// Retries performed.
        attempts: usize,
    },
}
