//! Error types for mesh subdivision operations.

use mesh_types::MeshError;
use thiserror::Error;

/// Errors that can occur during subdivision operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SubdivideError {
    /// The input mesh is empty or structurally invalid.
    #[error(transparent)]
    InvalidMesh(#[from] MeshError),

    /// Mesh would exceed maximum size.
    #[error("subdivision would exceed maximum mesh size ({current} -> {projected} faces, max {max})")]
    MeshTooLarge {
        /// Current face count.
        current: usize,
        /// Projected face count after subdivision.
        projected: usize,
        /// Maximum allowed face count.
        max: usize,
    },
}

/// Result type for subdivision operations.
pub type SubdivideResult<T> = std::result::Result<T, SubdivideError>;
