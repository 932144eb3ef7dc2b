//! Error types for mesh validation.

use thiserror::Error;

/// Structural problems that make a mesh unusable at an entry point.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MeshError {
    /// The mesh has no vertices or no faces.
    #[error("empty mesh: {tag}")]
    EmptyMesh {
        /// Tag of the shape (or a description of the mesh).
        tag: String,
    },

    /// A face references a vertex that does not exist.
    #[error("face {face} references vertex {index}, but mesh has only {vertex_count} vertices")]
    InvalidIndex {
        /// Offending face.
        face: usize,
        /// Out-of-range vertex index.
        index: u32,
        /// Number of vertices in the mesh.
        vertex_count: usize,
    },

    /// A face loop has fewer than 3 vertices.
    #[error("face {face} has {len} vertices, at least 3 are required")]
    DegenerateFace {
        /// Offending face.
        face: usize,
        /// Loop length.
        len: usize,
    },

    /// A vertex coordinate is NaN or infinite.
    #[error("vertex {index} has a non-finite coordinate")]
    NonFinite {
        /// Offending vertex.
        index: usize,
    },
}

/// Result type for mesh validation.
pub type MeshResult<T> = Result<T, MeshError>;
