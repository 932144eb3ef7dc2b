//! Error types for boolean operations.

use mesh_repair::RepairError;
use mesh_types::MeshError;
use thiserror::Error;

use crate::config::BooleanOp;

/// Errors that can occur during boolean operations.
///
/// Every variant that concerns a particular operand names it by its
/// shape tag.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BooleanError {
    /// An operand is empty or structurally invalid.
    #[error("invalid operand '{tag}': {source}")]
    InvalidOperand {
        /// Tag of the offending shape.
        tag: String,
        /// What is wrong with its mesh.
        #[source]
        source: MeshError,
    },

    /// An operand is not a closed 2-manifold solid.
    #[error(
        "operand '{tag}' is not a closed solid: {boundary_edges} open edges, \
         {non_manifold_edges} multi-face edges, {non_manifold_vertices} non-manifold vertices"
    )]
    NotSolid {
        /// Tag of the offending shape.
        tag: String,
        /// Edges used by a single face.
        boundary_edges: usize,
        /// Edges used by more than two faces.
        non_manifold_edges: usize,
        /// Vertices whose faces do not form a single fan.
        non_manifold_vertices: usize,
    },

    /// The operation was given the wrong number of shapes.
    #[error("{op} needs {expected} operands, got {found}")]
    OperandCount {
        /// Operation that was requested.
        op: BooleanOp,
        /// Required operand count, as text ("2", "at least 1").
        expected: &'static str,
        /// Number of shapes supplied.
        found: usize,
    },

    /// Evaluation left nothing behind.
    #[error("{op} with '{tag}' produced an empty mesh")]
    EmptyResult {
        /// Operation that was evaluated.
        op: BooleanOp,
        /// Tag of the operand being folded in.
        tag: String,
    },

    /// Both inputs were closed but the result is not, and closed results
    /// are required.
    #[error("{op} with '{tag}' left {boundary_edges} open edges")]
    OpenResult {
        /// Operation that was evaluated.
        op: BooleanOp,
        /// Tag of the operand being folded in.
        tag: String,
        /// Edges used by a single face.
        boundary_edges: usize,
    },

    /// The per-step cleanup failed.
    #[error("cleanup after folding '{tag}' failed: {source}")]
    Repair {
        /// Tag of the operand being folded in.
        tag: String,
        /// Repairer failure.
        #[source]
        source: RepairError,
    },
}

/// Result type for boolean operations.
pub type BooleanResult<T> = Result<T, BooleanError>;
