//! Mesh toolkit for building and finishing keyboard cases.
//!
//! This umbrella crate re-exports all mesh-* crates, providing a unified API
//! from primitives to a smoothed, printable case. All crates are
//! single-threaded and free of I/O, so they run the same in CLI tools,
//! servers, or WASM.
//!
//! # Quick Start
//!
//! ```
//! use mesh::prelude::*;
//!
//! // Two walls joined by a beam.
//! let mut left = box_shape(4.0, 30.0, 10.0);
//! left.translate(Vector3::new(-10.0, 0.0, 5.0));
//! let mut right = box_shape(4.0, 30.0, 10.0);
//! right.translate(Vector3::new(10.0, 0.0, 5.0));
//! let mut beam = box_shape(20.0, 6.0, 4.0);
//! beam.translate(Vector3::new(0.0, 0.0, 5.0));
//!
//! // Assemble, crease and smooth.
//! let finished = CaseFinisher::new(PipelineConfig::preview())
//!     .finish(vec![left, right, beam], None)
//!     .unwrap();
//!
//! let report = validate_mesh(finished.shape.mesh());
//! assert!(report.is_watertight);
//! ```
//!
//! # Module Organization
//!
//! ## Foundation
//! - [`types`] - `IndexedMesh`, `Shape`, crease map, primitives
//! - [`region`] - Vertex selection by coordinate range and proximity
//!
//! ## Core Operations
//! - [`repair`] - Staged, idempotent cleanup and validation
//! - [`boolean`] - Union, difference and intersection folds over shapes
//! - [`hull`] - Convex hulls, triangle hulls and bottom hulls
//!
//! ## Smoothing
//! - [`subdivide`] - Crease marking, Catmull-Clark and edge cuts
//! - [`pipeline`] - The end-to-end case finisher
//!
//! # Feature Flags
//!
//! - `serde` - Serialize configurations and meshes

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

// =============================================================================
// Re-exports
// =============================================================================

/// Core data structures: `IndexedMesh`, `Shape`, `CreaseMap`, primitives.
pub use mesh_types as types;

/// Vertex selection by coordinate range and proximity.
pub use mesh_region as region;

/// Mesh validation and repair.
pub use mesh_repair as repair;

/// Boolean folds (union, difference, intersection).
pub use mesh_boolean as boolean;

/// Convex hulls over points and shapes.
pub use mesh_hull as hull;

/// Crease-aware subdivision.
pub use mesh_subdivide as subdivide;

/// End-to-end case finishing.
pub use mesh_pipeline as pipeline;

// =============================================================================
// Prelude
// =============================================================================

/// Common imports for case building.
///
/// This module re-exports the most commonly used types and functions.
///
/// # Usage
///
/// ```
/// use mesh::prelude::*;
/// ```
pub mod prelude {
    // Core types and primitives
    pub use mesh_types::{
        box_shape, cone, cylinder, ico_sphere, polyline, Aabb, IndexedMesh, MeshBounds, MeshTopology, Point3,
        Shape, Vector3, Vertex,
    };

    // Selection
    pub use mesh_region::{select_by_proximity, select_by_range, AxisRange, Selection};

    // Repair
    pub use mesh_repair::{repair, validate_mesh, MeshReport, RepairOptions};

    // Booleans and hulls
    pub use mesh_boolean::{difference, intersect, union};
    pub use mesh_hull::{bottom_hull, hull_from_shapes, triangle_hulls};

    // Smoothing
    pub use mesh_subdivide::{crease, smooth, SubdivisionMode};

    // Pipeline (main use case)
    pub use mesh_pipeline::{CaseFinisher, PipelineConfig};
}

// =============================================================================
// Tests
// =============================================================================
