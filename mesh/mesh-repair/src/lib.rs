//! Staged, idempotent cleanup for polygon meshes.
//!
//! This crate turns the raw output of boolean operations and smoothing into
//! a clean, closed surface:
//! - Mesh validation (manifold, watertight and orientation checks)
//! - Hole filling
//! - Vertex welding
//! - Limited dissolve of near-coplanar faces and collinear vertices
//! - Degenerate edge/face removal with T-junction re-stitching
//! - Loose geometry removal
//! - Angle-bounded collapse of flat interior vertices
//! - Non-manifold detection with an optional collapse retry
//! - Triangle beautification and consistent normals
//!
//! [`repair`] runs the enabled stages in order, repeating until nothing
//! changes, and never leaves a mesh with more non-manifold edges or
//! degenerate faces than it was given. [`repair_region`] limits the same
//! stages to a vertex [`Selection`](mesh_region::Selection).
//!
//! # Example
//!
//! ```
//! use mesh_types::unit_cube;
//! use mesh_repair::{repair, validate_mesh, RepairOptions};
//!
//! // A cube with one face missing.
//! let mut mesh = unit_cube();
//! mesh.faces.pop();
//!
//! let report = validate_mesh(&mesh);
//! println!("Boundary edges: {}", report.boundary_edge_count);
//!
//! let report = repair(&mut mesh, &RepairOptions::default()).unwrap();
//! println!("{report}");
//! assert!(report.final_report.is_watertight);
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod adjacency;
mod decimate;
mod degenerate;
mod dissolve;
mod error;
pub mod holes;
mod loose;
mod manifold;
mod mask;
mod orient;
mod repair;
mod topology;
mod validate;
mod weld;

pub use adjacency::MeshAdjacency;
pub use decimate::collapse_flat_vertices;
pub use degenerate::{insert_t_junctions, remove_degenerate, DegenerateSummary};
pub use dissolve::{limited_dissolve, DissolveSummary};
pub use error::{RepairError, RepairResult};
pub use holes::{detect_holes, fill_holes, BoundaryLoop, HoleFillSummary};
pub use loose::delete_loose;
pub use manifold::NonManifoldWarning;
pub use orient::{beautify_triangles, recalculate_normals, COPLANAR_ANGLE};
pub use repair::{
    repair, repair_region, RepairOptions, RepairReport, DEFAULT_MAX_HOLE_EDGES, DEFAULT_MAX_PASSES,
};
pub use validate::{validate_mesh, MeshReport, DEGENERATE_AREA};
pub use weld::weld_vertices;
