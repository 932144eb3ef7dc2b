//! Boolean operations (CSG) for polygon meshes.
//!
//! This crate combines closed solids: union (A ∪ B), intersection (A ∩ B),
//! and difference (A - B). Pairwise evaluation uses BSP trees over convex
//! polygons; the surviving fragments are welded back into an indexed mesh
//! and their T-junctions closed.
//!
//! # Features
//!
//! - **Bounding box fast path** for operands that cannot touch
//! - **Coplanar faces** resolved by polygon facing, so touching boxes fuse
//! - **Multi-shape folds** that consume owned [`Shape`]s into the first one
//! - **Per-step repair** through `mesh-repair` between fold steps
//! - **Extrusion with holes** for plates cut from 2D outlines
//!
//! # Quick Start
//!
//! ```
//! use mesh_boolean::{difference, union};
//! use mesh_types::{box_shape, cylinder, Vector3};
//!
//! let plate = box_shape(10.0, 10.0, 2.0);
//! let mut boss = box_shape(2.0, 2.0, 4.0);
//! boss.translate(Vector3::new(3.0, 3.0, 2.0));
//!
//! let body = union(vec![plate, boss], true).unwrap();
//! let drilled = difference(body, vec![cylinder(1.0, 10.0, 16)], true).unwrap();
//! assert_eq!(drilled.mesh().component_count(), 1);
//! ```
//!
//! # Configuration
//!
//! ```
//! use mesh_boolean::{boolean_operation, BooleanConfig, BooleanOp, CleanupLevel};
//! use mesh_types::{unit_cube, Vector3};
//!
//! let config = BooleanConfig::for_cad().with_cleanup(CleanupLevel::Full);
//! let a = unit_cube();
//! let mut b = unit_cube();
//! b.translate(Vector3::new(0.5, 0.5, 0.5));
//!
//! let result = boolean_operation(&a, &b, BooleanOp::Intersect, &config).unwrap();
//! assert!((result.mesh.volume() - 0.125).abs() < 1e-9);
//! ```
//!
//! # Presets
//!
//! | Preset | Use Case | Tolerances |
//! |--------|----------|------------|
//! | `default()` | Closed solids, open results fail | Balanced |
//! | `for_cad()` | CAD geometry | Tight |
//! | `strict()` | Perfect input | Tightest |
//! | `lenient()` | Open or non-manifold operands | Balanced |

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::similar_names)]
#![allow(clippy::many_single_char_names)]
// Mesh indices are u32; vertex counts beyond that are unsupported.
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::missing_panics_doc)]

mod bsp;
pub mod config;
pub mod error;
mod extrude;
pub mod multi;
pub mod operation;

pub use config::{BooleanConfig, BooleanOp, CleanupLevel};
pub use error::{BooleanError, BooleanResult};
pub use extrude::extrude_with_holes;
pub use multi::{combine, combine_with_config, difference, difference_with_config, intersect, union, union_with_config};
pub use operation::{boolean_operation, BooleanOperationResult, BooleanStats};

pub use mesh_types::{IndexedMesh, Shape};

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```
/// use mesh_boolean::prelude::*;
/// use mesh_types::box_shape;
///
/// let joined = union(vec![box_shape(1.0, 1.0, 1.0)], false).unwrap();
/// assert_eq!(joined.tag(), "box");
/// ```
pub mod prelude {
    pub use crate::config::{BooleanConfig, BooleanOp, CleanupLevel};
    pub use crate::error::{BooleanError, BooleanResult};
    pub use crate::extrude::extrude_with_holes;
    pub use crate::multi::{combine, difference, intersect, union};
    pub use crate::operation::boolean_operation;
}
