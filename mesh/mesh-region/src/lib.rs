//! Vertex selection for mesh pipelines.
//!
//! Selections pick the vertices later stages operate on: the crease stage
//! marks edges between selected vertices, and boundary-limited cleanup only
//! touches geometry inside a selection.
//!
//! - [`Selection`] - A bitset of vertex indices scoped to one mesh
//! - [`Selector`] - Range / proximity criteria, combinable with AND/OR/NOT
//! - [`AxisRange`] - A closed interval on one axis
//! - [`SpatialHash`] - Uniform grid used for proximity queries (and by the
//!   weld stages of the repair and boolean crates)
//!
//! Selection never fails: criteria that cannot match simply select
//! nothing.
//!
//! # Example
//!
//! ```
//! use mesh_region::{select_by_proximity, select_by_range, select_complement, AxisRange};
//! use mesh_types::{box_shape, Vector3};
//!
//! let case = box_shape(20.0, 20.0, 4.0);
//! let mut plate = box_shape(20.0, 20.0, 1.5);
//! plate.translate(Vector3::new(0.0, 0.0, 2.75));
//!
//! // Vertices touching the key plate, plus anything near the floor.
//! let shared = select_by_proximity(case.mesh(), plate.mesh(), 1.0);
//! let floor = select_by_range(case.mesh(), None, None, Some(AxisRange::new(-2.5, -1.5)));
//! let protected = shared.union(&floor);
//! assert_eq!(protected.len(), 8);
//! assert!(select_complement(case.mesh(), &protected).is_empty());
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_possible_truncation)]

mod selection;
mod selector;
mod spatial;

pub use selection::Selection;
pub use selector::{
    select_by_difference, select_by_proximity, select_by_range, select_complement, AxisRange,
    Selector,
};
pub use spatial::SpatialHash;

// Re-export for convenience
pub use mesh_types::{IndexedMesh, Point3, Vector3, Vertex};
