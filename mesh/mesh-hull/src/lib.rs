//! Convex hulls for case construction.
//!
//! This crate builds convex hulls with quickhull and derives the hull
//! shapes used to close and connect case parts:
//!
//! - [`convex_hull`] - Raw hull of a point cloud as a triangle mesh
//! - [`hull_from_points`] - Cleaned hull shape of a point cloud
//! - [`hull_from_shapes`] - Hull over several shapes and loose points
//! - [`triangle_hulls`] - Skin an ordered chain three shapes at a time
//! - [`bottom_hull`] - Extend shapes straight down to a flat footprint
//!
//! Shape operations consume their inputs, matching the boolean folds in
//! `mesh-boolean`.
//!
//! # Example
//!
//! ```
//! use mesh_hull::hull_from_shapes;
//! use mesh_types::{box_shape, Vector3};
//!
//! let a = box_shape(1.0, 1.0, 1.0);
//! let mut b = box_shape(1.0, 1.0, 1.0);
//! b.translate(Vector3::new(0.0, 0.0, 4.0));
//!
//! let post = hull_from_shapes(vec![a, b], &[]).unwrap();
//! assert!((post.mesh().volume() - 5.0).abs() < 1e-9);
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Quantized coordinates and mesh indices are narrowed deliberately.
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::many_single_char_names)]

mod error;
mod quickhull;
mod shapes;

pub use error::{Degeneracy, HullError, HullResult};
pub use quickhull::convex_hull;
pub use shapes::{add_points, bottom_hull, hull_from_points, hull_from_shapes, triangle_hulls, HULL_TAG};
