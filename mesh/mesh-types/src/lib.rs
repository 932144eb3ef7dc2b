//! Core mesh types for the case-finishing pipeline.
//!
//! This crate provides the foundational types every other stage reads and
//! writes:
//!
//! - [`Vertex`] - A point in 3D space
//! - [`IndexedMesh`] - A polygon mesh with indexed vertices and per-edge crease weights
//! - [`CreaseMap`] - Crease weights in `[0, 1]` keyed by normalized edge
//! - [`Shape`] - An owning handle around one mesh with a reference point and a tag
//! - [`Aabb`] - Axis-aligned bounding box
//!
//! Primitive constructors ([`box_shape`], [`cylinder`], [`cone`],
//! [`ico_sphere`], [`polyline`], [`extrude_poly`]) build the shapes the
//! layout code hands to the boolean stage.
//!
//! # Units
//!
//! This library is **unit-agnostic**. All coordinates are `f64`.
//! Default tolerances in downstream crates assume millimeters.
//!
//! # Coordinate System
//!
//! Uses a **right-handed coordinate system** with Z up. Face loops are
//! **counter-clockwise (CCW) when viewed from outside**, so normals point
//! outward by the right-hand rule.
//!
//! # Example
//!
//! ```
//! use mesh_types::{IndexedMesh, MeshTopology, Vertex};
//!
//! let mut mesh = IndexedMesh::new();
//! mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
//! mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
//! mesh.vertices.push(Vertex::from_coords(1.0, 1.0, 0.0));
//! mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0));
//! mesh.push_face([0, 1, 2, 3]);
//!
//! assert_eq!(mesh.face_count(), 1);
//! assert_eq!(mesh.edges().len(), 4);
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Mesh indices are u32; vertex counts beyond that are unsupported.
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::many_single_char_names)]

mod bounds;
mod crease;
mod error;
mod mesh;
pub mod polygon;
mod primitives;
mod shape;
mod traits;
mod vertex;

pub use bounds::Aabb;
pub use crease::{CreaseMap, EdgeKey};
pub use error::{MeshError, MeshResult};
pub use mesh::{unit_cube, Face, IndexedMesh};
pub use primitives::{
    box_shape, cone, cylinder, extrude_poly, ico_sphere, polyline, DEFAULT_CONE_SEGMENTS,
    DEFAULT_CYLINDER_SEGMENTS, DEFAULT_SPHERE_SUBDIVISIONS,
};
pub use shape::{MirrorPlane, Shape};
pub use traits::{MeshBounds, MeshTopology};
pub use vertex::Vertex;

// Re-export nalgebra types for convenience
pub use nalgebra::{Isometry3, Point3, Vector3};
