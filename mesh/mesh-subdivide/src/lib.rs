//! Crease-aware mesh subdivision.
//!
//! This crate smooths polygon meshes while keeping marked edges sharp:
//!
//! - **Catmull-Clark** ([`SubdivisionMode::PreserveTopology`]): every k-gon
//!   becomes k quads and the surface converges to a smooth limit. Crease
//!   weights hold edges and corners in place.
//! - **Simple** ([`SubdivisionMode::Simple`]): the same split without
//!   moving anything, for densifying a mesh before smoothing.
//! - **Edge cuts** ([`subdivide_edges`]): a regular grid per triangle or
//!   quad, with a fixed number of cuts on every edge.
//!
//! Creases are stored on the mesh itself ([`mesh_types::CreaseMap`]) and
//! are marked from vertex selections with [`crease`],
//! [`crease_base_vertices`] and [`crease_key_vertices`].
//!
//! # Examples
//!
//! Smoothing a cube whose top rim is creased:
//!
//! ```
//! use mesh_region::{select_by_range, AxisRange};
//! use mesh_subdivide::{crease, smooth, SubdivisionMode};
//! use mesh_types::unit_cube;
//!
//! let mut cube = unit_cube();
//! let rim = select_by_range(&cube, None, None, Some(AxisRange::new(0.9, 1.1)));
//! crease(&mut cube, &rim, 1.0);
//!
//! let result = smooth(&cube, 2, SubdivisionMode::PreserveTopology)?;
//! assert_eq!(result.final_faces, 96);
//!
//! // The creased corners have not moved.
//! for v in 4..8 {
//!     assert_eq!(result.mesh.position(v), cube.position(v));
//! }
//! # Ok::<(), mesh_subdivide::SubdivideError>(())
//! ```
//!
//! Explicit parameters with a face limit:
//!
//! ```
//! use mesh_subdivide::{subdivide_mesh, SubdivideError, SubdivideParams};
//! use mesh_types::unit_cube;
//!
//! let params = SubdivideParams::catmull_clark(3).with_max_faces(100);
//! let err = subdivide_mesh(&unit_cube(), &params).unwrap_err();
//! assert!(matches!(err, SubdivideError::MeshTooLarge { projected: 384, .. }));
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Mesh indices are u32 and counts are converted to f64 for averaging.
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::many_single_char_names)]

mod crease;
mod cuts;
mod error;
mod params;
mod result;
mod subdivide;

pub use crease::{crease, crease_base_vertices, crease_key_vertices, DEFAULT_BASE_CREASE_Z};
pub use cuts::subdivide_edges;
pub use error::{SubdivideError, SubdivideResult};
pub use params::{SubdivideParams, SubdivisionMode, DEFAULT_MAX_FACES};
pub use result::SubdivisionResult;
pub use subdivide::{smooth, subdivide_mesh};
