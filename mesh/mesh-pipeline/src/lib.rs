//! End-to-end finishing of keyboard case meshes.
//!
//! A case is built from primitives (walls, posts, key hulls) that are
//! unioned, cleaned, creased along the base and the key plate, and smoothed
//! with Catmull-Clark subdivision. [`CaseFinisher`] runs the whole sequence
//! with a [`PipelineConfig`]:
//!
//! | Step | Stage | Runs |
//! |------|-------|------|
//! | 1 | [`Stage::Assemble`] | [`CaseFinisher::finish`] only |
//! | 2 | [`Stage::BaselineCleanup`] | always |
//! | 3 | [`Stage::Dissolve`] | always |
//! | 4 | [`Stage::Presmooth`] | `presmooth_levels > 0` |
//! | 5 | [`Stage::Presubdivide`] | `presubdivide_cuts > 0` |
//! | 6 | [`Stage::BaseCrease`] | always |
//! | 7 | [`Stage::KeyCrease`] | key plate given and `key_crease_tolerance > 0` |
//! | 8 | [`Stage::Smooth`] | always |
//! | 9 | [`Stage::FinalCleanup`] | always |
//!
//! # Example
//!
//! ```
//! use mesh_pipeline::{CaseFinisher, PipelineConfig, Stage};
//! use mesh_types::{box_shape, Vector3};
//!
//! let mut case = box_shape(40.0, 30.0, 10.0);
//! case.translate(Vector3::new(0.0, 0.0, 5.0));
//! let mut plate = box_shape(30.0, 20.0, 3.0);
//! plate.translate(Vector3::new(0.0, 0.0, 11.5));
//!
//! let config = PipelineConfig::preview()
//!     .with_key_crease_tolerance(0.5)
//!     .with_snapshots(true);
//! let finished = CaseFinisher::new(config)
//!     .finish(vec![case], Some(plate.mesh()))
//!     .unwrap();
//!
//! assert!(finished.snapshot(Stage::Assemble).is_some());
//! assert!(finished.warning().is_none());
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod config;
mod error;
mod finisher;

pub use config::PipelineConfig;
pub use error::{PipelineError, PipelineResult, Stage, StageError};
pub use finisher::{CaseFinisher, FinishedCase};
