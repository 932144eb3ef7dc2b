//! Error types for the finishing pipeline.

use std::fmt;

use mesh_boolean::BooleanError;
use mesh_repair::RepairError;
use mesh_subdivide::SubdivideError;
use mesh_types::MeshError;
use thiserror::Error;

/// Result type alias for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Steps of [`CaseFinisher`](crate::CaseFinisher), in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Union of the primitives.
    Assemble,
    /// Light repair pass before smoothing.
    BaselineCleanup,
    /// Limited dissolve away from the key plate and the base.
    Dissolve,
    /// Geometry-preserving subdivision.
    Presmooth,
    /// Direct edge cuts.
    Presubdivide,
    /// Creasing of the base ring.
    BaseCrease,
    /// Creasing of the key plate contact.
    KeyCrease,
    /// Catmull-Clark smoothing.
    Smooth,
    /// Final repair pass.
    FinalCleanup,
}

impl Stage {
    /// Tag given to the snapshot taken at this stage, if one is taken.
    #[must_use]
    pub const fn snapshot_name(self) -> Option<&'static str> {
        match self {
            Self::Assemble => Some("shape1_assembled"),
            Self::BaselineCleanup => Some("shape2_baseline"),
            Self::BaseCrease => Some("shape3_post_base_crease"),
            Self::KeyCrease => Some("shape4_post_key_crease"),
            Self::Smooth => Some("shape5_post_smooth"),
            Self::FinalCleanup => Some("shape6_post_cleanup"),
            Self::Dissolve | Self::Presmooth | Self::Presubdivide => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Assemble => "assemble",
            Self::BaselineCleanup => "baseline cleanup",
            Self::Dissolve => "dissolve",
            Self::Presmooth => "presmooth",
            Self::Presubdivide => "presubdivide",
            Self::BaseCrease => "base crease",
            Self::KeyCrease => "key crease",
            Self::Smooth => "smooth",
            Self::FinalCleanup => "final cleanup",
        };
        f.write_str(name)
    }
}

/// The failure behind a [`PipelineError`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StageError {
    /// The shape entering the pipeline is unusable.
    #[error(transparent)]
    InvalidMesh(#[from] MeshError),

    /// Assembly failed.
    #[error(transparent)]
    Boolean(#[from] BooleanError),

    /// A cleanup pass failed.
    #[error(transparent)]
    Repair(#[from] RepairError),

    /// Subdivision failed.
    #[error(transparent)]
    Subdivide(#[from] SubdivideError),
}

/// A pipeline step failed; processing stopped there.
#[derive(Debug, Error)]
#[error("{stage} failed on `{shape}`: {source}")]
pub struct PipelineError {
    /// The step that failed.
    pub stage: Stage,
    /// Tag of the shape being finished.
    pub shape: String,
    /// What went wrong.
    #[source]
    pub source: StageError,
}

impl PipelineError {
    /// Attribute `source` to `stage` of `shape`.
    pub fn new(stage: Stage, shape: impl Into<String>, source: impl Into<StageError>) -> Self {
        Self {
            stage,
            shape: shape.into(),
            source: source.into(),
        }
    }
}
