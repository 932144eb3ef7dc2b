//! Error types for hull construction.

use mesh_boolean::BooleanError;
use mesh_repair::RepairError;
use thiserror::Error;

/// Result type for hull operations.
pub type HullResult<T> = Result<T, HullError>;

/// Errors that can occur while building hulls.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HullError {
    /// Fewer than four distinct points were given.
    #[error("convex hull needs at least 4 distinct points, got {found}")]
    TooFewPoints {
        /// Distinct points after merging duplicates.
        found: usize,
    },

    /// The points span no volume.
    #[error("convex hull input is {0}")]
    Degenerate(Degeneracy),

    /// A point coordinate is NaN or infinite.
    #[error("point {index} has a non-finite coordinate")]
    NonFinite {
        /// Offending point.
        index: usize,
    },

    /// The operation was given fewer shapes than it needs.
    #[error("hull operation needs at least {needed} shapes, got {found}")]
    TooFewShapes {
        /// Minimum number of shapes.
        needed: usize,
        /// Shapes given.
        found: usize,
    },

    /// Combining shapes or hulls failed.
    #[error(transparent)]
    Boolean(#[from] BooleanError),

    /// Cleaning a hull failed.
    #[error("cleaning hull '{tag}' failed: {source}")]
    Repair {
        /// Tag of the hull being cleaned.
        tag: String,
        /// Underlying repair error.
        #[source]
        source: RepairError,
    },
}

/// How a point set fails to span a volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Degeneracy {
    /// All points lie on one line.
    Collinear,
    /// All points lie in one plane.
    Coplanar,
}

impl std::fmt::Display for Degeneracy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Collinear => write!(f, "collinear"),
            Self::Coplanar => write!(f, "coplanar"),
        }
    }
}
