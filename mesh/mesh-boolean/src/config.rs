//! Configuration and presets for boolean operations.
//!
//! This module provides [`BooleanConfig`] for controlling boolean operation behavior:
//! the tolerances of the BSP evaluator, how its polygon soup is stitched
//! back into an indexed mesh, and the repair run after each fold step.
//!
//! # Presets
//!
//! - [`BooleanConfig::default()`] - Balanced settings for millimetre-scale layouts
//! - [`BooleanConfig::for_cad()`] - Tighter tolerances for precise CAD geometry
//! - [`BooleanConfig::strict()`] - Tightest tolerances
//! - [`BooleanConfig::lenient()`] - Accepts open operands and open results
//!
//! # Example
//!
//! ```
//! use mesh_boolean::{BooleanConfig, CleanupLevel};
//!
//! let config = BooleanConfig::for_cad().with_cleanup(CleanupLevel::Full);
//! assert!(config.vertex_weld_tolerance < BooleanConfig::default().vertex_weld_tolerance);
//! ```

use std::fmt;

use mesh_repair::RepairOptions;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How much stitching is applied to the evaluator's polygon soup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CleanupLevel {
    /// Weld coincident corners only. Split edges may leave T-junctions.
    None,

    /// Weld corners and insert T-junction vertices into the faces whose
    /// edges they lie on, so closed inputs give a closed result.
    #[default]
    Fast,

    /// As `Fast`, then merge coplanar fragments back into polygons and
    /// make winding consistent.
    Full,
}

/// Configuration for boolean operations.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BooleanConfig {
    /// Corners of the evaluator output closer than this are merged, and
    /// a corner this close to an edge is inserted into it.
    pub vertex_weld_tolerance: f64,

    /// Points within this distance of a splitting plane count as on it.
    pub plane_epsilon: f64,

    /// Stitching applied to every pairwise result.
    pub cleanup: CleanupLevel,

    /// Repairer options used after each fold step when per-step cleanup
    /// is requested.
    pub repair: RepairOptions,

    /// Reject operands that are not closed 2-manifolds, and fail when a
    /// step leaves the result open. When unset, any non-empty operand is
    /// accepted and an open result is only logged.
    pub require_closed: bool,
}

impl Default for BooleanConfig {
    fn default() -> Self {
        Self {
            vertex_weld_tolerance: 1e-6,
            plane_epsilon: 1e-5,
            cleanup: CleanupLevel::default(),
            repair: RepairOptions::fold(),
            require_closed: true,
        }
    }
}

impl BooleanConfig {
    /// Create configuration optimized for CAD geometry.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_boolean::BooleanConfig;
    ///
    /// let config = BooleanConfig::for_cad();
    /// assert!(config.plane_epsilon < BooleanConfig::default().plane_epsilon);
    /// ```
    #[must_use]
    pub fn for_cad() -> Self {
        Self {
            vertex_weld_tolerance: 1e-8,
            plane_epsilon: 1e-7,
            ..Self::default()
        }
    }

    /// Create strict configuration with the tightest tolerances.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_boolean::BooleanConfig;
    ///
    /// let config = BooleanConfig::strict();
    /// assert!(config.require_closed);
    /// assert!(config.vertex_weld_tolerance < BooleanConfig::for_cad().vertex_weld_tolerance);
    /// ```
    #[must_use]
    pub fn strict() -> Self {
        Self {
            vertex_weld_tolerance: 1e-10,
            plane_epsilon: 1e-9,
            require_closed: true,
            ..Self::default()
        }
    }

    /// Default tolerances, but open or non-manifold operands are accepted
    /// and open results only warn.
    ///
    /// For folds whose result is only used for its vertices, such as the
    /// input of a hull.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_boolean::BooleanConfig;
    ///
    /// assert!(BooleanConfig::default().require_closed);
    /// assert!(!BooleanConfig::lenient().require_closed);
    /// ```
    #[must_use]
    pub fn lenient() -> Self {
        Self {
            require_closed: false,
            ..Self::default()
        }
    }

    /// Set the cleanup level.
    #[must_use]
    pub fn with_cleanup(mut self, level: CleanupLevel) -> Self {
        self.cleanup = level;
        self
    }

    /// Set the vertex weld tolerance.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_boolean::BooleanConfig;
    ///
    /// let config = BooleanConfig::default().with_vertex_weld_tolerance(-1e-5);
    /// assert_eq!(config.vertex_weld_tolerance, 1e-5);
    /// ```
    #[must_use]
    pub fn with_vertex_weld_tolerance(mut self, tolerance: f64) -> Self {
        self.vertex_weld_tolerance = tolerance.abs();
        self
    }

    /// Set the plane classification epsilon.
    #[must_use]
    pub fn with_plane_epsilon(mut self, epsilon: f64) -> Self {
        self.plane_epsilon = epsilon.abs();
        self
    }

    /// Set the repair options used between fold steps.
    #[must_use]
    pub fn with_repair(mut self, options: RepairOptions) -> Self {
        self.repair = options;
        self
    }

    /// Choose whether open operands and open results are errors.
    #[must_use]
    pub fn with_require_closed(mut self, require: bool) -> Self {
        self.require_closed = require;
        self
    }
}

/// Boolean operation type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BooleanOp {
    /// Union: A ∪ B
    Union,

    /// Difference: A - B
    Difference,

    /// Intersection: A ∩ B
    Intersect,
}

impl fmt::Display for BooleanOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Union => write!(f, "union"),
            Self::Difference => write!(f, "difference"),
            Self::Intersect => write!(f, "intersect"),
        }
    }
}
