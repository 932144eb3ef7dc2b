//! Subdivision parameters.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default face limit of [`SubdivideParams`] and edge cutting.
pub const DEFAULT_MAX_FACES: usize = 10_000_000;

/// How new vertices are placed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SubdivisionMode {
    /// Catmull-Clark smoothing. Crease weights pull edge points toward
    /// edge midpoints and pin vertices on two or more creased edges.
    #[default]
    PreserveTopology,

    /// Same topology as Catmull-Clark, but edge points are midpoints and
    /// original vertices stay put, so the surface does not change shape.
    Simple,
}

impl SubdivisionMode {
    /// Check if this mode moves the surface.
    #[must_use]
    pub const fn is_smoothing(&self) -> bool {
        matches!(self, Self::PreserveTopology)
    }
}

/// Parameters for mesh subdivision.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SubdivideParams {
    /// Vertex placement rule.
    pub mode: SubdivisionMode,

    /// Number of subdivision rounds. Zero leaves the mesh unchanged.
    pub levels: u32,

    /// Maximum faces allowed in result (prevents memory issues).
    pub max_faces: usize,
}

impl Default for SubdivideParams {
    fn default() -> Self {
        Self {
            mode: SubdivisionMode::default(),
            levels: 1,
            max_faces: DEFAULT_MAX_FACES,
        }
    }
}

impl SubdivideParams {
    /// Create new parameters with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Crease-aware Catmull-Clark smoothing.
    #[must_use]
    pub fn catmull_clark(levels: u32) -> Self {
        Self {
            mode: SubdivisionMode::PreserveTopology,
            levels,
            ..Self::default()
        }
    }

    /// Geometry-preserving subdivision.
    #[must_use]
    pub fn simple(levels: u32) -> Self {
        Self {
            mode: SubdivisionMode::Simple,
            levels,
            ..Self::default()
        }
    }

    /// Set the vertex placement rule.
    #[must_use]
    pub const fn with_mode(mut self, mode: SubdivisionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the number of rounds.
    #[must_use]
    pub const fn with_levels(mut self, levels: u32) -> Self {
        self.levels = levels;
        self
    }

    /// Set maximum faces allowed.
    #[must_use]
    pub const fn with_max_faces(mut self, max_faces: usize) -> Self {
        self.max_faces = max_faces;
        self
    }

    /// Face count after all rounds, given the corner count (sum of loop
    /// lengths) of the input.
    ///
    /// The first round turns every k-gon into k quads; later rounds
    /// multiply by 4. Saturates instead of overflowing.
    #[must_use]
    pub const fn expected_faces(&self, current_faces: usize, corner_count: usize) -> usize {
        if self.levels == 0 {
            return current_faces;
        }
        let mut faces = corner_count;
        let mut i = 1;
        while i < self.levels {
            faces = faces.saturating_mul(4);
            i += 1;
        }
        faces
    }
}
