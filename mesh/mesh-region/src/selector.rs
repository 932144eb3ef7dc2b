//! Vertex selection criteria.
//!
//! The [`Selector`] enum describes which vertices of a mesh to select by
//! coordinate ranges or by proximity to a reference mesh. Selectors can be
//! combined with [`Selector::and`], [`Selector::or`] and [`Selector::not`].
//! The free functions are shorthands for the common single-criterion cases.

use crate::selection::Selection;
use crate::spatial::SpatialHash;
use mesh_types::IndexedMesh;
use nalgebra::Point3;
use tracing::debug;

/// A closed interval `[min, max]` on one axis.
///
/// A range with `min > max` matches nothing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisRange {
    /// Lower bound (inclusive).
    pub min: f64,
    /// Upper bound (inclusive).
    pub max: f64,
}

impl AxisRange {
    /// Create a range.
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Everything at or above `min`.
    #[must_use]
    pub const fn at_least(min: f64) -> Self {
        Self::new(min, f64::INFINITY)
    }

    /// Whether `value` lies in the closed interval.
    #[inline]
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

impl From<(f64, f64)> for AxisRange {
    fn from((min, max): (f64, f64)) -> Self {
        Self::new(min, max)
    }
}

/// Criteria for selecting vertices of a mesh.
///
/// # Example
///
/// ```
/// use mesh_region::{AxisRange, Selector};
/// use mesh_types::box_shape;
///
/// let plate = box_shape(10.0, 10.0, 2.0);
/// // The bottom four corners.
/// let bottom = Selector::z(AxisRange::new(-1.5, -0.5)).select(plate.mesh());
/// assert_eq!(bottom.len(), 4);
/// ```
#[derive(Debug, Clone)]
pub enum Selector<'a> {
    /// Vertices inside every supplied axis range. No ranges selects all.
    Range {
        /// Range on X.
        x: Option<AxisRange>,
        /// Range on Y.
        y: Option<AxisRange>,
        /// Range on Z.
        z: Option<AxisRange>,
    },

    /// Vertices within `tolerance` of some vertex of `reference`.
    Proximity {
        /// The mesh to measure against.
        reference: &'a IndexedMesh,
        /// Inclusive distance bound. Zero means exact coincidence; negative
        /// matches nothing.
        tolerance: f64,
    },

    /// Vertices in both.
    And(Box<Selector<'a>>, Box<Selector<'a>>),

    /// Vertices in either.
    Or(Box<Selector<'a>>, Box<Selector<'a>>),

    /// Vertices not selected by the inner selector.
    Not(Box<Selector<'a>>),
}

impl<'a> Selector<'a> {
    /// Every vertex.
    #[must_use]
    pub const fn all() -> Self {
        Self::Range {
            x: None,
            y: None,
            z: None,
        }
    }

    /// Range on X only.
    #[must_use]
    pub fn x(range: impl Into<AxisRange>) -> Self {
        Self::Range {
            x: Some(range.into()),
            y: None,
            z: None,
        }
    }

    /// Range on Y only.
    #[must_use]
    pub fn y(range: impl Into<AxisRange>) -> Self {
        Self::Range {
            x: None,
            y: Some(range.into()),
            z: None,
        }
    }

    /// Range on Z only.
    #[must_use]
    pub fn z(range: impl Into<AxisRange>) -> Self {
        Self::Range {
            x: None,
            y: None,
            z: Some(range.into()),
        }
    }

    /// Proximity to a reference mesh.
    #[must_use]
    pub const fn near(reference: &'a IndexedMesh, tolerance: f64) -> Self {
        Self::Proximity {
            reference,
            tolerance,
        }
    }

    /// Combine with another selector using AND.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        Self::And(Box::new(self), Box::new(other))
    }

    /// Combine with another selector using OR.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        Self::Or(Box::new(self), Box::new(other))
    }

    /// Negate this selector.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Evaluate against a mesh.
    #[must_use]
    pub fn select(&self, mesh: &IndexedMesh) -> Selection {
        match self {
            Self::Range { x, y, z } => range(mesh, [*x, *y, *z]),
            Self::Proximity {
                reference,
                tolerance,
            } => proximity(mesh, reference, *tolerance),
            Self::And(a, b) => a.select(mesh).intersect(&b.select(mesh)),
            Self::Or(a, b) => a.select(mesh).union(&b.select(mesh)),
            Self::Not(inner) => inner.select(mesh).complement(),
        }
    }
}

fn range(mesh: &IndexedMesh, ranges: [Option<AxisRange>; 3]) -> Selection {
    Selection::from_predicate(mesh.vertices.len(), |i| {
        let p = mesh.vertices[i as usize].position;
        ranges
            .iter()
            .enumerate()
            .all(|(axis, r)| r.map_or(true, |r| r.contains(p[axis])))
    })
}

fn proximity(mesh: &IndexedMesh, reference: &IndexedMesh, tolerance: f64) -> Selection {
    if tolerance.is_nan() || tolerance < 0.0 || reference.vertices.is_empty() {
        return Selection::none(mesh.vertices.len());
    }
    if tolerance.is_infinite() {
        return Selection::all(mesh.vertices.len());
    }
    let positions: Vec<Point3<f64>> = reference.vertices.iter().map(|v| v.position).collect();
    let hash = SpatialHash::from_points(positions.iter().copied(), tolerance);
    Selection::from_predicate(mesh.vertices.len(), |i| {
        hash.any_within(&positions, &mesh.vertices[i as usize].position, tolerance)
    })
}

/// Vertices whose coordinates lie in every supplied closed range.
///
/// Absent axes impose no constraint, so passing no ranges selects every
/// vertex.
#[must_use]
pub fn select_by_range(
    mesh: &IndexedMesh,
    x: Option<AxisRange>,
    y: Option<AxisRange>,
    z: Option<AxisRange>,
) -> Selection {
    let selection = range(mesh, [x, y, z]);
    debug!(selected = selection.len(), of = mesh.vertices.len(), "range selection");
    selection
}

/// Vertices of `mesh` within `tolerance` of any vertex of `reference`.
///
/// A NaN or negative tolerance selects nothing; an infinite one selects
/// every vertex as long as `reference` has any.
#[must_use]
pub fn select_by_proximity(mesh: &IndexedMesh, reference: &IndexedMesh, tolerance: f64) -> Selection {
    let selection = proximity(mesh, reference, tolerance);
    debug!(
        selected = selection.len(),
        of = mesh.vertices.len(),
        tolerance,
        "proximity selection"
    );
    selection
}

/// Vertices of `mesh` not within `tolerance` of any vertex of `reference`.
#[must_use]
pub fn select_by_difference(mesh: &IndexedMesh, reference: &IndexedMesh, tolerance: f64) -> Selection {
    select_by_proximity(mesh, reference, tolerance).complement()
}

/// Every vertex of `mesh` not in `selection`.
#[must_use]
pub fn select_complement(mesh: &IndexedMesh, selection: &Selection) -> Selection {
    Selection::all(mesh.vertices.len()).intersect(&selection.complement())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_types::{box_shape, unit_cube, Vector3};

    #[test]
    fn no_ranges_selects_everything() {
        let cube = unit_cube();
        assert_eq!(select_by_range(&cube, None, None, None).len(), 8);
        assert_eq!(Selector::all().select(&cube).len(), 8);
    }

    #[test]
    fn ranges_are_closed_and_conjunctive() {
        let cube = unit_cube();
        let top = select_by_range(&cube, None, None, Some(AxisRange::new(1.0, 1.0)));
        assert_eq!(top.iter().collect::<Vec<_>>(), vec![4, 5, 6, 7]);

        let corner = select_by_range(
            &cube,
            Some(AxisRange::new(0.5, 2.0)),
            Some(AxisRange::new(0.5, 2.0)),
            Some((0.5, 2.0).into()),
        );
        assert_eq!(corner.iter().collect::<Vec<_>>(), vec![6]);
    }

    #[test]
    fn inverted_range_matches_nothing() {
        let cube = unit_cube();
        assert!(select_by_range(&cube, Some(AxisRange::new(1.0, 0.0)), None, None).is_empty());
    }

    #[test]
    fn proximity_to_self_at_zero_selects_all() {
        let shape = box_shape(3.0, 2.0, 1.0);
        assert_eq!(select_by_proximity(shape.mesh(), shape.mesh(), 0.0).len(), 8);
        assert!(select_by_proximity(shape.mesh(), shape.mesh(), -1.0).is_empty());
    }

    #[test]
    fn infinite_tolerance_reaches_everything() {
        let case = box_shape(3.0, 2.0, 1.0);
        let mut far = unit_cube();
        far.translate(Vector3::new(1e6, 0.0, 0.0));

        assert_eq!(select_by_proximity(case.mesh(), &far, f64::INFINITY).len(), 8);
        assert!(select_by_difference(case.mesh(), &far, f64::INFINITY).is_empty());
        assert_eq!(Selector::near(&far, f64::INFINITY).select(case.mesh()).len(), 8);

        assert!(select_by_proximity(case.mesh(), &IndexedMesh::new(), f64::INFINITY).is_empty());
        assert!(select_by_proximity(case.mesh(), &far, f64::NAN).is_empty());
    }

    #[test]
    fn proximity_to_stacked_plate() {
        let case = unit_cube();
        let mut plate = unit_cube();
        plate.translate(Vector3::new(0.0, 0.0, 1.0));
        // Plate bottom coincides with the case top.
        let shared = select_by_proximity(&case, &plate, 1e-6);
        assert_eq!(shared.iter().collect::<Vec<_>>(), vec![4, 5, 6, 7]);
        let rest = select_by_difference(&case, &plate, 1e-6);
        assert_eq!(rest.iter().collect::<Vec<_>>(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn combinators() {
        let cube = unit_cube();
        let plate = {
            let mut p = unit_cube();
            p.translate(Vector3::new(0.0, 0.0, 1.0));
            p
        };
        let selector = Selector::near(&plate, 0.01).or(Selector::z((-0.1, 0.1))).not();
        assert!(selector.select(&cube).is_empty());

        let selector = Selector::x((0.5, 1.5)).and(Selector::z((0.5, 1.5)));
        assert_eq!(selector.select(&cube).len(), 2);
    }

    #[test]
    fn complement_is_set_difference() {
        let cube = unit_cube();
        let bottom = select_by_range(&cube, None, None, Some(AxisRange::new(0.0, 0.0)));
        let rest = select_complement(&cube, &bottom);
        assert_eq!(rest.len(), 4);
        assert!(rest.intersect(&bottom).is_empty());
    }
}
