//! Uniform-grid spatial hash over vertex positions.

use hashbrown::HashMap;
use nalgebra::Point3;

type Cell = (i64, i64, i64);

/// Buckets point indices into cubic cells for radius queries.
///
/// Queries visit every cell the query sphere can touch, so any cell size
/// gives correct answers; a cell size near the query radius keeps it at
/// the 27-cell neighbourhood.
///
/// # Example
///
/// ```
/// use mesh_region::SpatialHash;
/// use nalgebra::Point3;
///
/// let points = [Point3::new(0.0, 0.0, 0.0), Point3::new(5.0, 0.0, 0.0)];
/// let hash = SpatialHash::from_points(points.iter().copied(), 1.0);
/// let near: Vec<u32> = hash.within(&points, &Point3::new(0.1, 0.0, 0.0), 0.5).collect();
/// assert_eq!(near, vec![0]);
/// ```
#[derive(Debug, Clone)]
pub struct SpatialHash {
    cell_size: f64,
    cells: HashMap<Cell, Vec<u32>>,
}

impl SpatialHash {
    /// Empty hash. Cell sizes that are not positive and finite are raised
    /// to `1e-9`.
    #[must_use]
    pub fn new(cell_size: f64) -> Self {
        let cell_size = if cell_size.is_finite() && cell_size > 1e-9 {
            cell_size
        } else {
            1e-9
        };
        Self {
            cell_size,
            cells: HashMap::new(),
        }
    }

    /// Hash every point, indexed by its position in the iterator.
    #[must_use]
    pub fn from_points(points: impl IntoIterator<Item = Point3<f64>>, cell_size: f64) -> Self {
        let mut hash = Self::new(cell_size);
        for (i, p) in points.into_iter().enumerate() {
            hash.insert(i as u32, &p);
        }
        hash
    }

    /// Edge length of a cell.
    #[must_use]
    pub const fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Add a point index.
    pub fn insert(&mut self, index: u32, position: &Point3<f64>) {
        self.cells.entry(self.cell_of(position)).or_default().push(index);
    }

    fn cell_of(&self, p: &Point3<f64>) -> Cell {
        (
            (p.x / self.cell_size).floor() as i64,
            (p.y / self.cell_size).floor() as i64,
            (p.z / self.cell_size).floor() as i64,
        )
    }

    /// Indices in the cells overlapping the cube of half-width `radius`
    /// around `center`, unfiltered.
    pub fn candidates(&self, center: &Point3<f64>, radius: f64) -> impl Iterator<Item = u32> + '_ {
        let (cx, cy, cz) = self.cell_of(center);
        let reach = (radius.max(0.0) / self.cell_size).ceil() as i64;
        (cx - reach..=cx + reach)
            .flat_map(move |x| (cy - reach..=cy + reach).map(move |y| (x, y)))
            .flat_map(move |(x, y)| (cz - reach..=cz + reach).map(move |z| (x, y, z)))
            .filter_map(|cell| self.cells.get(&cell))
            .flatten()
            .copied()
    }

    /// Indices whose position in `positions` lies within `radius` of
    /// `center` (inclusive).
    pub fn within<'a>(
        &'a self,
        positions: &'a [Point3<f64>],
        center: &'a Point3<f64>,
        radius: f64,
    ) -> impl Iterator<Item = u32> + 'a {
        let radius_sq = radius * radius;
        self.candidates(center, radius).filter(move |&i| {
            positions
                .get(i as usize)
                .is_some_and(|p| (p - center).norm_squared() <= radius_sq)
        })
    }

    /// Whether any hashed point lies within `radius` of `center`.
    #[must_use]
    pub fn any_within(&self, positions: &[Point3<f64>], center: &Point3<f64>, radius: f64) -> bool {
        if radius < 0.0 {
            return false;
        }
        self.within(positions, center, radius).next().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_points_across_cell_borders() {
        let points = vec![Point3::new(0.99, 0.0, 0.0), Point3::new(1.01, 0.0, 0.0)];
        let hash = SpatialHash::from_points(points.iter().copied(), 1.0);
        let mut near: Vec<u32> = hash.within(&points, &points[0], 0.05).collect();
        near.sort_unstable();
        assert_eq!(near, vec![0, 1]);
    }

    #[test]
    fn large_radius_reaches_far_cells() {
        let points = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(10.0, 0.0, 0.0)];
        let hash = SpatialHash::from_points(points.iter().copied(), 1.0);
        assert!(hash.any_within(&points, &Point3::new(5.0, 0.0, 0.0), 5.0));
        assert!(!hash.any_within(&points, &Point3::new(5.0, 0.0, 0.0), 4.9));
    }

    #[test]
    fn zero_radius_is_exact_and_negative_matches_nothing() {
        let points = vec![Point3::new(0.3, 0.3, 0.3)];
        let mut hash = SpatialHash::new(0.0);
        hash.insert(0, &points[0]);
        assert!(hash.any_within(&points, &Point3::new(0.3, 0.3, 0.3), 0.0));
        assert!(!hash.any_within(&points, &Point3::new(0.3, 0.3, 0.3), -1.0));
        assert!(!hash.any_within(&points, &Point3::new(0.3, 0.3, 0.31), 0.0));
    }
}
