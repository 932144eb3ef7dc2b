//! Quickhull over a point cloud.
//!
//! 1. Merge duplicate points
//! 2. Seed a tetrahedron from the extreme points
//! 3. Give every other point to one face it lies in front of
//! 4. Take the farthest point of some face, delete every face that sees it
//!    and fan new faces from it to the horizon
//! 5. Stop when no face has points left
//!
//! Faces live in a vector of slots; deleted faces leave `None` behind so
//! indices stay valid while the hull grows.

use hashbrown::{HashMap, HashSet};
use mesh_types::{IndexedMesh, Point3, Vector3};
use tracing::trace;

use crate::error::{Degeneracy, HullError, HullResult};

/// Tolerance relative to the largest coordinate magnitude of the input.
const RELATIVE_EPSILON: f64 = 1e-10;

#[derive(Debug, Clone)]
struct HullFace {
    vertices: [usize; 3],
    normal: Vector3<f64>,
    offset: f64,
    /// Points in front of this face that no earlier face claimed.
    outside: Vec<usize>,
}

impl HullFace {
    fn new(vertices: [usize; 3], points: &[Point3<f64>]) -> Self {
        let [a, b, c] = vertices.map(|i| points[i]);
        let normal = (b - a).cross(&(c - a)).try_normalize(0.0).unwrap_or_else(Vector3::zeros);
        Self {
            vertices,
            offset: normal.dot(&a.coords),
            normal,
            outside: Vec::new(),
        }
    }

    fn distance(&self, point: &Point3<f64>) -> f64 {
        self.normal.dot(&point.coords) - self.offset
    }

    fn edges(&self) -> [(usize, usize); 3] {
        let [a, b, c] = self.vertices;
        [(a, b), (b, c), (c, a)]
    }
}

struct Hull {
    faces: Vec<Option<HullFace>>,
    epsilon: f64,
}

/// Convex hull of `points` as an outward-facing triangle mesh.
///
/// Points inside the hull or on its surface are dropped; the result only
/// references hull corners.
///
/// # Errors
///
/// - [`HullError::NonFinite`] if a coordinate is NaN or infinite
/// - [`HullError::TooFewPoints`] if fewer than 4 distinct points remain
/// - [`HullError::Degenerate`] if the points are collinear or coplanar
///
/// # Example
///
/// ```
/// use mesh_hull::convex_hull;
/// use mesh_types::Point3;
///
/// let points = [
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
///     Point3::new(0.0, 0.0, 1.0),
///     Point3::new(0.1, 0.1, 0.1),
/// ];
/// let hull = convex_hull(&points).unwrap();
/// assert_eq!(hull.vertices.len(), 4);
/// assert_eq!(hull.faces.len(), 4);
/// ```
pub fn convex_hull(points: &[Point3<f64>]) -> HullResult<IndexedMesh> {
    if let Some(index) = points.iter().position(|p| !p.coords.iter().all(|c| c.is_finite())) {
        return Err(HullError::NonFinite { index });
    }
    let extent = points.iter().fold(0.0_f64, |m, p| m.max(p.coords.amax()));
    let epsilon = RELATIVE_EPSILON * extent.max(1.0);

    let points = dedup(points, epsilon);
    if points.len() < 4 {
        return Err(HullError::TooFewPoints { found: points.len() });
    }

    let mut hull = Hull::seed(&points, epsilon)?;
    hull.grow(&points);
    Ok(hull.into_mesh(&points))
}

/// Drop points that quantize to the same `epsilon` cell, keeping the first.
fn dedup(points: &[Point3<f64>], epsilon: f64) -> Vec<Point3<f64>> {
    let mut seen = HashSet::with_capacity(points.len());
    points
        .iter()
        .filter(|p| {
            let key = [p.x, p.y, p.z].map(|c| (c / epsilon).round() as i64);
            seen.insert(key)
        })
        .copied()
        .collect()
}

impl Hull {
    fn seed(points: &[Point3<f64>], epsilon: f64) -> HullResult<Self> {
        let mut extremes = [0_usize; 6];
        for (i, p) in points.iter().enumerate() {
            for axis in 0..3 {
                if p[axis] < points[extremes[2 * axis]][axis] {
                    extremes[2 * axis] = i;
                }
                if p[axis] > points[extremes[2 * axis + 1]][axis] {
                    extremes[2 * axis + 1] = i;
                }
            }
        }

        let mut pair = (extremes[0], extremes[1]);
        let mut best = 0.0;
        for (k, &i) in extremes.iter().enumerate() {
            for &j in &extremes[k + 1..] {
                let d = (points[i] - points[j]).norm_squared();
                if d > best {
                    best = d;
                    pair = (i, j);
                }
            }
        }
        let (a, b) = pair;
        let Some(axis) = (points[b] - points[a]).try_normalize(epsilon) else {
            return Err(HullError::Degenerate(Degeneracy::Collinear));
        };

        let line_distance = |p: &Point3<f64>| {
            let v = p - points[a];
            (v - axis * v.dot(&axis)).norm()
        };
        let c = farthest(points, line_distance);
        if line_distance(&points[c]) <= epsilon {
            return Err(HullError::Degenerate(Degeneracy::Collinear));
        }

        let normal = (points[b] - points[a]).cross(&(points[c] - points[a])).normalize();
        let plane_distance = |p: &Point3<f64>| normal.dot(&(p - points[a]));
        let d = farthest(points, |p| plane_distance(p).abs());
        if plane_distance(&points[d]).abs() <= epsilon {
            return Err(HullError::Degenerate(Degeneracy::Coplanar));
        }

        // Wind the base so the apex lies behind it.
        let (b, c) = if plane_distance(&points[d]) > 0.0 { (c, b) } else { (b, c) };
        let mut hull = Self {
            faces: [[a, b, c], [a, d, b], [b, d, c], [c, d, a]]
                .into_iter()
                .map(|v| Some(HullFace::new(v, points)))
                .collect(),
            epsilon,
        };
        for p in (0..points.len()).filter(|&p| ![a, b, c, d].contains(&p)) {
            hull.assign(p, points, 0);
        }
        Ok(hull)
    }

    /// Hand `point` to the first live face from `start` on, then to any
    /// earlier one, that it lies in front of. Interior points are dropped.
    fn assign(&mut self, point: usize, points: &[Point3<f64>], start: usize) {
        let epsilon = self.epsilon;
        let len = self.faces.len();
        for index in (start..len).chain(0..start) {
            if let Some(face) = self.faces[index].as_mut() {
                if face.distance(&points[point]) > epsilon {
                    face.outside.push(point);
                    return;
                }
            }
        }
    }

    fn grow(&mut self, points: &[Point3<f64>]) {
        // Every iteration consumes one apex, so this bounds the loop.
        let mut budget = points.len();
        while budget > 0 {
            budget -= 1;
            let Some(face) = self.faces.iter().flatten().find(|f| !f.outside.is_empty()) else {
                break;
            };
            let Some(apex) = face
                .outside
                .iter()
                .copied()
                .max_by(|&x, &y| face.distance(&points[x]).total_cmp(&face.distance(&points[y])))
            else {
                break;
            };
            let eye = points[apex];

            let visible: Vec<usize> = self
                .faces
                .iter()
                .enumerate()
                .filter_map(|(i, f)| f.as_ref().filter(|f| f.distance(&eye) > self.epsilon).map(|_| i))
                .collect();

            let directed: HashSet<(usize, usize)> = visible
                .iter()
                .filter_map(|&i| self.faces[i].as_ref())
                .flat_map(HullFace::edges)
                .collect();
            let horizon: Vec<(usize, usize)> = visible
                .iter()
                .filter_map(|&i| self.faces[i].as_ref())
                .flat_map(HullFace::edges)
                .filter(|&(u, v)| !directed.contains(&(v, u)))
                .collect();

            let mut orphans = Vec::new();
            for &i in &visible {
                if let Some(face) = self.faces[i].take() {
                    orphans.extend(face.outside);
                }
            }
            orphans.retain(|&p| p != apex);

            let first_new = self.faces.len();
            for (u, v) in horizon {
                self.faces.push(Some(HullFace::new([u, v, apex], points)));
            }
            for p in orphans {
                self.assign(p, points, first_new);
            }
            trace!(apex, removed = visible.len(), added = self.faces.len() - first_new, "hull step");
        }
    }

    fn into_mesh(self, points: &[Point3<f64>]) -> IndexedMesh {
        let faces: Vec<HullFace> = self.faces.into_iter().flatten().collect();
        let mut remap: HashMap<usize, u32> = HashMap::new();
        let mut mesh = IndexedMesh::with_capacity(faces.len() / 2 + 2, faces.len());
        for face in &faces {
            let loop_indices = face
                .vertices
                .map(|v| *remap.entry(v).or_insert_with(|| mesh.push_vertex(points[v])));
            mesh.push_face(loop_indices);
        }
        mesh
    }
}

fn farthest(points: &[Point3<f64>], metric: impl Fn(&Point3<f64>) -> f64) -> usize {
    points
        .iter()
        .enumerate()
        .max_by(|(_, x), (_, y)| metric(x).total_cmp(&metric(y)))
        .map_or(0, |(i, _)| i)
}
