//! Hole detection and filling.
//!
//! A hole is a closed loop of boundary edges (edges with only one adjacent
//! face). Loops are traced against the winding of the faces around them, so
//! the loop read in order is already a correctly wound capping polygon.
//!
//! # Example
//!
//! ```
//! use mesh_types::unit_cube;
//! use mesh_repair::holes::{detect_holes, fill_holes};
//!
//! // A cube missing its top face has one square hole.
//! let mut mesh = unit_cube();
//! mesh.faces.remove(1);
//!
//! let holes = detect_holes(&mesh);
//! assert_eq!(holes.len(), 1);
//! assert_eq!(holes[0].edge_count(), 4);
//!
//! let summary = fill_holes(&mut mesh, 100);
//! assert_eq!(summary.filled, 1);
//! assert!((mesh.signed_volume() - 1.0).abs() < 1e-12);
//! ```

use hashbrown::{HashMap, HashSet};
use mesh_region::SpatialHash;
use mesh_types::{polygon, Face, IndexedMesh, Point3};
use tracing::{debug, info};

use crate::adjacency::MeshAdjacency;
use crate::mask::Mask;

/// A boundary loop representing a hole in the mesh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryLoop {
    /// Ordered vertex indices; read in order they wind the capping face.
    pub vertices: Vec<u32>,
}

impl BoundaryLoop {
    /// Number of edges (and vertices) in the loop.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.vertices.len()
    }

    /// Check if this is a valid boundary loop.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.vertices.len() >= 3
    }
}

/// Outcome of a hole-filling pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HoleFillSummary {
    /// Holes capped.
    pub filled: usize,
    /// Holes left open (too long, ambiguous, flat or left for welding).
    pub skipped: usize,
}

/// Detect all simple boundary loops (holes) in the mesh.
///
/// Boundary vertices shared by more than one loop are ambiguous; loops
/// through them are not returned.
#[must_use]
pub fn detect_holes(mesh: &IndexedMesh) -> Vec<BoundaryLoop> {
    trace_loops(mesh).0
}

/// Returns the simple loops and the number of ambiguous boundary pieces.
fn trace_loops(mesh: &IndexedMesh) -> (Vec<BoundaryLoop>, usize) {
    let adjacency = MeshAdjacency::build(&mesh.faces);

    // Reverse each boundary half-edge so loops wind like a cap.
    let mut next: HashMap<u32, Vec<u32>> = HashMap::new();
    let mut starts: Vec<(u32, u32)> = Vec::new();
    for face in &mesh.faces {
        let n = face.len();
        for i in 0..n {
            let (a, b) = (face[i], face[(i + 1) % n]);
            if a != b && adjacency.edge_valence(a, b) == 1 {
                next.entry(b).or_default().push(a);
                starts.push((b, a));
            }
        }
    }
    if starts.is_empty() {
        return (Vec::new(), 0);
    }
    starts.sort_unstable();
    debug!(boundary_edges = starts.len(), "tracing boundary loops");

    let mut used: HashSet<(u32, u32)> = HashSet::new();
    let mut loops = Vec::new();
    let mut ambiguous = 0;

    for &(start, first) in &starts {
        if used.contains(&(start, first)) {
            continue;
        }
        let mut vertices = vec![start];
        let mut clean = true;
        let (mut from, mut to) = (start, first);
        let limit = starts.len() + 1;

        loop {
            used.insert((from, to));
            if next.get(&from).map_or(0, Vec::len) > 1 {
                clean = false;
            }
            if to == start || vertices.len() > limit {
                break;
            }
            vertices.push(to);
            let Some(&after) = next.get(&to).and_then(|c| c.iter().find(|&&c| !used.contains(&(to, c))))
            else {
                clean = false;
                break;
            };
            from = to;
            to = after;
        }

        if clean && to == start && vertices.len() >= 3 {
            loops.push(BoundaryLoop { vertices });
        } else {
            ambiguous += 1;
        }
    }

    (loops, ambiguous)
}

/// Fill holes of at most `max_hole_edges` edges with ear-clipped caps.
///
/// Returns counts of filled and skipped holes.
pub fn fill_holes(mesh: &mut IndexedMesh, max_hole_edges: usize) -> HoleFillSummary {
    fill_holes_masked(mesh, max_hole_edges, None, &Mask::All)
}

/// Hole filling restricted to loops whose vertices are all allowed by
/// `mask`. With `seam_tolerance`, loops whose every vertex lies within that
/// distance of a vertex outside the loop are left for the weld stage.
pub(crate) fn fill_holes_masked(
    mesh: &mut IndexedMesh,
    max_hole_edges: usize,
    seam_tolerance: Option<f64>,
    mask: &Mask,
) -> HoleFillSummary {
    let (loops, ambiguous) = trace_loops(mesh);
    let mut summary = HoleFillSummary {
        filled: 0,
        skipped: ambiguous,
    };
    if loops.is_empty() {
        return summary;
    }

    let positions: Vec<Point3<f64>> = mesh.vertices.iter().map(|v| v.position).collect();
    let seam_hash = seam_tolerance.map(|eps| (eps, SpatialHash::from_points(positions.iter().copied(), eps * 2.0)));

    let mut caps: Vec<Face> = Vec::new();
    for hole in &loops {
        if hole.edge_count() > max_hole_edges || !hole.vertices.iter().all(|&v| mask.allows(v)) {
            summary.skipped += 1;
            continue;
        }
        let loop_positions: Vec<Point3<f64>> = hole.vertices.iter().map(|&v| positions[v as usize]).collect();
        if polygon::area(&loop_positions) <= f64::EPSILON {
            summary.skipped += 1;
            continue;
        }
        if let Some((eps, hash)) = &seam_hash {
            let members: HashSet<u32> = hole.vertices.iter().copied().collect();
            let closable = hole.vertices.iter().all(|&v| {
                hash.within(&positions, &positions[v as usize], *eps)
                    .any(|w| !members.contains(&w))
            });
            if closable {
                summary.skipped += 1;
                continue;
            }
        }

        for [a, b, c] in polygon::triangulate(&loop_positions) {
            caps.push(Face::from_slice(&[hole.vertices[a], hole.vertices[b], hole.vertices[c]]));
        }
        summary.filled += 1;
    }

    mesh.faces.extend(caps);
    if summary.filled > 0 || summary.skipped > 0 {
        info!(filled = summary.filled, skipped = summary.skipped, "hole filling");
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_types::unit_cube;

    #[test]
    fn closed_mesh_has_no_holes() {
        assert!(detect_holes(&unit_cube()).is_empty());
    }

    #[test]
    fn cap_winding_matches_mesh() {
        let mut mesh = unit_cube();
        mesh.faces.remove(0);
        let summary = fill_holes(&mut mesh, 10);
        assert_eq!(summary, HoleFillSummary { filled: 1, skipped: 0 });
        assert_eq!(mesh.faces.len(), 7);
        let last = mesh.faces.len() - 1;
        assert!(mesh.face_normal(last).is_some_and(|n| n.z < 0.0));
        assert!(crate::validate_mesh(&mesh).is_watertight);
    }

    #[test]
    fn long_holes_are_skipped() {
        let mut mesh = unit_cube();
        mesh.faces.remove(1);
        let summary = fill_holes(&mut mesh, 3);
        assert_eq!(summary, HoleFillSummary { filled: 0, skipped: 1 });
        assert_eq!(mesh.faces.len(), 5);
    }

    #[test]
    fn seams_are_left_for_welding() {
        // Six disconnected quads of a cube: every loop is a seam.
        let cube = unit_cube();
        let mut soup = IndexedMesh::new();
        for face in &cube.faces {
            let start = soup.vertices.len() as u32;
            for &v in face {
                soup.vertices.push(cube.vertices[v as usize]);
            }
            soup.push_face(start..start + face.len() as u32);
        }
        let summary = fill_holes_masked(&mut soup, 100, Some(0.01), &Mask::All);
        assert_eq!(summary.filled, 0);
        assert_eq!(summary.skipped, 6);
    }
}
