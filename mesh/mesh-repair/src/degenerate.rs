//! Degenerate geometry: short edges, sliver faces and the T-junctions they
//! leave behind.

use hashbrown::HashSet;
use mesh_types::{Face, IndexedMesh, Point3};
use tracing::debug;

use crate::adjacency::MeshAdjacency;
use crate::mask::Mask;
use crate::topology::{self, UnionFind};

/// Outcome of a degenerate-dissolve pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DegenerateSummary {
    /// Short edges collapsed (vertices merged away).
    pub edges_collapsed: usize,
    /// Faces removed for having too little area, or cancelled as duplicates.
    pub faces_removed: usize,
    /// Vertices inserted into a neighbouring face's edge.
    pub t_junctions: usize,
}

/// Collapse edges shorter than `threshold`, remove needle faces with area
/// below `threshold²` and re-stitch the boundary they leave.
///
/// Small faces that are not needles (no corner lies on the opposite chord)
/// are kept, and a removal whose re-stitch would leave more open edges is
/// undone.
///
/// # Example
///
/// ```
/// use mesh_types::{IndexedMesh, Point3};
/// use mesh_repair::remove_degenerate;
///
/// let mut mesh = IndexedMesh::new();
/// mesh.push_vertex(Point3::new(0.0, 0.0, 0.0));
/// mesh.push_vertex(Point3::new(10.0, 0.0, 0.0));
/// mesh.push_vertex(Point3::new(5.0, 0.0, 0.0)); // Collinear: no area
/// mesh.push_face([0, 1, 2]);
///
/// let summary = remove_degenerate(&mut mesh, 1e-3);
/// assert_eq!(summary.faces_removed, 1);
/// assert!(mesh.faces.is_empty());
/// ```
pub fn remove_degenerate(mesh: &mut IndexedMesh, threshold: f64) -> DegenerateSummary {
    let summary = degenerate_masked(mesh, threshold, &Mask::All);
    if summary.edges_collapsed > 0 {
        mesh.compact();
    }
    summary
}

pub(crate) fn degenerate_masked(mesh: &mut IndexedMesh, threshold: f64, mask: &Mask) -> DegenerateSummary {
    if !(threshold > 0.0) || mesh.faces.is_empty() {
        return DegenerateSummary::default();
    }
    let mut summary = DegenerateSummary {
        edges_collapsed: collapse_short_edges(mesh, threshold, mask),
        ..DegenerateSummary::default()
    };
    if summary.edges_collapsed > 0 {
        summary.faces_removed += topology::remove_duplicate_faces(mesh);
    }

    let min_area = threshold * threshold;
    let before = mesh.faces.len();
    let keep: Vec<bool> = (0..before)
        .map(|f| {
            !(mesh.face_area(f) < min_area
                && mask.allows_all(&mesh.faces[f])
                && is_needle(mesh, &mesh.faces[f], threshold))
        })
        .collect();
    let mut stitched = false;
    if keep.iter().any(|k| !k) {
        let collapsed = mesh.faces.clone();
        let open_before = MeshAdjacency::build(&mesh.faces).boundary_edge_count();
        let mut index = 0;
        mesh.faces.retain(|_| {
            let k = keep[index];
            index += 1;
            k
        });
        let t_junctions = insert_t_junctions_masked(mesh, threshold, mask);
        if MeshAdjacency::build(&mesh.faces).boundary_edge_count() > open_before {
            debug!(faces = before - mesh.faces.len(), "sliver removal left holes, keeping slivers");
            mesh.faces = collapsed;
        } else {
            stitched = true;
            summary.faces_removed += before - mesh.faces.len();
            summary.t_junctions = t_junctions;
        }
    }

    if !stitched && summary.edges_collapsed + summary.faces_removed > 0 {
        summary.t_junctions = insert_t_junctions_masked(mesh, threshold, mask);
    }
    if summary.edges_collapsed + summary.faces_removed > 0 {
        debug!(
            collapsed = summary.edges_collapsed,
            removed = summary.faces_removed,
            t_junctions = summary.t_junctions,
            "dissolved degenerate geometry"
        );
    }
    summary
}

/// A face flat enough to vanish into one of its chords: every corner other
/// than the two farthest apart lies strictly inside the segment joining
/// them, so the neighbours can be stitched along it.
fn is_needle(mesh: &IndexedMesh, face: &[u32], tolerance: f64) -> bool {
    let points: Vec<Point3<f64>> = face.iter().map(|&v| mesh.position(v)).collect();
    let mut chord = (0, 1, 0.0);
    for i in 0..points.len() {
        for j in i + 1..points.len() {
            let d = (points[j] - points[i]).norm_squared();
            if d > chord.2 {
                chord = (i, j, d);
            }
        }
    }
    let (i, j, _) = chord;
    points
        .iter()
        .enumerate()
        .filter(|&(k, _)| k != i && k != j)
        .all(|(_, p)| segment_parameter(&points[i], &points[j], p, tolerance).is_some())
}

fn collapse_short_edges(mesh: &mut IndexedMesh, threshold: f64, mask: &Mask) -> usize {
    let mut sets = UnionFind::new(mesh.vertices.len());
    let mut collapsed = 0;
    for edge in mesh.edges() {
        if !mask.allows(edge.0) || !mask.allows(edge.1) {
            continue;
        }
        let length = (mesh.position(edge.1) - mesh.position(edge.0)).norm();
        if length < threshold && sets.union(edge.0, edge.1) {
            collapsed += 1;
        }
    }
    if collapsed > 0 {
        let roots = sets.roots();
        topology::redirect(mesh, &roots);
    }
    collapsed
}

/// Insert boundary vertices lying on another face's boundary edge into that
/// face's loop.
///
/// Only edges used by a single face and vertices on such edges take part,
/// so interior geometry is never touched. A vertex counts as lying on an
/// edge when its distance to the segment is at most `tolerance` and it is
/// not one of the endpoints. Returns the number of insertions.
pub fn insert_t_junctions(mesh: &mut IndexedMesh, tolerance: f64) -> usize {
    insert_t_junctions_masked(mesh, tolerance, &Mask::All)
}

pub(crate) fn insert_t_junctions_masked(mesh: &mut IndexedMesh, tolerance: f64, mask: &Mask) -> usize {
    let adjacency = MeshAdjacency::build(&mesh.faces);
    let boundary = adjacency.boundary_edges();
    if boundary.is_empty() {
        return 0;
    }
    let boundary_vertices: Vec<u32> = {
        let set: HashSet<u32> = boundary.iter().flat_map(|e| [e.0, e.1]).collect();
        let mut v: Vec<u32> = set.into_iter().filter(|&v| mask.allows(v)).collect();
        v.sort_unstable();
        v
    };
    let boundary: HashSet<_> = boundary.into_iter().collect();

    let mut inserted = 0;
    for face in &mut mesh.faces {
        let n = face.len();
        let mut rebuilt: Face = Face::with_capacity(n);
        let mut changed = false;
        for i in 0..n {
            let (a, b) = (face[i], face[(i + 1) % n]);
            rebuilt.push(a);
            if !boundary.contains(&mesh_types::EdgeKey::new(a, b)) {
                continue;
            }
            let (pa, pb) = (mesh.vertices[a as usize].position, mesh.vertices[b as usize].position);
            let mut on_edge: Vec<(f64, u32)> = boundary_vertices
                .iter()
                .filter(|&&v| v != a && v != b && !face.contains(&v))
                .filter_map(|&v| {
                    segment_parameter(&pa, &pb, &mesh.vertices[v as usize].position, tolerance).map(|t| (t, v))
                })
                .collect();
            if on_edge.is_empty() {
                continue;
            }
            on_edge.sort_by(|x, y| x.0.total_cmp(&y.0).then(x.1.cmp(&y.1)));
            inserted += on_edge.len();
            rebuilt.extend(on_edge.into_iter().map(|(_, v)| v));
            changed = true;
        }
        if changed {
            *face = rebuilt;
        }
    }
    inserted
}

/// Position of `p` along segment `a→b` as a parameter in `(0, 1)`, when it
/// lies within `tolerance` of the segment's interior.
fn segment_parameter(a: &Point3<f64>, b: &Point3<f64>, p: &Point3<f64>, tolerance: f64) -> Option<f64> {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq <= f64::EPSILON {
        return None;
    }
    let t = (p - a).dot(&ab) / len_sq;
    let margin = tolerance / len_sq.sqrt();
    if t <= margin || t >= 1.0 - margin {
        return None;
    }
    let closest = a + ab * t;
    ((p - closest).norm() <= tolerance).then_some(t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_types::unit_cube;

    #[test]
    fn short_edge_collapses_to_lower_index() {
        let mut mesh = unit_cube();
        // Split the edge 1-5 with a vertex right next to 5.
        let near = mesh.push_vertex(Point3::new(1.0, 0.0, 1.0 - 1e-6));
        mesh.faces[2] = Face::from_slice(&[0, 1, near, 5, 4]);
        mesh.faces[5] = Face::from_slice(&[1, 2, 6, 5, near]);
        let summary = remove_degenerate(&mut mesh, 1e-4);
        assert_eq!(summary.edges_collapsed, 1);
        assert_eq!(mesh.vertices.len(), 8);
        assert_eq!(mesh.position(5), Point3::new(1.0, 0.0, 1.0));
        assert!(crate::validate_mesh(&mesh).is_printable());
    }

    #[test]
    fn sliver_removal_restitches_neighbours() {
        // A needle sliver [0, 1, 4] between three regular faces.
        let mut mesh = IndexedMesh::new();
        for p in [[0.0, 0.0], [2.0, 0.0], [2.0, 2.0], [0.0, 2.0], [1.0, 1e-7], [1.0, -1.0]] {
            mesh.push_vertex(Point3::new(p[0], p[1], 0.0));
        }
        mesh.push_face([0, 1, 4]);
        mesh.push_face([1, 2, 4]);
        mesh.push_face([4, 2, 3, 0]);
        mesh.push_face([0, 5, 1]);
        let summary = remove_degenerate(&mut mesh, 1e-3);
        assert_eq!(summary.faces_removed, 1);
        assert_eq!(summary.t_junctions, 1);
        assert_eq!(mesh.faces.len(), 3);
        assert_eq!(mesh.faces[2].as_slice(), &[0, 5, 1, 4]);
        let adjacency = MeshAdjacency::build(&mesh.faces);
        assert_eq!(adjacency.boundary_edge_count(), 5);
        assert!(adjacency.is_manifold());
    }

    #[test]
    fn small_fat_face_is_kept() {
        // A closed tetrahedron whose base is tiny but not a needle: no
        // corner lies on the opposite edge, so nothing could fill its hole.
        let mut mesh = IndexedMesh::new();
        for p in [[0.0, 0.0, 0.0], [1.2e-4, 0.0, 0.0], [0.0, 1.5e-4, 0.0], [0.0, 0.0, 1.0]] {
            mesh.push_vertex(Point3::new(p[0], p[1], p[2]));
        }
        mesh.push_face([0, 2, 1]);
        mesh.push_face([0, 1, 3]);
        mesh.push_face([1, 2, 3]);
        mesh.push_face([2, 0, 3]);
        assert!(mesh.face_area(0) < 1e-8);

        let before = mesh.clone();
        let summary = remove_degenerate(&mut mesh, 1e-4);
        assert_eq!(summary, DegenerateSummary::default());
        assert_eq!(mesh, before);
        assert!(MeshAdjacency::build(&mesh.faces).is_watertight());
    }

    #[test]
    fn needle_test_uses_the_longest_chord() {
        let mut mesh = IndexedMesh::new();
        for p in [[0.0, 0.0], [2.0, 0.0], [1.0, 1e-7], [1.0, 1.5e-4]] {
            mesh.push_vertex(Point3::new(p[0], p[1], 0.0));
        }
        assert!(is_needle(&mesh, &[0, 1, 2], 1e-4));
        assert!(is_needle(&mesh, &[2, 0, 1], 1e-4));
        assert!(!is_needle(&mesh, &[0, 1, 3], 1e-4));
    }

    #[test]
    fn t_junction_is_inserted_in_order() {
        let mut mesh = IndexedMesh::new();
        for p in [[0.0, 0.0], [3.0, 0.0], [3.0, -1.0], [0.0, -1.0], [0.0, 1.0], [1.0, 0.0], [2.0, 0.0], [3.0, 1.0]] {
            mesh.push_vertex(Point3::new(p[0], p[1], 0.0));
        }
        mesh.push_face([0, 3, 2, 1]);
        mesh.push_face([0, 5, 6, 1, 7, 4]);
        assert_eq!(insert_t_junctions(&mut mesh, 1e-6), 2);
        assert_eq!(mesh.faces[0].as_slice(), &[0, 3, 2, 1, 6, 5]);
        assert_eq!(MeshAdjacency::build(&mesh.faces).edge_valence(5, 6), 2);
    }

    #[test]
    fn endpoints_are_not_junctions() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(1.0, 0.0, 0.0);
        assert!(segment_parameter(&a, &b, &b, 1e-6).is_none());
        assert!(segment_parameter(&a, &b, &Point3::new(0.5, 0.1, 0.0), 1e-6).is_none());
        assert!(segment_parameter(&a, &b, &Point3::new(0.25, 0.0, 0.0), 1e-6).is_some());
    }
}
