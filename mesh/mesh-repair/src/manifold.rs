//! Non-manifold detection and the best-effort collapse retry.

use std::fmt;

use hashbrown::HashMap;
use mesh_types::{polygon, IndexedMesh, Point3, Vector3};
use tracing::{debug, warn};

use crate::adjacency::MeshAdjacency;
use crate::loose::loose_faces_masked;
use crate::mask::Mask;
use crate::topology::{self, UnionFind};
use crate::validate::DEGENERATE_AREA;

/// Topology defects left in a mesh after repair.
///
/// Non-fatal: it is logged and carried in the
/// [`RepairReport`](crate::RepairReport) while processing continues.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NonManifoldWarning {
    /// Edges used by a single face.
    pub boundary_edges: usize,
    /// Edges used by more than two faces.
    pub non_manifold_edges: usize,
    /// Vertices whose faces do not form a single fan.
    pub non_manifold_vertices: usize,
    /// Whether the collapse retry ran.
    pub collapse_attempted: bool,
}

impl NonManifoldWarning {
    /// Inspect a mesh, returning a warning if it has any defect.
    #[must_use]
    pub fn detect(mesh: &IndexedMesh) -> Option<Self> {
        let adjacency = MeshAdjacency::build(&mesh.faces);
        let warning = Self {
            boundary_edges: adjacency.boundary_edge_count(),
            non_manifold_edges: adjacency.non_manifold_edge_count(),
            non_manifold_vertices: adjacency.non_manifold_vertices(&mesh.faces).len(),
            collapse_attempted: false,
        };
        (warning.defects() > 0).then_some(warning)
    }

    /// Total number of defective edges and vertices.
    #[must_use]
    pub const fn defects(&self) -> usize {
        self.boundary_edges + self.non_manifold_edges + self.non_manifold_vertices
    }
}

impl fmt::Display for NonManifoldWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "non-manifold mesh: {} boundary edges, {} multi-face edges, {} non-manifold vertices",
            self.boundary_edges, self.non_manifold_edges, self.non_manifold_vertices
        )
    }
}

/// Result of the detection stage.
#[derive(Debug, Default)]
pub(crate) struct ManifoldOutcome {
    pub(crate) warning: Option<NonManifoldWarning>,
    pub(crate) vertices_collapsed: usize,
}

/// Detect defects and, when `collapse` is set, try one collapse retry,
/// rolling it back if it left more defects than it found.
pub(crate) fn resolve_non_manifold(mesh: &mut IndexedMesh, collapse: bool, mask: &Mask) -> ManifoldOutcome {
    let Some(found) = NonManifoldWarning::detect(mesh) else {
        return ManifoldOutcome::default();
    };
    if !collapse {
        return ManifoldOutcome {
            warning: Some(found),
            vertices_collapsed: 0,
        };
    }

    let snapshot = mesh.clone();
    let vertices_collapsed = collapse_bad_vertices(mesh, mask);
    let after = NonManifoldWarning::detect(mesh);
    let after_defects = after.map_or(0, |w| w.defects());
    if after_defects > found.defects() {
        warn!(
            before = found.defects(),
            after = after_defects,
            "non-manifold collapse made things worse, rolled back"
        );
        *mesh = snapshot;
        return ManifoldOutcome {
            warning: Some(NonManifoldWarning {
                collapse_attempted: true,
                ..found
            }),
            vertices_collapsed: 0,
        };
    }

    debug!(before = found.defects(), after = after_defects, "non-manifold collapse retry");
    ManifoldOutcome {
        warning: after.map(|w| NonManifoldWarning {
            collapse_attempted: true,
            ..w
        }),
        vertices_collapsed,
    }
}

/// Merge each edge-connected group of non-manifold vertices into its
/// centroid. Returns the number of vertices merged away.
fn collapse_bad_vertices(mesh: &mut IndexedMesh, mask: &Mask) -> usize {
    let adjacency = MeshAdjacency::build(&mesh.faces);
    let mut bad: Vec<u32> = adjacency.non_manifold_vertices(&mesh.faces);
    for edge in adjacency.non_manifold_edges() {
        bad.extend([edge.0, edge.1]);
    }
    bad.retain(|&v| mask.allows(v));
    bad.sort_unstable();
    bad.dedup();
    if bad.is_empty() {
        return 0;
    }

    let mut sets = UnionFind::new(mesh.vertices.len());
    let mut merged = 0;
    for edge in mesh.edges() {
        if bad.binary_search(&edge.0).is_ok() && bad.binary_search(&edge.1).is_ok() && sets.union(edge.0, edge.1) {
            merged += 1;
        }
    }
    if merged == 0 {
        return 0;
    }

    let roots = sets.roots();
    let mut sums: HashMap<u32, (Vector3<f64>, f64)> = HashMap::new();
    for &v in &bad {
        let entry = sums.entry(roots[v as usize]).or_insert((Vector3::zeros(), 0.0));
        entry.0 += mesh.position(v).coords;
        entry.1 += 1.0;
    }
    for (root, (sum, count)) in sums {
        if count > 1.0 {
            mesh.vertices[root as usize].position = Point3::from(sum / count);
        }
    }

    topology::redirect(mesh, &roots);
    topology::remove_duplicate_faces(mesh);
    mesh.faces.retain(|face| {
        let points: Vec<Point3<f64>> = face.iter().map(|&v| mesh.vertices[v as usize].position).collect();
        polygon::area(&points) >= DEGENERATE_AREA
    });
    loose_faces_masked(mesh, mask);
    debug!(merged, "collapsed non-manifold vertex groups");
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_types::unit_cube;

    #[test]
    fn closed_cube_has_no_warning() {
        assert!(NonManifoldWarning::detect(&unit_cube()).is_none());
    }

    #[test]
    fn open_cube_is_reported() {
        let mut mesh = unit_cube();
        mesh.faces.pop();
        let outcome = resolve_non_manifold(&mut mesh, false, &Mask::All);
        let warning = outcome.warning.unwrap();
        assert_eq!(warning.boundary_edges, 4);
        assert!(!warning.collapse_attempted);
        assert!(warning.to_string().contains("4 boundary edges"));
    }

    #[test]
    fn fin_is_collapsed_away() {
        // A cube with an extra face hanging off its top edge 4-5.
        let mut mesh = unit_cube();
        let a = mesh.push_vertex(Point3::new(0.5, -0.5, 1.5));
        mesh.push_face([5, 4, a]);
        let before = NonManifoldWarning::detect(&mesh).unwrap();
        assert_eq!(before.non_manifold_edges, 1);

        let outcome = resolve_non_manifold(&mut mesh, true, &Mask::All);
        let after = outcome.warning.map_or(0, |w| w.defects());
        assert!(after <= before.defects());
    }
}
