//! Vertex welding.

use mesh_region::SpatialHash;
use mesh_types::{IndexedMesh, Point3};
use tracing::debug;

use crate::mask::Mask;
use crate::topology::{self, UnionFind};

/// Weld vertices within `epsilon` of each other (inclusive).
///
/// Merging is transitive: chains of close vertices collapse to one. The
/// lowest-indexed vertex of each group keeps its position. Faces left with
/// fewer than 3 distinct vertices are dropped, duplicate faces removed and
/// the vertex array compacted. Returns the number of vertices merged away.
///
/// # Example
///
/// ```
/// use mesh_types::{IndexedMesh, Vertex};
/// use mesh_repair::weld_vertices;
///
/// let mut mesh = IndexedMesh::new();
/// mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(1.0001, 0.0, 0.0)); // Near-duplicate of vertex 1
/// mesh.push_face([0, 1, 2]);
/// mesh.push_face([0, 2, 3]);
///
/// let merged = weld_vertices(&mut mesh, 0.001);
/// assert_eq!(merged, 1);
/// assert_eq!(mesh.vertices.len(), 3);
/// ```
pub fn weld_vertices(mesh: &mut IndexedMesh, epsilon: f64) -> usize {
    let merged = weld_masked(mesh, epsilon, &Mask::All);
    if merged > 0 {
        topology::remove_duplicate_faces(mesh);
        mesh.compact();
    }
    merged
}

/// Weld without compacting: merged-away vertices stay in the array,
/// unreferenced. Only vertices allowed by `mask` take part.
pub(crate) fn weld_masked(mesh: &mut IndexedMesh, epsilon: f64, mask: &Mask) -> usize {
    let n = mesh.vertices.len();
    if n < 2 || !(epsilon >= 0.0) {
        return 0;
    }

    let positions: Vec<Point3<f64>> = mesh.vertices.iter().map(|v| v.position).collect();
    let hash = SpatialHash::from_points(positions.iter().copied(), epsilon * 2.0);
    let mut sets = UnionFind::new(n);
    let mut merged = 0;

    for (i, p) in positions.iter().enumerate() {
        let i = i as u32;
        if !mask.allows(i) {
            continue;
        }
        for j in hash.within(&positions, p, epsilon) {
            if j > i && mask.allows(j) && sets.union(i, j) {
                merged += 1;
            }
        }
    }

    if merged > 0 {
        let roots = sets.roots();
        topology::redirect(mesh, &roots);
        debug!(merged, epsilon, "welded vertices");
    }
    merged
}
