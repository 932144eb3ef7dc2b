//! Mesh adjacency data structures.
//!
//! Provides lookups for edge-to-face and vertex-to-face relationships over
//! polygon faces of any length.

use hashbrown::HashMap;
use mesh_types::{EdgeKey, Face};
use smallvec::SmallVec;

/// Adjacency information for a polygon mesh.
///
/// Provides lookups for:
/// - Faces adjacent to an edge
/// - Faces adjacent to a vertex
/// - Boundary edges (edges with only one adjacent face)
/// - Non-manifold edges (edges with more than two adjacent faces)
/// - Non-manifold vertices (incident faces not forming a single fan)
#[derive(Debug, Clone, Default)]
pub struct MeshAdjacency {
    edge_to_faces: HashMap<EdgeKey, SmallVec<[usize; 2]>>,
    vertex_to_faces: HashMap<u32, Vec<usize>>,
}

impl MeshAdjacency {
    /// Build adjacency information from face loops.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_repair::MeshAdjacency;
    /// use mesh_types::Face;
    ///
    /// let faces = vec![Face::from_slice(&[0, 1, 2]), Face::from_slice(&[1, 3, 4, 2])];
    /// let adj = MeshAdjacency::build(&faces);
    ///
    /// assert_eq!(adj.boundary_edge_count(), 5);
    /// assert_eq!(adj.faces_for_edge(2, 1), Some(&[0, 1][..]));
    /// ```
    #[must_use]
    pub fn build(faces: &[Face]) -> Self {
        let mut edge_to_faces: HashMap<EdgeKey, SmallVec<[usize; 2]>> = HashMap::new();
        let mut vertex_to_faces: HashMap<u32, Vec<usize>> = HashMap::new();

        for (face_idx, face) in faces.iter().enumerate() {
            let n = face.len();
            for i in 0..n {
                let v = face[i];
                let list = vertex_to_faces.entry(v).or_default();
                if list.last() != Some(&face_idx) {
                    list.push(face_idx);
                }
                let w = face[(i + 1) % n];
                if v != w {
                    edge_to_faces.entry(EdgeKey::new(v, w)).or_default().push(face_idx);
                }
            }
        }

        Self {
            edge_to_faces,
            vertex_to_faces,
        }
    }

    /// Faces adjacent to an edge, `None` if the edge doesn't exist.
    #[must_use]
    pub fn faces_for_edge(&self, v0: u32, v1: u32) -> Option<&[usize]> {
        self.edge_to_faces
            .get(&EdgeKey::new(v0, v1))
            .map(SmallVec::as_slice)
    }

    /// Faces adjacent to a vertex (empty if none).
    #[must_use]
    pub fn faces_for_vertex(&self, v: u32) -> &[usize] {
        self.vertex_to_faces.get(&v).map_or(&[], Vec::as_slice)
    }

    /// Number of faces using an edge.
    #[must_use]
    pub fn edge_valence(&self, v0: u32, v1: u32) -> usize {
        self.faces_for_edge(v0, v1).map_or(0, <[usize]>::len)
    }

    /// Boundary edges (exactly one adjacent face), sorted.
    #[must_use]
    pub fn boundary_edges(&self) -> Vec<EdgeKey> {
        self.edges_where(|n| n == 1)
    }

    /// Non-manifold edges (more than two adjacent faces), sorted.
    #[must_use]
    pub fn non_manifold_edges(&self) -> Vec<EdgeKey> {
        self.edges_where(|n| n > 2)
    }

    fn edges_where(&self, pred: impl Fn(usize) -> bool) -> Vec<EdgeKey> {
        let mut edges: Vec<EdgeKey> = self
            .edge_to_faces
            .iter()
            .filter(|(_, faces)| pred(faces.len()))
            .map(|(&edge, _)| edge)
            .collect();
        edges.sort_unstable();
        edges
    }

    /// Count the number of boundary edges.
    #[must_use]
    pub fn boundary_edge_count(&self) -> usize {
        self.edge_to_faces.values().filter(|f| f.len() == 1).count()
    }

    /// Count the number of non-manifold edges.
    #[must_use]
    pub fn non_manifold_edge_count(&self) -> usize {
        self.edge_to_faces.values().filter(|f| f.len() > 2).count()
    }

    /// Vertices whose incident faces do not form a single edge-connected
    /// fan, sorted.
    #[must_use]
    pub fn non_manifold_vertices(&self, faces: &[Face]) -> Vec<u32> {
        let mut out: Vec<u32> = self
            .vertex_to_faces
            .iter()
            .filter(|(&v, incident)| incident.len() > 1 && fan_count(v, incident, faces) > 1)
            .map(|(&v, _)| v)
            .collect();
        out.sort_unstable();
        out
    }

    /// Check if the mesh is manifold (all edges have at most 2 adjacent faces).
    #[must_use]
    pub fn is_manifold(&self) -> bool {
        self.edge_to_faces.values().all(|faces| faces.len() <= 2)
    }

    /// Check if the mesh is watertight (no boundary edges).
    #[must_use]
    pub fn is_watertight(&self) -> bool {
        self.edge_to_faces.values().all(|faces| faces.len() >= 2)
    }

    /// Get the total number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edge_to_faces.len()
    }

    /// Get the number of vertices referenced by faces.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertex_to_faces.len()
    }
}

/// Number of edge-connected groups among the faces around `v`, where two
/// faces connect if they share an edge incident to `v`.
fn fan_count(v: u32, incident: &[usize], faces: &[Face]) -> usize {
    let mut parent: Vec<usize> = (0..incident.len()).collect();
    let mut spokes: HashMap<u32, usize> = HashMap::new();

    for (slot, &fi) in incident.iter().enumerate() {
        let face = &faces[fi];
        let n = face.len();
        for i in 0..n {
            if face[i] != v {
                continue;
            }
            for other in [face[(i + n - 1) % n], face[(i + 1) % n]] {
                if other == v {
                    continue;
                }
                match spokes.get(&other) {
                    Some(&first) => union(&mut parent, first, slot),
                    None => {
                        spokes.insert(other, slot);
                    }
                }
            }
        }
    }

    (0..incident.len()).filter(|&i| find(&mut parent, i) == i).count()
}

fn find(parent: &mut [usize], mut x: usize) -> usize {
    while parent[x] != x {
        parent[x] = parent[parent[x]];
        x = parent[x];
    }
    x
}

fn union(parent: &mut [usize], a: usize, b: usize) {
    let (ra, rb) = (find(parent, a), find(parent, b));
    if ra != rb {
        parent[ra.max(rb)] = ra.min(rb);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn faces(list: &[&[u32]]) -> Vec<Face> {
        list.iter().map(|f| Face::from_slice(f)).collect()
    }

    #[test]
    fn single_triangle_is_all_boundary() {
        let adj = MeshAdjacency::build(&faces(&[&[0, 1, 2]]));
        assert_eq!(adj.edge_count(), 3);
        assert_eq!(adj.vertex_count(), 3);
        assert_eq!(adj.boundary_edge_count(), 3);
        assert!(!adj.is_watertight());
        assert!(adj.is_manifold());
    }

    #[test]
    fn quad_and_triangle_share_edge() {
        let f = faces(&[&[0, 1, 2], &[1, 3, 4, 2]]);
        let adj = MeshAdjacency::build(&f);
        assert_eq!(adj.faces_for_edge(1, 2).map(<[usize]>::len), Some(2));
        assert_eq!(adj.edge_valence(0, 1), 1);
        assert_eq!(adj.edge_valence(0, 4), 0);
        assert_eq!(adj.faces_for_vertex(2), &[0, 1]);
        assert!(adj.faces_for_vertex(99).is_empty());
    }

    #[test]
    fn three_faces_on_one_edge() {
        let adj = MeshAdjacency::build(&faces(&[&[0, 1, 2], &[0, 1, 3], &[0, 1, 4]]));
        assert_eq!(adj.non_manifold_edges(), vec![EdgeKey::new(0, 1)]);
        assert!(!adj.is_manifold());
    }

    #[test]
    fn bowtie_vertex_is_non_manifold() {
        // Two triangles touching only at vertex 0.
        let f = faces(&[&[0, 1, 2], &[0, 3, 4]]);
        let adj = MeshAdjacency::build(&f);
        assert_eq!(adj.non_manifold_vertices(&f), vec![0]);

        // A proper fan around vertex 0 is fine.
        let f = faces(&[&[0, 1, 2], &[0, 2, 3]]);
        let adj = MeshAdjacency::build(&f);
        assert!(adj.non_manifold_vertices(&f).is_empty());
    }
}
