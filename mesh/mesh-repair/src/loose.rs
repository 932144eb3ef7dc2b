//! Loose geometry removal.

use mesh_types::IndexedMesh;
use tracing::debug;

use crate::adjacency::MeshAdjacency;
use crate::mask::Mask;

/// Remove faces that share no edge with any other face, then every vertex
/// no face references.
///
/// A mesh made of a single face keeps it. Returns the number of faces and
/// vertices removed.
///
/// # Example
///
/// ```
/// use mesh_types::{unit_cube, Point3};
/// use mesh_repair::delete_loose;
///
/// let mut mesh = unit_cube();
/// let a = mesh.push_vertex(Point3::new(5.0, 0.0, 0.0));
/// let b = mesh.push_vertex(Point3::new(6.0, 0.0, 0.0));
/// let c = mesh.push_vertex(Point3::new(5.0, 1.0, 0.0));
/// mesh.push_face([a, b, c]);
/// mesh.push_vertex(Point3::new(9.0, 9.0, 9.0));
///
/// assert_eq!(delete_loose(&mut mesh), 5);
/// assert_eq!(mesh.faces.len(), 6);
/// assert_eq!(mesh.vertices.len(), 8);
/// ```
pub fn delete_loose(mesh: &mut IndexedMesh) -> usize {
    loose_faces_masked(mesh, &Mask::All) + mesh.compact()
}

/// Remove isolated faces whose vertices are all allowed by `mask`.
pub(crate) fn loose_faces_masked(mesh: &mut IndexedMesh, mask: &Mask) -> usize {
    if mesh.faces.len() < 2 {
        return 0;
    }
    let adjacency = MeshAdjacency::build(&mesh.faces);
    let isolated: Vec<bool> = mesh
        .faces
        .iter()
        .map(|face| {
            let n = face.len();
            mask.allows_all(face) && (0..n).all(|i| adjacency.edge_valence(face[i], face[(i + 1) % n]) <= 1)
        })
        .collect();

    let before = mesh.faces.len();
    let mut index = 0;
    mesh.faces.retain(|_| {
        let keep = !isolated[index];
        index += 1;
        keep
    });
    let removed = before - mesh.faces.len();
    if removed > 0 {
        debug!(removed, "removed loose faces");
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_types::unit_cube;

    #[test]
    fn single_face_survives() {
        let mut mesh = IndexedMesh::new();
        for p in [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]] {
            mesh.vertices.push(p.into());
        }
        mesh.push_face([0, 1, 2]);
        assert_eq!(delete_loose(&mut mesh), 0);
        assert_eq!(mesh.faces.len(), 1);
    }

    #[test]
    fn closed_mesh_is_untouched() {
        let mut mesh = unit_cube();
        assert_eq!(delete_loose(&mut mesh), 0);
        assert_eq!(mesh, unit_cube());
    }

    #[test]
    fn mask_protects_faces() {
        let mut mesh = IndexedMesh::new();
        for p in [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [5.0, 0.0, 0.0], [6.0, 0.0, 0.0], [5.0, 1.0, 0.0]] {
            mesh.vertices.push(p.into());
        }
        mesh.push_face([0, 1, 2]);
        mesh.push_face([3, 4, 5]);
        let mask = Mask::Only(vec![true, true, true, false, false, false]);
        assert_eq!(loose_faces_masked(&mut mesh, &mask), 1);
        assert_eq!(mesh.faces[0].as_slice(), &[3, 4, 5]);
    }
}
