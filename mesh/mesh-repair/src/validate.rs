//! Mesh validation and health reporting.

use hashbrown::HashSet;
use mesh_types::IndexedMesh;
use smallvec::SmallVec;

use crate::adjacency::MeshAdjacency;

/// Area below which [`validate_mesh`] counts a face as degenerate.
pub const DEGENERATE_AREA: f64 = 1e-12;

/// Report of mesh validation results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MeshReport {
    /// Total number of vertices.
    pub vertex_count: usize,
    /// Total number of faces.
    pub face_count: usize,
    /// Total number of edges.
    pub edge_count: usize,
    /// Number of connected components.
    pub component_count: usize,

    /// Number of boundary edges (edges with only one adjacent face).
    pub boundary_edge_count: usize,
    /// Number of non-manifold edges (edges with more than two adjacent faces).
    pub non_manifold_edge_count: usize,
    /// Number of vertices whose faces do not form a single fan.
    pub non_manifold_vertex_count: usize,
    /// Number of degenerate faces (zero or near-zero area).
    pub degenerate_face_count: usize,
    /// Number of faces repeating another face's vertex set.
    pub duplicate_face_count: usize,
    /// Number of vertices no face references.
    pub unreferenced_vertex_count: usize,

    /// Whether the mesh is watertight (no boundary edges).
    pub is_watertight: bool,
    /// Whether the mesh is manifold (no non-manifold edges or vertices).
    pub is_manifold: bool,
    /// Whether the mesh is closed with negative signed volume.
    pub is_inside_out: bool,
}

impl MeshReport {
    /// Watertight, manifold and correctly wound.
    #[must_use]
    pub fn is_printable(&self) -> bool {
        self.is_watertight && self.is_manifold && !self.is_inside_out
    }

    /// Check if the mesh has any issues.
    #[must_use]
    pub fn has_issues(&self) -> bool {
        self.issue_count() > 0
    }

    /// Get a count of total issues found.
    #[must_use]
    pub fn issue_count(&self) -> usize {
        self.boundary_edge_count
            + self.non_manifold_edge_count
            + self.non_manifold_vertex_count
            + self.degenerate_face_count
            + self.duplicate_face_count
    }

    /// Boundary edges, multi-face edges and non-manifold vertices.
    #[must_use]
    pub fn topology_defects(&self) -> usize {
        self.boundary_edge_count + self.non_manifold_edge_count + self.non_manifold_vertex_count
    }
}

impl std::fmt::Display for MeshReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Mesh Report:")?;
        writeln!(f, "  Vertices: {}", self.vertex_count)?;
        writeln!(f, "  Faces: {}", self.face_count)?;
        writeln!(f, "  Edges: {}", self.edge_count)?;
        writeln!(f, "  Components: {}", self.component_count)?;
        writeln!(f)?;
        writeln!(f, "  Status:")?;
        writeln!(f, "    Watertight: {}", yes_no(self.is_watertight))?;
        writeln!(f, "    Manifold: {}", yes_no(self.is_manifold))?;
        writeln!(
            f,
            "    Winding: {}",
            if self.is_inside_out { "Inside-out" } else { "Correct" }
        )?;

        if self.has_issues() {
            writeln!(f)?;
            writeln!(f, "  Issues:")?;
            let issues = [
                ("Boundary edges", self.boundary_edge_count),
                ("Non-manifold edges", self.non_manifold_edge_count),
                ("Non-manifold vertices", self.non_manifold_vertex_count),
                ("Degenerate faces", self.degenerate_face_count),
                ("Duplicate faces", self.duplicate_face_count),
            ];
            for (label, count) in issues.iter().filter(|(_, c)| *c > 0) {
                writeln!(f, "    {label}: {count}")?;
            }
        }

        Ok(())
    }
}

const fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

/// Validate a mesh and return a report of any issues.
///
/// # Example
///
/// ```
/// use mesh_types::{box_shape, IndexedMesh, Vertex};
/// use mesh_repair::validate_mesh;
///
/// let report = validate_mesh(box_shape(1.0, 1.0, 1.0).mesh());
/// assert!(report.is_printable());
///
/// let mut mesh = IndexedMesh::new();
/// mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0));
/// mesh.push_face([0, 1, 2]);
///
/// let report = validate_mesh(&mesh);
/// assert_eq!(report.boundary_edge_count, 3);
/// ```
#[must_use]
pub fn validate_mesh(mesh: &IndexedMesh) -> MeshReport {
    let adjacency = MeshAdjacency::build(&mesh.faces);
    let non_manifold_vertex_count = adjacency.non_manifold_vertices(&mesh.faces).len();
    let is_watertight = adjacency.is_watertight();
    let is_manifold = adjacency.is_manifold() && non_manifold_vertex_count == 0;

    MeshReport {
        vertex_count: mesh.vertices.len(),
        face_count: mesh.faces.len(),
        edge_count: adjacency.edge_count(),
        component_count: mesh.component_count(),
        boundary_edge_count: adjacency.boundary_edge_count(),
        non_manifold_edge_count: adjacency.non_manifold_edge_count(),
        non_manifold_vertex_count,
        degenerate_face_count: count_degenerate_faces(mesh, DEGENERATE_AREA),
        duplicate_face_count: count_duplicate_faces(mesh),
        unreferenced_vertex_count: mesh.vertices.len().saturating_sub(adjacency.vertex_count()),
        is_watertight,
        is_manifold,
        is_inside_out: is_watertight && !mesh.faces.is_empty() && mesh.signed_volume() < 0.0,
    }
}

/// Count faces with area below the threshold.
pub(crate) fn count_degenerate_faces(mesh: &IndexedMesh, area_threshold: f64) -> usize {
    (0..mesh.faces.len())
        .filter(|&f| mesh.face_area(f) < area_threshold)
        .count()
}

/// Count faces whose sorted vertex set repeats an earlier face's.
fn count_duplicate_faces(mesh: &IndexedMesh) -> usize {
    let mut seen: HashSet<SmallVec<[u32; 4]>> = HashSet::new();
    mesh.faces
        .iter()
        .filter(|face| {
            let mut key: SmallVec<[u32; 4]> = face.iter().copied().collect();
            key.sort_unstable();
            !seen.insert(key)
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_types::{unit_cube, Face};

    #[test]
    fn cube_is_clean() {
        let report = validate_mesh(&unit_cube());
        assert_eq!(report.edge_count, 12);
        assert_eq!(report.component_count, 1);
        assert!(!report.has_issues());
        assert!(report.is_printable());
    }

    #[test]
    fn open_and_inverted_meshes() {
        let mut cube = unit_cube();
        cube.faces.pop();
        let report = validate_mesh(&cube);
        assert_eq!(report.boundary_edge_count, 4);
        assert!(!report.is_watertight);
        assert!(!report.is_inside_out);

        let mut cube = unit_cube();
        cube.flip_normals();
        assert!(validate_mesh(&cube).is_inside_out);
    }

    #[test]
    fn duplicates_and_degenerates_are_counted() {
        let mut cube = unit_cube();
        let copy = cube.faces[0].clone();
        cube.faces.push(copy);
        cube.push_vertex(nalgebra::Point3::new(0.5, 0.0, 0.0));
        cube.faces.push(Face::from_slice(&[0, 8, 1]));
        let report = validate_mesh(&cube);
        assert_eq!(report.duplicate_face_count, 1);
        assert_eq!(report.degenerate_face_count, 1);
        assert!(report.to_string().contains("Duplicate faces: 1"));
    }
}
