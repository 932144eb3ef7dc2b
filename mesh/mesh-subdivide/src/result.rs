//! Result types for subdivision operations.

// Face counts don't overflow in practice
#![allow(clippy::cast_precision_loss)]

use mesh_types::IndexedMesh;

use crate::params::SubdivisionMode;

/// Result of mesh subdivision.
#[derive(Debug, Clone)]
pub struct SubdivisionResult {
    /// The subdivided mesh, creases carried over to the child edges.
    pub mesh: IndexedMesh,

    /// Number of faces in original mesh.
    pub original_faces: usize,

    /// Number of faces in subdivided mesh.
    pub final_faces: usize,

    /// Number of vertices in original mesh.
    pub original_vertices: usize,

    /// Number of vertices in subdivided mesh.
    pub final_vertices: usize,

    /// Number of rounds performed.
    pub levels: u32,

    /// Vertex placement rule used.
    pub mode: SubdivisionMode,
}

impl SubdivisionResult {
    /// Get the face multiplication factor.
    #[must_use]
    pub fn face_ratio(&self) -> f64 {
        if self.original_faces == 0 {
            1.0
        } else {
            self.final_faces as f64 / self.original_faces as f64
        }
    }

    /// Check if any subdivision occurred.
    #[must_use]
    pub const fn was_subdivided(&self) -> bool {
        self.levels > 0 && self.final_faces > self.original_faces
    }
}

impl std::fmt::Display for SubdivisionResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Subdivision ({:?}): {} → {} faces ({:.1}x), {} levels",
            self.mode,
            self.original_faces,
            self.final_faces,
            self.face_ratio(),
            self.levels
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(original: usize, final_faces: usize, levels: u32) -> SubdivisionResult {
        SubdivisionResult {
            mesh: IndexedMesh::new(),
            original_faces: original,
            final_faces,
            original_vertices: 8,
            final_vertices: 26,
            levels,
            mode: SubdivisionMode::PreserveTopology,
        }
    }

    #[test]
    fn test_face_ratio() {
        assert!((result(6, 24, 1).face_ratio() - 4.0).abs() < 0.001);
        assert!((result(0, 0, 1).face_ratio() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_was_subdivided() {
        assert!(!result(6, 6, 0).was_subdivided());
        assert!(result(6, 24, 1).was_subdivided());
    }

    #[test]
    fn test_display() {
        let display = format!("{}", result(6, 24, 1));
        assert!(display.contains("6 → 24"));
        assert!(display.contains("4.0x"));
        assert!(display.contains("PreserveTopology"));
    }
}
